//! Rotation utilities.
//!
//! Placement stores the un-rotated layout box; rotation is applied around the
//! box center at render time. These helpers answer the questions the scene and
//! the controller need about the rotated shape: where a point lands, what the
//! axis-aligned footprint is, and how a screen drag reads in the box's frame.
//!
//! ## Rotation Convention
//!
//! Clockwise positive angles in degrees, y axis pointing down (CSS convention).

use super::types::{Point, Rect};

/// Normalize an angle in degrees into `[0, 360)`
pub fn normalize_degrees(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let normalized = angle - (angle / 360.0).floor() * 360.0;
    // Guard against -1e-15 style residue landing exactly on 360
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// A 2D rotation around a center point.
#[derive(Debug, Clone, Copy)]
pub struct RotationTransform {
    /// Rotation angle in degrees (clockwise positive)
    pub angle_degrees: f64,
    /// Center point of rotation
    pub center: Point,
}

impl RotationTransform {
    pub fn new(angle_degrees: f64, center: Point) -> Self {
        Self {
            angle_degrees,
            center,
        }
    }

    /// Rotation of a rectangle around its own center
    pub fn around_center(angle_degrees: f64, rect: &Rect) -> Self {
        Self::new(angle_degrees, rect.center())
    }

    /// Check if this is effectively a no-op
    pub fn is_identity(&self) -> bool {
        normalize_degrees(self.angle_degrees).abs() < f64::EPSILON
    }

    /// The inverse rotation (same center, negated angle)
    pub fn inverse(&self) -> Self {
        Self::new(-self.angle_degrees, self.center)
    }

    /// Rotate a point around the center.
    ///
    /// ```text
    /// x' = cx + (x - cx) * cos(θ) - (y - cy) * sin(θ)
    /// y' = cy + (x - cx) * sin(θ) + (y - cy) * cos(θ)
    /// ```
    pub fn transform_point(&self, point: Point) -> Point {
        if self.is_identity() {
            return point;
        }

        let radians = self.angle_degrees.to_radians();
        let cos_a = radians.cos();
        let sin_a = radians.sin();

        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;

        Point {
            x: self.center.x + dx * cos_a - dy * sin_a,
            y: self.center.y + dx * sin_a + dy * cos_a,
        }
    }

    /// Axis-aligned footprint of a rotated rectangle.
    ///
    /// Rotates the 4 corners and takes their bounding box, which is what a
    /// browser reports for a rotated element.
    pub fn transform_bounds(&self, bounds: &Rect) -> Rect {
        if self.is_identity() {
            return *bounds;
        }

        let corners = [
            Point::new(bounds.x, bounds.y),
            Point::new(bounds.right(), bounds.y),
            Point::new(bounds.x, bounds.bottom()),
            Point::new(bounds.right(), bounds.bottom()),
        ];

        let rotated: Vec<Point> = corners.iter().map(|p| self.transform_point(*p)).collect();

        let min_x = rotated.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = rotated.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = rotated.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = rotated.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Whether a point lies inside `bounds` once the rectangle is rotated.
    pub fn contains(&self, bounds: &Rect, point: Point) -> bool {
        bounds.contains(self.inverse().transform_point(point))
    }

    /// Rotate a screen-space vector (no translation).
    pub fn transform_vector(&self, v: Point) -> Point {
        RotationTransform::new(self.angle_degrees, Point::zero()).transform_point(v)
    }
}
