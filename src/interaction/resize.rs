//! Resize sessions.
//!
//! Center and scale constraints do not describe a box in a way that can be
//! edited edge by edge, so for the duration of a resize those axes are
//! temporarily treated as top/left. The original constraint is restored when
//! the gesture ends (or is cancelled) and the final rect is captured under it.

use crate::geometry::{
    capture_with_rotation, Constraint, HorizontalConstraint, Placement, Point, Rect, RotationTransform,
    VerticalConstraint,
};
use crate::scene::{ElementNode, NodeId};

use super::events::ResizeDirection;

/// Per-node state of a resize gesture
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub node: NodeId,
    pub original_constraint: Constraint,
    pub session_constraint: Constraint,
    pub original_placement: Placement,
    pub start_rect: Rect,
    pub container: Rect,
    rotation: f64,
}

impl ResizeSession {
    pub fn begin(node: &ElementNode, container: Rect) -> Self {
        let original = *node.constraint();
        let vertical = match original.vertical {
            VerticalConstraint::Center | VerticalConstraint::Scale => VerticalConstraint::Top,
            other => other,
        };
        let horizontal = match original.horizontal {
            HorizontalConstraint::Center | HorizontalConstraint::Scale => HorizontalConstraint::Left,
            other => other,
        };
        Self {
            node: node.id(),
            original_constraint: original,
            session_constraint: Constraint::new(vertical, horizontal),
            original_placement: *node.placement(),
            start_rect: node.rect(),
            container,
            rotation: node.placement().rotation_degrees(),
        }
    }

    /// Whether the session had to swap any axis
    pub fn swapped(&self) -> bool {
        self.original_constraint != self.session_constraint
    }

    /// Rect after dragging `direction`'s handle by `delta` since the start.
    ///
    /// The screen delta is read in the node's own frame, so a handle always
    /// changes the box's local width or height. Sizes never drop below
    /// `min_size`; the opposite local edge stays fixed on screen.
    pub fn proposed_rect(&self, direction: ResizeDirection, delta: Point, min_size: f64) -> Rect {
        let start = self.start_rect;
        let rotation = RotationTransform::new(self.rotation, Point::zero());
        let local = rotation.inverse().transform_vector(delta);

        // Edges relative to the start center, in the unrotated frame
        let (left, width) = resize_axis(-start.width / 2.0, start.width, direction.x, local.x, min_size);
        let (top, height) = resize_axis(-start.height / 2.0, start.height, direction.y, local.y, min_size);

        let local_center = Point::new(left + width / 2.0, top + height / 2.0);
        let center = start.center() + rotation.transform_vector(local_center);
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Placement describing `rect` under the session constraint
    pub fn live_placement(&self, rect: &Rect) -> Placement {
        capture_with_rotation(rect, &self.session_constraint, &self.container, Some(self.rotation))
    }

    /// Placement at session start under the session constraint
    pub fn start_placement(&self) -> Placement {
        self.live_placement(&self.start_rect)
    }
}

fn resize_axis(pos: f64, len: f64, sign: i8, delta: f64, min_size: f64) -> (f64, f64) {
    match sign {
        1 => (pos, (len + delta).max(min_size)),
        -1 => {
            let new_len = (len - delta).max(min_size);
            (pos + len - new_len, new_len)
        }
        _ => (pos, len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BasicKind;
    use std::sync::Arc;

    fn node(placement: Placement, constraint: Constraint, container: &Rect) -> ElementNode {
        let mut node = ElementNode::new(
            "Element 1",
            "rectangle",
            Arc::new(BasicKind::new("rectangle", "Rectangle")),
            placement,
            constraint,
        );
        node.apply_layout(container, true, 10.0);
        node
    }

    #[test]
    fn test_center_and_scale_swap_to_top_left() {
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let n = node(
            Placement::sized(100.0, 100.0),
            Constraint::new(VerticalConstraint::Center, HorizontalConstraint::Right),
            &container,
        );
        let session = ResizeSession::begin(&n, container);
        assert!(session.swapped());
        assert_eq!(
            session.session_constraint,
            Constraint::new(VerticalConstraint::Top, HorizontalConstraint::Right)
        );
        assert_eq!(session.start_placement().top, Some(150.0));
    }

    #[test]
    fn test_west_handle_keeps_right_edge() {
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let n = node(
            Placement::sized(100.0, 50.0).with_top(10.0).with_left(20.0),
            Constraint::top_left(),
            &container,
        );
        let session = ResizeSession::begin(&n, container);
        let rect = session.proposed_rect(ResizeDirection::W, Point::new(-30.0, 7.0), 10.0);
        assert_eq!(rect, Rect::new(-10.0, 10.0, 130.0, 50.0));
    }

    #[test]
    fn test_minimum_size_is_enforced() {
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let n = node(Placement::sized(100.0, 50.0), Constraint::top_left(), &container);
        let session = ResizeSession::begin(&n, container);
        let rect = session.proposed_rect(ResizeDirection::SE, Point::new(-500.0, -500.0), 10.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    fn assert_rect_close(actual: Rect, expected: Rect) {
        const TOLERANCE: f64 = 0.001;
        let close = (actual.x - expected.x).abs() < TOLERANCE
            && (actual.y - expected.y).abs() < TOLERANCE
            && (actual.width - expected.width).abs() < TOLERANCE
            && (actual.height - expected.height).abs() < TOLERANCE;
        assert!(close, "expected {:?}, got {:?}", expected, actual);
    }

    fn rotated_corner(rect: &Rect, rotation: f64, corner: Point) -> Point {
        RotationTransform::around_center(rotation, rect).transform_point(corner)
    }

    #[test]
    fn test_upside_down_east_handle_grows_width() {
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let n = node(
            Placement::sized(100.0, 100.0).with_rotation(180.0),
            Constraint::top_left(),
            &container,
        );
        let session = ResizeSession::begin(&n, container);
        // The east handle of a box turned upside down sits on the left
        let rect = session.proposed_rect(ResizeDirection::E, Point::new(-20.0, 0.0), 10.0);
        assert_rect_close(rect, Rect::new(-20.0, 0.0, 120.0, 100.0));
    }

    #[test]
    fn test_quarter_turn_east_handle_changes_width_only() {
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let n = node(
            Placement::sized(100.0, 50.0).with_top(100.0).with_left(100.0).with_rotation(90.0),
            Constraint::top_left(),
            &container,
        );
        let session = ResizeSession::begin(&n, container);
        let start = session.start_rect;

        // At 90° the east handle points down the screen
        let rect = session.proposed_rect(ResizeDirection::E, Point::new(0.0, 20.0), 10.0);
        assert!((rect.width - 120.0).abs() < 0.001, "width: {}", rect.width);
        assert!((rect.height - 50.0).abs() < 0.001, "height: {}", rect.height);

        // The west edge does not move on screen
        let before = rotated_corner(&start, 90.0, Point::new(start.x, start.y));
        let after = rotated_corner(&rect, 90.0, Point::new(rect.x, rect.y));
        assert!((before.x - after.x).abs() < 0.001 && (before.y - after.y).abs() < 0.001);
    }

    #[test]
    fn test_diagonal_east_handle_changes_width_only() {
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let n = node(
            Placement::sized(100.0, 50.0).with_top(100.0).with_left(100.0).with_rotation(45.0),
            Constraint::top_left(),
            &container,
        );
        let session = ResizeSession::begin(&n, container);
        let start = session.start_rect;

        let along_handle = Point::new(20.0 * 45f64.to_radians().cos(), 20.0 * 45f64.to_radians().sin());
        let rect = session.proposed_rect(ResizeDirection::E, along_handle, 10.0);
        assert!((rect.width - 120.0).abs() < 0.001, "width: {}", rect.width);
        assert!((rect.height - 50.0).abs() < 0.001, "height: {}", rect.height);

        let before = rotated_corner(&start, 45.0, Point::new(start.x, start.bottom()));
        let after = rotated_corner(&rect, 45.0, Point::new(rect.x, rect.bottom()));
        assert!((before.x - after.x).abs() < 0.001 && (before.y - after.y).abs() < 0.001);
    }

    #[test]
    fn test_drag_across_handle_axis_is_ignored() {
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let n = node(
            Placement::sized(100.0, 50.0).with_top(100.0).with_left(100.0).with_rotation(90.0),
            Constraint::top_left(),
            &container,
        );
        let session = ResizeSession::begin(&n, container);
        // Sideways on screen is along the local y axis, which the east handle does not edit
        let rect = session.proposed_rect(ResizeDirection::E, Point::new(30.0, 0.0), 10.0);
        assert_rect_close(rect, session.start_rect);
    }
}
