//! Placement resolution.
//!
//! Two pure, container-relative operations:
//!
//! - [`resolve`]: placement + constraint + container rect -> absolute rect
//! - [`capture`]: absolute rect + constraint + container rect -> placement
//!
//! `capture` is the inverse of `resolve` up to integer pixel rounding of the
//! edge offsets. It runs after every manipulation gesture so the stored numbers
//! always describe the current geometry under the element's constraint.
//!
//! Both axes share the same arithmetic; each constraint mode maps onto an
//! [`AxisMode`] over a `(near, far, size)` triple, where near/far are
//! top/bottom or left/right.

use super::placement::{Constraint, HorizontalConstraint, Placement, VerticalConstraint};
use super::transform::normalize_degrees;
use super::types::Rect;

/// Size used when a placement has no width/height yet
pub const DEFAULT_SIZE: f64 = 100.0;

/// Axis-agnostic view of a constraint mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisMode {
    /// Pinned to the near edge (top / left)
    Near,
    /// Pinned to the far edge (bottom / right)
    Far,
    /// Both edges pinned, size implicit
    Stretch,
    /// Offset from the container center
    Center,
    /// Both edges as percentages of the container extent
    Scale,
}

impl From<VerticalConstraint> for AxisMode {
    fn from(v: VerticalConstraint) -> Self {
        match v {
            VerticalConstraint::Top => AxisMode::Near,
            VerticalConstraint::Bottom => AxisMode::Far,
            VerticalConstraint::TopBottom => AxisMode::Stretch,
            VerticalConstraint::Center => AxisMode::Center,
            VerticalConstraint::Scale => AxisMode::Scale,
        }
    }
}

impl From<HorizontalConstraint> for AxisMode {
    fn from(h: HorizontalConstraint) -> Self {
        match h {
            HorizontalConstraint::Left => AxisMode::Near,
            HorizontalConstraint::Right => AxisMode::Far,
            HorizontalConstraint::LeftRight => AxisMode::Stretch,
            HorizontalConstraint::Center => AxisMode::Center,
            HorizontalConstraint::Scale => AxisMode::Scale,
        }
    }
}

/// Stored numbers for one axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisPlacement {
    pub near: Option<f64>,
    pub far: Option<f64>,
    pub size: Option<f64>,
}

/// Resolve a placement into an absolute rectangle inside `container`.
///
/// Missing offsets read as 0, missing sizes as [`DEFAULT_SIZE`]. Stretch and
/// scale sizes never go negative.
pub fn resolve(placement: &Placement, constraint: &Constraint, container: &Rect) -> Rect {
    let (y, height) = resolve_axis(
        constraint.vertical.into(),
        AxisPlacement {
            near: placement.top,
            far: placement.bottom,
            size: placement.height,
        },
        container.y,
        container.height,
    );
    let (x, width) = resolve_axis(
        constraint.horizontal.into(),
        AxisPlacement {
            near: placement.left,
            far: placement.right,
            size: placement.width,
        },
        container.x,
        container.width,
    );
    Rect::new(x, y, width, height)
}

/// Capture an absolute rectangle as a placement under `constraint`.
///
/// Only the fields the constraint reads are set; rotation is left to the
/// caller (see [`capture_with_rotation`]).
pub fn capture(rect: &Rect, constraint: &Constraint, container: &Rect) -> Placement {
    let vertical = capture_axis(
        constraint.vertical.into(),
        rect.y,
        rect.height,
        container.y,
        container.height,
    );
    let horizontal = capture_axis(
        constraint.horizontal.into(),
        rect.x,
        rect.width,
        container.x,
        container.width,
    );
    Placement {
        top: vertical.near,
        bottom: vertical.far,
        height: vertical.size,
        left: horizontal.near,
        right: horizontal.far,
        width: horizontal.size,
        rotation: None,
    }
}

/// [`capture`], carrying a rotation over verbatim (normalized to `[0, 360)`)
pub fn capture_with_rotation(
    rect: &Rect,
    constraint: &Constraint,
    container: &Rect,
    rotation: Option<f64>,
) -> Placement {
    Placement {
        rotation: rotation.map(normalize_degrees),
        ..capture(rect, constraint, container)
    }
}

/// Position and length along one axis
pub fn resolve_axis(mode: AxisMode, stored: AxisPlacement, origin: f64, extent: f64) -> (f64, f64) {
    let near = stored.near.unwrap_or(0.0);
    let far = stored.far.unwrap_or(0.0);
    let size = stored.size.unwrap_or(DEFAULT_SIZE);

    match mode {
        AxisMode::Near => (origin + near, size),
        AxisMode::Far => (origin + extent - far - size, size),
        AxisMode::Stretch => (origin + near, (extent - near - far).max(0.0)),
        AxisMode::Center => (origin + extent / 2.0 - near - size / 2.0, size),
        AxisMode::Scale => {
            let near_px = near * extent / 100.0;
            let far_px = far * extent / 100.0;
            (origin + near_px, (extent - near_px - far_px).max(0.0))
        }
    }
}

/// Stored numbers for one axis, inverse of [`resolve_axis`]
pub fn capture_axis(mode: AxisMode, pos: f64, len: f64, origin: f64, extent: f64) -> AxisPlacement {
    let rel_near = round_px(pos - origin);
    let rel_far = round_px(origin + extent - (pos + len));

    match mode {
        AxisMode::Near => AxisPlacement {
            near: Some(rel_near),
            far: None,
            size: Some(len),
        },
        AxisMode::Far => AxisPlacement {
            near: None,
            far: Some(rel_far),
            size: Some(len),
        },
        AxisMode::Stretch => AxisPlacement {
            near: Some(rel_near),
            far: Some(rel_far),
            size: None,
        },
        AxisMode::Center => {
            let element_center = rel_near + len / 2.0;
            AxisPlacement {
                near: Some(extent / 2.0 - element_center),
                far: None,
                size: Some(len),
            }
        }
        AxisMode::Scale => {
            // Zero-extent containers have no meaningful percentage
            let (near, far) = if extent.is_finite() && extent > 0.0 {
                (rel_near / extent * 100.0, rel_far / extent * 100.0)
            } else {
                (0.0, 0.0)
            };
            AxisPlacement {
                near: Some(near),
                far: Some(far),
                size: None,
            }
        }
    }
}

fn round_px(v: f64) -> f64 {
    // `+ 0.0` folds -0.0 into 0.0 so it serializes cleanly
    v.round() + 0.0
}
