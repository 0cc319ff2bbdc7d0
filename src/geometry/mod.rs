//! Geometry: rectangles, the placement/constraint model and the resolver
//! that converts between them.

pub mod placement;
pub mod resolver;
pub mod transform;
pub mod types;

pub use placement::{Constraint, HorizontalConstraint, Placement, PlacementFields, VerticalConstraint};
pub use resolver::{capture, capture_with_rotation, resolve, AxisMode, DEFAULT_SIZE};
pub use transform::{normalize_degrees, RotationTransform};
pub use types::{Point, Rect};
