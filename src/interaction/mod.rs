//! Direct manipulation: pointer and keyboard gestures over a scene

pub mod controller;
pub mod events;
pub mod resize;
pub mod snapping;

pub use controller::{ControllerState, ManipulationController};
pub use events::{Handle, Key, Modifiers, PointerDown, ResizeDirection};
pub use resize::ResizeSession;
pub use snapping::{snap_rect, Guide, GuideAxis, Snap};
