//! Input events understood by the manipulation controller

use crate::geometry::Point;
use crate::scene::SurfaceHandle;

/// Direction of a resize handle: each component is -1, 0 or 1.
///
/// `x = 1` is the right edge, `y = -1` the top edge; corners set both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDirection {
    pub x: i8,
    pub y: i8,
}

impl ResizeDirection {
    pub const N: Self = Self::new(0, -1);
    pub const S: Self = Self::new(0, 1);
    pub const E: Self = Self::new(1, 0);
    pub const W: Self = Self::new(-1, 0);
    pub const NE: Self = Self::new(1, -1);
    pub const NW: Self = Self::new(-1, -1);
    pub const SE: Self = Self::new(1, 1);
    pub const SW: Self = Self::new(-1, 1);

    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }
}

/// Which part of a node the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Handle {
    #[default]
    Body,
    Resize(ResizeDirection),
    Rotate,
}

/// Keyboard modifiers held during an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        alt: false,
    };
}

/// Pointer press
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub position: Point,
    /// Surface under the pointer as reported by the host, if any
    pub target: Option<SurfaceHandle>,
    pub handle: Handle,
    pub modifiers: Modifiers,
}

impl PointerDown {
    /// Press at `position`; the target is found by hit testing
    pub fn at(position: Point) -> Self {
        Self {
            position,
            target: None,
            handle: Handle::Body,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn on_surface(mut self, target: SurfaceHandle) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = handle;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Unit nudge vector for arrow keys
    pub fn nudge_direction(self) -> Option<Point> {
        match self {
            Key::ArrowUp => Some(Point::new(0.0, -1.0)),
            Key::ArrowDown => Some(Point::new(0.0, 1.0)),
            Key::ArrowLeft => Some(Point::new(-1.0, 0.0)),
            Key::ArrowRight => Some(Point::new(1.0, 0.0)),
            _ => None,
        }
    }
}
