//! Persisted placement and constraint model

use serde::{Deserialize, Serialize};

/// Vertical anchoring mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalConstraint {
    #[default]
    Top,
    Bottom,
    TopBottom,
    Center,
    Scale,
}

/// Horizontal anchoring mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HorizontalConstraint {
    #[default]
    Left,
    Right,
    LeftRight,
    Center,
    Scale,
}

impl VerticalConstraint {
    /// Whether this mode pins a fixed pixel edge (as opposed to center or scale)
    pub fn pins_edge(self) -> bool {
        matches!(self, Self::Top | Self::Bottom | Self::TopBottom)
    }
}

impl HorizontalConstraint {
    pub fn pins_edge(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::LeftRight)
    }
}

/// Per-axis anchoring of an element inside its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    pub vertical: VerticalConstraint,
    #[serde(default)]
    pub horizontal: HorizontalConstraint,
}

impl Constraint {
    pub fn new(vertical: VerticalConstraint, horizontal: HorizontalConstraint) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// `{top, left}`: the default for new and unconstrained elements
    pub fn top_left() -> Self {
        Self::default()
    }

    /// Which placement fields this constraint reads
    pub fn meaningful_fields(&self) -> PlacementFields {
        let mut fields = PlacementFields {
            rotation: true,
            ..PlacementFields::default()
        };
        match self.vertical {
            VerticalConstraint::Top | VerticalConstraint::Center => {
                fields.top = true;
                fields.height = true;
            }
            VerticalConstraint::Bottom => {
                fields.bottom = true;
                fields.height = true;
            }
            VerticalConstraint::TopBottom | VerticalConstraint::Scale => {
                fields.top = true;
                fields.bottom = true;
            }
        }
        match self.horizontal {
            HorizontalConstraint::Left | HorizontalConstraint::Center => {
                fields.left = true;
                fields.width = true;
            }
            HorizontalConstraint::Right => {
                fields.right = true;
                fields.width = true;
            }
            HorizontalConstraint::LeftRight | HorizontalConstraint::Scale => {
                fields.left = true;
                fields.right = true;
            }
        }
        fields
    }
}

/// Field mask over [`Placement`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementFields {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
    pub width: bool,
    pub height: bool,
    pub rotation: bool,
}

/// Persisted box description.
///
/// Units depend on the active [`Constraint`]: pixels for edge and center
/// modes, percentages of the container for `Scale`. Center modes store the
/// offset of the element center from the container center in `top`/`left`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Degrees, normalized to `[0, 360)` when written by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl Placement {
    /// A box of the given size at the container's top-left corner
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            top: Some(0.0),
            left: Some(0.0),
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn with_top(mut self, top: f64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_left(mut self, left: f64) -> Self {
        self.left = Some(left);
        self
    }

    pub fn with_right(mut self, right: f64) -> Self {
        self.right = Some(right);
        self
    }

    pub fn with_bottom(mut self, bottom: f64) -> Self {
        self.bottom = Some(bottom);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Rotation in degrees, 0 when unset
    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }

    /// Drop every field the constraint does not read
    pub fn normalized(&self, constraint: &Constraint) -> Placement {
        let keep = constraint.meaningful_fields();
        Placement {
            top: self.top.filter(|_| keep.top),
            left: self.left.filter(|_| keep.left),
            right: self.right.filter(|_| keep.right),
            bottom: self.bottom.filter(|_| keep.bottom),
            width: self.width.filter(|_| keep.width),
            height: self.height.filter(|_| keep.height),
            rotation: self.rotation.filter(|_| keep.rotation),
        }
    }

    /// Whether any required field for the constraint is absent
    pub fn is_missing_fields(&self, constraint: &Constraint) -> bool {
        let need = constraint.meaningful_fields();
        (need.top && self.top.is_none())
            || (need.bottom && self.bottom.is_none())
            || (need.left && self.left.is_none())
            || (need.right && self.right.is_none())
            || (need.width && self.width.is_none())
            || (need.height && self.height.is_none())
    }
}
