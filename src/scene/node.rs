//! Scene nodes and their derived box style.
//!
//! A node keeps three views of its geometry:
//!
//! - the persisted [`Placement`] + [`Constraint`]
//! - the absolute layout rect computed from them (`rect`)
//! - a transient live offset applied on top of the layout during a drag
//!
//! [`DerivedStyle`] is the CSS-equivalent box a renderer would use; it is
//! recomputed by [`ElementNode::apply_layout`] and never persisted.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::geometry::{
    resolve, Constraint, HorizontalConstraint, Placement, Point, Rect, RotationTransform,
    VerticalConstraint,
};
use crate::registry::ElementKind;

use super::collaborators::StyleMap;
use super::document::ElementOptions;

// ============================================
// Identity
// ============================================

/// Process-unique node identifier, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque handle of the host surface rendering a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Role of a node that owns children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Frame,
    Group,
    /// The scene root; fills the viewport, has no placement semantics
    Root,
}

/// Ordered children of a container node
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerNode {
    pub kind: ContainerKind,
    pub children: Vec<NodeId>,
}

impl ContainerNode {
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

// ============================================
// Derived style
// ============================================

/// One CSS length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssLength {
    Px(f64),
    Percent(f64),
    /// `calc(50% - Npx)`, paired with a `-50%` anchor translate
    CenterOffset(f64),
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CssLength::Px(v) => write!(f, "{}px", v),
            CssLength::Percent(v) => write!(f, "{}%", v),
            CssLength::CenterOffset(v) if v < 0.0 => write!(f, "calc(50% + {}px)", -v),
            CssLength::CenterOffset(v) => write!(f, "calc(50% - {}px)", v),
        }
    }
}

/// Mouse cursor over a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Auto,
    Grab,
}

/// CSS-equivalent box of a node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedStyle {
    pub top: Option<CssLength>,
    pub bottom: Option<CssLength>,
    pub left: Option<CssLength>,
    pub right: Option<CssLength>,
    pub width: Option<CssLength>,
    pub height: Option<CssLength>,
    /// Anchor translate in percent of the element size, `Some(-50)` on
    /// centered axes
    pub anchor_x: Option<f64>,
    pub anchor_y: Option<f64>,
    /// Live drag offset, composed after the anchor translate
    pub offset: Point,
    pub rotation: f64,
    pub cursor: Cursor,
    pub pointer_events: bool,
    pub min_size: f64,
}

impl DerivedStyle {
    /// Box for a placement under a constraint
    pub fn compute(placement: &Placement, constraint: &Constraint, editing: bool, min_size: f64) -> Self {
        let px = |v: Option<f64>| Some(CssLength::Px(v.unwrap_or(0.0)));
        let pct = |v: Option<f64>| Some(CssLength::Percent(v.unwrap_or(0.0)));
        let size = |v: Option<f64>| Some(CssLength::Px(v.unwrap_or(crate::geometry::DEFAULT_SIZE)));

        let mut style = DerivedStyle {
            rotation: placement.rotation_degrees(),
            cursor: if editing { Cursor::Grab } else { Cursor::Auto },
            pointer_events: true,
            min_size,
            ..DerivedStyle::default()
        };

        match constraint.vertical {
            VerticalConstraint::Top => {
                style.top = px(placement.top);
                style.height = size(placement.height);
            }
            VerticalConstraint::Bottom => {
                style.bottom = px(placement.bottom);
                style.height = size(placement.height);
            }
            VerticalConstraint::TopBottom => {
                style.top = px(placement.top);
                style.bottom = px(placement.bottom);
            }
            VerticalConstraint::Center => {
                style.top = Some(CssLength::CenterOffset(placement.top.unwrap_or(0.0)));
                style.height = size(placement.height);
                style.anchor_y = Some(-50.0);
            }
            VerticalConstraint::Scale => {
                style.top = pct(placement.top);
                style.bottom = pct(placement.bottom);
            }
        }

        match constraint.horizontal {
            HorizontalConstraint::Left => {
                style.left = px(placement.left);
                style.width = size(placement.width);
            }
            HorizontalConstraint::Right => {
                style.right = px(placement.right);
                style.width = size(placement.width);
            }
            HorizontalConstraint::LeftRight => {
                style.left = px(placement.left);
                style.right = px(placement.right);
            }
            HorizontalConstraint::Center => {
                style.left = Some(CssLength::CenterOffset(placement.left.unwrap_or(0.0)));
                style.width = size(placement.width);
                style.anchor_x = Some(-50.0);
            }
            HorizontalConstraint::Scale => {
                style.left = pct(placement.left);
                style.right = pct(placement.right);
            }
        }

        style
    }

    /// Box filling a viewport, used by the root
    pub fn fill(viewport: &Rect) -> Self {
        DerivedStyle {
            top: Some(CssLength::Px(0.0)),
            left: Some(CssLength::Px(0.0)),
            width: Some(CssLength::Px(viewport.width)),
            height: Some(CssLength::Px(viewport.height)),
            pointer_events: true,
            ..DerivedStyle::default()
        }
    }

    /// Render as a CSS declaration list
    pub fn to_css(&self) -> String {
        let mut decls = vec!["position: absolute".to_string()];
        let edges = [
            ("top", self.top),
            ("bottom", self.bottom),
            ("left", self.left),
            ("right", self.right),
            ("width", self.width),
            ("height", self.height),
        ];
        for (prop, value) in edges {
            if let Some(value) = value {
                decls.push(format!("{}: {}", prop, value));
            }
        }
        if self.min_size > 0.0 {
            decls.push(format!("min-width: {}px", self.min_size));
            decls.push(format!("min-height: {}px", self.min_size));
        }
        decls.push(format!(
            "transform: translate({}, {}) rotate({}deg)",
            translate_component(self.anchor_x, self.offset.x),
            translate_component(self.anchor_y, self.offset.y),
            self.rotation
        ));
        let cursor = match self.cursor {
            Cursor::Auto => "auto",
            Cursor::Grab => "grab",
        };
        decls.push(format!("cursor: {}", cursor));
        decls.push(format!(
            "pointer-events: {}",
            if self.pointer_events { "auto" } else { "none" }
        ));
        decls.join("; ")
    }
}

fn translate_component(anchor: Option<f64>, offset: f64) -> String {
    match anchor {
        Some(pct) if offset == 0.0 => format!("{}%", pct),
        Some(pct) if offset < 0.0 => format!("calc({}% - {}px)", pct, -offset),
        Some(pct) => format!("calc({}% + {}px)", pct, offset),
        None => format!("{}px", offset),
    }
}

// ============================================
// Element node
// ============================================

/// One positionable unit of the scene
#[derive(Debug, Clone)]
pub struct ElementNode {
    id: NodeId,
    pub(crate) name: String,
    pub(crate) kind_id: String,
    pub(crate) kind: Arc<dyn ElementKind>,
    pub(crate) config: Value,
    pub(crate) placement: Placement,
    pub(crate) constraint: Constraint,
    pub(crate) parent: Option<NodeId>,
    pub(crate) container: Option<ContainerNode>,
    pub(crate) extra: Map<String, Value>,

    pub(crate) rect: Rect,
    pub(crate) style: DerivedStyle,
    pub(crate) data: Option<Value>,
    pub(crate) data_style: StyleMap,
    pub(crate) revision: u64,
    pub(crate) surface: Option<SurfaceHandle>,
    pub(crate) live_offset: Point,
}

impl ElementNode {
    pub(crate) fn new(
        name: impl Into<String>,
        kind_id: impl Into<String>,
        kind: Arc<dyn ElementKind>,
        placement: Placement,
        constraint: Constraint,
    ) -> Self {
        let container = kind.container().map(ContainerNode::new);
        Self {
            id: NodeId::next(),
            name: name.into(),
            kind_id: kind_id.into(),
            config: kind.default_config(),
            kind,
            placement,
            constraint,
            parent: None,
            container,
            extra: Map::new(),
            rect: Rect::zero(),
            style: DerivedStyle::default(),
            data: None,
            data_style: StyleMap::new(),
            revision: 0,
            surface: None,
            live_offset: Point::zero(),
        }
    }

    pub(crate) fn root(kind_id: impl Into<String>, kind: Arc<dyn ElementKind>) -> Self {
        let mut node = Self::new("", kind_id, kind, Placement::default(), Constraint::default());
        node.container = Some(ContainerNode::new(ContainerKind::Root));
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persisted `type` string, kept even when the kind is unknown
    pub fn kind_id(&self) -> &str {
        &self.kind_id
    }

    pub fn kind(&self) -> &Arc<dyn ElementKind> {
        &self.kind
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind.is_placeholder()
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn container_kind(&self) -> Option<ContainerKind> {
        self.container.as_ref().map(|c| c.kind)
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.container_kind() == Some(ContainerKind::Root)
    }

    /// Children in paint order, empty for leaves
    pub fn children(&self) -> &[NodeId] {
        self.container.as_ref().map_or(&[], |c| c.children.as_slice())
    }

    /// Absolute layout rect (without any live offset)
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Layout rect moved by the live drag offset
    pub fn visual_rect(&self) -> Rect {
        self.rect.translate(self.live_offset)
    }

    pub fn rotation(&self) -> RotationTransform {
        RotationTransform::around_center(self.placement.rotation_degrees(), &self.rect)
    }

    pub fn style(&self) -> &DerivedStyle {
        &self.style
    }

    /// Full CSS of the node: layout box followed by the data style
    pub fn css(&self) -> String {
        let mut css = self.style.to_css();
        for (prop, value) in &self.data_style {
            css.push_str(&format!("; {}: {}", prop, value));
        }
        css
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn data_style(&self) -> &StyleMap {
        &self.data_style
    }

    /// Bumped whenever the rendered output must refresh
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.surface
    }

    pub fn live_offset(&self) -> Point {
        self.live_offset
    }

    /// Persisted fields the core does not model
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Recompute the layout rect and derived style inside `container`.
    ///
    /// Clears the live offset. Non-root nodes also drop placement fields the
    /// constraint does not read, so applying twice changes nothing.
    pub fn apply_layout(&mut self, container: &Rect, editing: bool, min_size: f64) {
        self.live_offset = Point::zero();
        if self.is_root() {
            self.rect = *container;
            self.style = DerivedStyle::fill(container);
            return;
        }
        self.placement = self.placement.normalized(&self.constraint);
        self.rect = resolve(&self.placement, &self.constraint, container);
        self.style = DerivedStyle::compute(&self.placement, &self.constraint, editing, min_size);
    }

    /// Move the node visually without touching its placement
    pub(crate) fn set_live_offset(&mut self, offset: Point) {
        self.live_offset = offset;
        self.style.offset = offset;
    }

    /// Deep copy of the node's own state under a fresh id, detached
    pub(crate) fn duplicate_as(&self, name: impl Into<String>) -> ElementNode {
        let mut copy = self.clone();
        copy.id = NodeId::next();
        copy.name = name.into();
        copy.parent = None;
        if let Some(container) = copy.container.as_mut() {
            container.children.clear();
        }
        copy.surface = None;
        copy.live_offset = Point::zero();
        copy.style.offset = Point::zero();
        copy.revision = 0;
        copy
    }

    /// Persisted form without children
    pub(crate) fn to_options(&self) -> ElementOptions {
        let (placement, constraint) = if self.is_root() {
            (
                Some(self.placement).filter(|p| *p != Placement::default()),
                Some(self.constraint).filter(|c| *c != Constraint::default()),
            )
        } else {
            (
                Some(self.placement.normalized(&self.constraint)),
                Some(self.constraint),
            )
        };
        ElementOptions {
            kind_id: self.kind_id.clone(),
            name: Some(self.name.clone()).filter(|n| !n.is_empty()),
            config: self.config.clone(),
            placement,
            constraint,
            elements: self.container.as_ref().map(|_| Vec::new()),
            extra: self.extra.clone(),
        }
    }
}
