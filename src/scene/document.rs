//! Persisted scene document.
//!
//! The document is a tree of [`ElementOptions`]; the root element is a frame
//! whose `elements` are the top-level nodes. Fields the core does not model
//! (`background`, `border`, `links`, `connections`, ...) are kept in `extra`
//! and written back unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::{Constraint, Placement};

/// Persisted form of one element and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementOptions {
    #[serde(rename = "type")]
    pub kind_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub config: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ElementOptions>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementOptions {
    /// A bare element of the given kind
    pub fn new(kind_id: impl Into<String>) -> Self {
        Self {
            kind_id: kind_id.into(),
            name: None,
            config: Value::Null,
            placement: None,
            constraint: None,
            elements: None,
            extra: Map::new(),
        }
    }

    /// An empty frame, the usual document root
    pub fn frame() -> Self {
        Self {
            elements: Some(Vec::new()),
            ..Self::new(crate::registry::FRAME_KIND)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Append a child, turning this element into a container if needed
    pub fn with_child(mut self, child: ElementOptions) -> Self {
        self.elements.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Parse a document from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Children, empty for leaves
    pub fn children(&self) -> &[ElementOptions] {
        self.elements.as_deref().unwrap_or(&[])
    }

    /// Find an element anywhere below (or at) this one by name
    pub fn find(&self, name: &str) -> Option<&ElementOptions> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(name))
    }
}

/// Category of a problem recovered while loading a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadIssueKind {
    /// `type` not in the registry; the placeholder kind is used
    UnknownKind,
    /// No placement, or one missing fields its constraint reads
    MissingPlacement,
    /// No name; one was generated
    MissingName,
    /// Name already taken; the node was renamed
    DuplicateName,
}

impl fmt::Display for LoadIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoadIssueKind::UnknownKind => "unknown kind",
            LoadIssueKind::MissingPlacement => "missing placement",
            LoadIssueKind::MissingName => "missing name",
            LoadIssueKind::DuplicateName => "duplicate name",
        };
        f.write_str(s)
    }
}

/// One recovered problem
#[derive(Debug, Clone, PartialEq)]
pub struct LoadIssue {
    pub kind: LoadIssueKind,
    /// Name the node ended up with
    pub element: String,
    pub message: String,
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.element, self.kind, self.message)
    }
}

/// Everything recovered while loading a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub issues: Vec<LoadIssue>,
    /// Nodes created, root excluded
    pub nodes: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, kind: LoadIssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }

    pub(crate) fn push(&mut self, kind: LoadIssueKind, element: &str, message: impl Into<String>) {
        self.issues.push(LoadIssue {
            kind,
            element: element.to_string(),
            message: message.into(),
        });
    }
}
