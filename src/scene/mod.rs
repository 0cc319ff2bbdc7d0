//! Scene graph
//!
//! This module contains:
//! - Node types and their derived style
//! - The scene aggregate (arena, name index, selection, persistence hook)
//! - Structural tree operations
//! - The selection index and hit testing

pub mod collaborators;
pub mod document;
pub mod graph;
pub mod node;
pub mod selection;
pub mod tree;

pub use collaborators::{Connections, DataContext, StaticData, StyleMap};
pub use document::{ElementOptions, LoadIssue, LoadIssueKind, LoadReport};
pub use graph::{DeferredTask, Scene};
pub use node::{ContainerKind, ContainerNode, CssLength, Cursor, DerivedStyle, ElementNode, NodeId, SurfaceHandle};
pub use selection::SelectionIndex;
pub use tree::{DetachedSubtree, ZOrder};
