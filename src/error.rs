//! Error types for scene operations

use thiserror::Error;

use crate::scene::node::NodeId;

/// Errors that can occur while loading or editing a scene
#[derive(Debug, Error)]
pub enum SceneError {
    /// Another node already uses the name
    #[error("an element named '{name}' already exists")]
    DuplicateName { name: String },

    /// Node id not present in the scene
    #[error("node {id} not found")]
    NodeNotFound { id: NodeId },

    /// Children requested from a leaf node
    #[error("element '{name}' is not a container")]
    NotAContainer { name: String },

    /// Child index beyond the end of the child list
    #[error("index {index} out of bounds for '{container}' ({len} children)")]
    IndexOutOfBounds {
        container: String,
        index: usize,
        len: usize,
    },

    /// Names must be non-empty
    #[error("element names cannot be empty")]
    EmptyName,

    /// Malformed scene document
    #[error("invalid scene document: {0}")]
    Document(#[from] serde_json::Error),
}

impl SceneError {
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    pub fn not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    pub fn not_a_container(name: impl Into<String>) -> Self {
        Self::NotAContainer { name: name.into() }
    }

    pub fn index_out_of_bounds(container: impl Into<String>, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            container: container.into(),
            index,
            len,
        }
    }
}
