//! Element-kind registry
//!
//! Maps a persisted `type` string to the behavior of that kind of element.
//! The registry is built once by the host and handed to every [`Scene`] it
//! creates, so scenes never share mutable registry state.
//!
//! Unknown kinds resolve to the [`NOT_FOUND_KIND`] placeholder; the node keeps
//! its original `type` string so a later save does not lose it.
//!
//! [`Scene`]: crate::scene::Scene

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::scene::collaborators::DataContext;
use crate::scene::node::ContainerKind;

/// Kind id of the placeholder used for unknown kinds
pub const NOT_FOUND_KIND: &str = "not-found";

/// Kind id of frames
pub const FRAME_KIND: &str = "frame";

/// Kind id of groups
pub const GROUP_KIND: &str = "group";

/// Errors that can occur during registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Duplicate kind registration
    #[error("duplicate element kind: {id}")]
    Duplicate { id: String },
}

/// Behavior of one element kind.
///
/// Rendering is the host's business; the core only needs defaults for new
/// nodes, whether the kind owns children, and a hook to prepare render data.
pub trait ElementKind: fmt::Debug {
    /// Persisted `type` string
    fn id(&self) -> &str;

    /// Human readable name
    fn name(&self) -> &str {
        self.id()
    }

    /// `Some` for kinds whose nodes own children
    fn container(&self) -> Option<ContainerKind> {
        None
    }

    /// Config given to newly created nodes
    fn default_config(&self) -> Value {
        Value::Null
    }

    /// Size given to newly created nodes, `None` uses the scene default
    fn default_size(&self) -> Option<(f64, f64)> {
        None
    }

    /// Resolve the node config against current data. `None` means the kind
    /// renders from config alone.
    fn prepare_data(&self, _ctx: &dyn DataContext, _config: &Value) -> Option<Value> {
        None
    }

    /// True only for the placeholder standing in for an unknown kind
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// A table-driven kind: enough for every built-in kind the core knows about
#[derive(Debug, Clone)]
pub struct BasicKind {
    id: String,
    name: String,
    default_config: Value,
    default_size: Option<(f64, f64)>,
    container: Option<ContainerKind>,
    data_bound: bool,
}

impl BasicKind {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            default_config: Value::Null,
            default_size: None,
            container: None,
            data_bound: false,
        }
    }

    pub fn with_default_config(mut self, config: Value) -> Self {
        self.default_config = config;
        self
    }

    pub fn with_default_size(mut self, width: f64, height: f64) -> Self {
        self.default_size = Some((width, height));
        self
    }

    pub fn with_container(mut self, kind: ContainerKind) -> Self {
        self.container = Some(kind);
        self
    }

    /// Ask the data context to resolve the config on every data update
    pub fn data_bound(mut self) -> Self {
        self.data_bound = true;
        self
    }
}

impl ElementKind for BasicKind {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn container(&self) -> Option<ContainerKind> {
        self.container
    }

    fn default_config(&self) -> Value {
        self.default_config.clone()
    }

    fn default_size(&self) -> Option<(f64, f64)> {
        self.default_size
    }

    fn prepare_data(&self, ctx: &dyn DataContext, config: &Value) -> Option<Value> {
        self.data_bound.then(|| ctx.resolve_config(config))
    }
}

/// Placeholder for kinds missing from the registry
#[derive(Debug, Default)]
pub struct NotFoundKind;

impl ElementKind for NotFoundKind {
    fn id(&self) -> &str {
        NOT_FOUND_KIND
    }

    fn name(&self) -> &str {
        "Not found"
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}

/// Registry of element kinds
pub struct KindRegistry {
    kinds: HashMap<String, Arc<dyn ElementKind>>,
    not_found: Arc<dyn ElementKind>,
}

impl fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("KindRegistry").field("kinds", &ids).finish()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KindRegistry {
    /// Create an empty registry (frames are always known)
    pub fn new() -> Self {
        let mut kinds: HashMap<String, Arc<dyn ElementKind>> = HashMap::new();
        kinds.insert(
            FRAME_KIND.to_string(),
            Arc::new(BasicKind::new(FRAME_KIND, "Frame").with_container(ContainerKind::Frame)),
        );
        Self {
            kinds,
            not_found: Arc::new(NotFoundKind),
        }
    }

    /// Registry with the built-in element kinds of the canvas panel
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        let builtins = [
            BasicKind::new(GROUP_KIND, "Group").with_container(ContainerKind::Group),
            BasicKind::new("rectangle", "Rectangle")
                .with_default_config(json!({ "align": "center", "valign": "middle" }))
                .data_bound(),
            BasicKind::new("ellipse", "Ellipse").data_bound(),
            BasicKind::new("triangle", "Triangle").data_bound(),
            BasicKind::new("text", "Text")
                .with_default_config(json!({ "text": { "mode": "fixed", "fixed": "" } }))
                .with_default_size(240.0, 50.0)
                .data_bound(),
            BasicKind::new("metric-value", "Metric value")
                .with_default_size(260.0, 50.0)
                .data_bound(),
            BasicKind::new("icon", "Icon")
                .with_default_config(json!({ "path": "img/icons/unicons/question-circle.svg" }))
                .with_default_size(50.0, 50.0)
                .data_bound(),
            BasicKind::new("button", "Button").with_default_size(78.0, 32.0),
        ];
        for kind in builtins {
            // Built-in ids are distinct
            let _ = registry.register(Arc::new(kind));
        }
        registry
    }

    /// Register a kind
    pub fn register(&mut self, kind: Arc<dyn ElementKind>) -> Result<(), RegistryError> {
        let id = kind.id().to_string();
        if self.kinds.contains_key(&id) {
            return Err(RegistryError::Duplicate { id });
        }
        self.kinds.insert(id, kind);
        Ok(())
    }

    /// Get a kind by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn ElementKind>> {
        self.kinds.get(id).cloned()
    }

    /// Get a kind by id, falling back to the placeholder
    pub fn get_or_not_found(&self, id: &str) -> Arc<dyn ElementKind> {
        self.get(id).unwrap_or_else(|| Arc::clone(&self.not_found))
    }

    /// Check if a kind exists
    pub fn contains(&self, id: &str) -> bool {
        self.kinds.contains_key(id)
    }

    /// All registered kind ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
