//! Interfaces the scene needs from the host.
//!
//! Data binding and connection routing live outside the core; the scene only
//! calls into them at well-defined points.

use std::collections::BTreeMap;

use serde_json::Value;

use super::node::ElementNode;

/// Resolved CSS-like style properties (`background-color`, `border`, ...)
pub type StyleMap = BTreeMap<String, String>;

/// Resolves data-bound config and styling for the current data frame
pub trait DataContext {
    /// Style derived from the node's persisted `background`/`border` options
    fn resolve_style(&self, node: &ElementNode) -> StyleMap;

    /// Kind config with data bindings replaced by current values
    fn resolve_config(&self, config: &Value) -> Value {
        config.clone()
    }
}

/// Connection routing between elements, keyed by element name
pub trait Connections {
    /// Whether the named element is a source or target of any connection
    fn participates(&self, name: &str) -> bool;

    /// Called after a rename so connection targets can follow
    fn on_rename(&mut self, old: &str, new: &str);

    /// Called after a participant's geometry was committed
    fn on_placement_changed(&mut self, node: &ElementNode);

    /// Called for every node removed by a delete
    fn on_delete(&mut self, node: &ElementNode);
}

/// A data context that resolves nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticData;

impl DataContext for StaticData {
    fn resolve_style(&self, _node: &ElementNode) -> StyleMap {
        StyleMap::new()
    }
}
