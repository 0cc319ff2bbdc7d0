//! Canvas Scene - scene graph and constraint layout engine for a freeform canvas
//!
//! This library keeps a tree of positionable elements, resolves their
//! constraint-based placements into absolute geometry, and turns direct
//! manipulation (drag, resize, rotate, reparent) back into placements.
//!
//! # Example
//!
//! ```rust
//! use canvas_scene::load_scene;
//!
//! let json = r#"{
//!     "type": "frame",
//!     "elements": [{
//!         "type": "rectangle",
//!         "name": "Element 1",
//!         "placement": { "top": 10, "left": 20, "width": 100, "height": 50 },
//!         "constraint": { "vertical": "top", "horizontal": "left" }
//!     }]
//! }"#;
//!
//! let (scene, report) = load_scene(json, 500.0, 400.0).unwrap();
//! assert!(report.is_clean());
//! let node = scene.node_by_name("Element 1").unwrap();
//! assert_eq!(node.rect().x, 20.0);
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod registry;
pub mod scene;

pub use config::{ConfigError, SceneConfig};
pub use error::SceneError;
pub use geometry::{Constraint, HorizontalConstraint, Placement, Point, Rect, VerticalConstraint};
pub use interaction::{ControllerState, ManipulationController};
pub use registry::{ElementKind, KindRegistry};
pub use scene::{ElementNode, ElementOptions, LoadReport, NodeId, Scene};

use std::sync::Arc;

/// Load a JSON scene document into a scene of the given viewport size,
/// using the built-in element kinds and default configuration
pub fn load_scene(json: &str, width: f64, height: f64) -> Result<(Scene, LoadReport), SceneError> {
    load_scene_with_config(json, width, height, SceneConfig::default())
}

/// [`load_scene`] with a custom configuration
pub fn load_scene_with_config(
    json: &str,
    width: f64,
    height: f64,
    config: SceneConfig,
) -> Result<(Scene, LoadReport), SceneError> {
    let registry = Arc::new(KindRegistry::with_builtin_kinds());
    let mut scene = Scene::new(registry, config).with_viewport(width, height);
    let report = scene.load_json(json)?;
    Ok((scene, report))
}
