//! Scene configuration
//!
//! Defaults match the behavior of the interactive editor. A configuration can
//! be loaded from TOML; every key is optional:
//!
//! ```toml
//! [elements]
//! default_size = [100.0, 100.0]
//! min_size = 10.0
//! duplicate_offset = 10.0
//! name_probe_attempts = 100
//!
//! [interaction]
//! snapping = true
//! snap_threshold = 5.0
//! nudge_step = 1.0
//! nudge_step_large = 10.0
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for a scene and its manipulation controller
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Size given to elements whose kind has no default (width, height)
    pub default_element_size: (f64, f64),

    /// Smallest width/height a resize can produce
    pub min_element_size: f64,

    /// Distance a shifted duplicate moves along each pinned edge
    pub duplicate_offset: f64,

    /// Numbered names tried before falling back to a timestamp name
    pub name_probe_attempts: usize,

    /// Snap dragged elements to sibling edges and centers
    pub snapping: bool,

    /// Maximum distance (px) at which snapping engages
    pub snap_threshold: f64,

    /// Arrow-key nudge distance
    pub nudge_step: f64,

    /// Arrow-key nudge distance with shift held
    pub nudge_step_large: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_element_size: (100.0, 100.0),
            min_element_size: 10.0,
            duplicate_offset: 10.0,
            name_probe_attempts: 100,
            snapping: true,
            snap_threshold: 5.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    elements: TomlElements,
    #[serde(default)]
    interaction: TomlInteraction,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlElements {
    default_size: Option<(f64, f64)>,
    min_size: Option<f64>,
    duplicate_offset: Option<f64>,
    name_probe_attempts: Option<usize>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlInteraction {
    snapping: Option<bool>,
    snap_threshold: Option<f64>,
    nudge_step: Option<f64>,
    nudge_step_large: Option<f64>,
}

impl SceneConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string, unset keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        Ok(Self {
            default_element_size: parsed
                .elements
                .default_size
                .unwrap_or(defaults.default_element_size),
            min_element_size: parsed.elements.min_size.unwrap_or(defaults.min_element_size),
            duplicate_offset: parsed
                .elements
                .duplicate_offset
                .unwrap_or(defaults.duplicate_offset),
            name_probe_attempts: parsed
                .elements
                .name_probe_attempts
                .unwrap_or(defaults.name_probe_attempts),
            snapping: parsed.interaction.snapping.unwrap_or(defaults.snapping),
            snap_threshold: parsed
                .interaction
                .snap_threshold
                .unwrap_or(defaults.snap_threshold),
            nudge_step: parsed.interaction.nudge_step.unwrap_or(defaults.nudge_step),
            nudge_step_large: parsed
                .interaction
                .nudge_step_large
                .unwrap_or(defaults.nudge_step_large),
        })
    }

    /// Set the fallback element size
    pub fn with_default_element_size(mut self, width: f64, height: f64) -> Self {
        self.default_element_size = (width, height);
        self
    }

    /// Set the minimum element size
    pub fn with_min_element_size(mut self, size: f64) -> Self {
        self.min_element_size = size;
        self
    }

    /// Set the duplicate offset
    pub fn with_duplicate_offset(mut self, offset: f64) -> Self {
        self.duplicate_offset = offset;
        self
    }

    /// Enable or disable snapping
    pub fn with_snapping(mut self, snapping: bool) -> Self {
        self.snapping = snapping;
        self
    }

    /// Set the snap threshold
    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold;
        self
    }
}
