//! # Configuration System
//!
//! Serializable settings for the scene and per-context culling behavior,
//! loadable from TOML or RON files.

use serde::{Deserialize, Serialize};

/// Configuration trait with file load/save support
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read, the format is
    /// unsupported, or parsing fails.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if serialization or the write fails.
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Per-render-context culling settings.
///
/// Thresholds are optional: `None` disables the corresponding test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CullConfig {
    /// Whether to test world bounding volumes against the camera frustum
    pub frustum_culling: bool,

    /// Maximum camera distance; drawables farther than this are culled.
    /// Compared squared, so no square root is taken per node.
    pub max_distance: Option<f32>,

    /// Minimum approximate projected size (NDC height of the drawable's
    /// bounding sphere); smaller drawables are culled.
    pub min_screen_size: Option<f32>,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self {
            frustum_culling: true,
            max_distance: None,
            min_screen_size: None,
        }
    }
}

impl CullConfig {
    /// Enable or disable frustum culling
    #[must_use]
    pub fn with_frustum_culling(mut self, enabled: bool) -> Self {
        self.frustum_culling = enabled;
        self
    }

    /// Set the maximum draw distance
    #[must_use]
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = Some(distance);
        self
    }

    /// Set the minimum projected screen size
    #[must_use]
    pub fn with_min_screen_size(mut self, size: f32) -> Self {
        self.min_screen_size = Some(size);
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns a description of the first invalid threshold.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(d) = self.max_distance {
            if d <= 0.0 {
                return Err("Max distance must be positive".to_string());
            }
        }
        if let Some(s) = self.min_screen_size {
            if s <= 0.0 {
                return Err("Min screen size must be positive".to_string());
            }
        }
        Ok(())
    }
}

/// Top-level scene settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Human-readable scene name (used in log output)
    pub name: String,

    /// Whether to emit per-frame statistics at debug log level
    pub log_frame_stats: bool,

    /// Default culling settings applied to new render contexts
    pub cull: CullConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "scene".to_string(),
            log_frame_stats: false,
            cull: CullConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Create a configuration with the given scene name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Enable per-frame statistics logging
    #[must_use]
    pub fn with_frame_stats(mut self, enabled: bool) -> Self {
        self.log_frame_stats = enabled;
        self
    }

    /// Set the default culling settings
    #[must_use]
    pub fn with_cull(mut self, cull: CullConfig) -> Self {
        self.cull = cull;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Scene name cannot be empty".to_string());
        }
        self.cull.validate()
    }
}

impl Config for SceneConfig {}
impl Config for CullConfig {}
