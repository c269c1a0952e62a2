//! Configuration system

pub use serde::{Serialize, Deserialize};

use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load configuration from file, falling back to defaults when the file is absent
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
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

/// Viewer settings: window, camera and default model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Initial window width in pixels
    pub window_width: u32,
    /// Initial window height in pixels
    pub window_height: u32,
    /// Model loaded when the user enters an empty path
    pub default_model: String,
    /// Framebuffer clear color (RGBA)
    pub clear_color: [f32; 4],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Camera position when the model is first shown
    pub camera_start: [f32; 3],
    /// Camera translation speed in units per second
    pub move_speed: f32,
    /// Camera turn speed in degrees per second
    pub turn_speed_degrees: f32,
    /// Speed multiplier while the boost key is held
    pub boost_factor: f32,
    /// Absolute pitch limit in degrees
    pub pitch_limit_degrees: f32,
    /// Uniform scale applied to the loaded model
    pub model_scale: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            default_model: "./models/peach_castle/peach_castle.obj".to_string(),
            clear_color: [0.357, 0.737, 0.894, 1.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            camera_start: [0.0, 2.0, 10.0],
            move_speed: 2.5,
            turn_speed_degrees: 90.0,
            boost_factor: 2.0,
            pitch_limit_degrees: 89.9,
            model_scale: 1.0,
        }
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "window_width = 1024\nfov_degrees = 60.0\n").unwrap();

        let config = ViewerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.fov_degrees, 60.0);
        assert_eq!(config.window_height, 600);
        assert_eq!(config.camera_start, [0.0, 2.0, 10.0]);
    }

    #[test]
    fn test_ron_round_trip() {
        let file = Builder::new().suffix(".ron").tempfile().unwrap();
        let config = ViewerConfig {
            default_model: "models/cube.obj".to_string(),
            move_speed: 5.0,
            ..Default::default()
        };
        config.save_to_file(file.path()).unwrap();

        let loaded = ViewerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ViewerConfig::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load_or_default(dir.path().join("viewer.toml")).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }
}
