//! Window configuration
//!
//! The shell takes a single value struct at construction: window title and
//! dimensions, plus the clear color used by the color pass. Supports TOML
//! for applications that want to keep the values in a file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading/validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file could not be parsed as TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field value is out of range
    #[error("invalid config: {reason}")]
    Invalid {
        /// Description of the offending value
        reason: String,
    },
}

/// Window creation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial window width in screen coordinates
    pub width: u32,
    /// Initial window height in screen coordinates
    pub height: u32,
    /// RGBA clear color for the color pass
    pub clear_color: [f32; 4],
}

impl WindowConfig {
    /// Create a config with the given title and size
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            clear_color: Self::default().clear_color,
        }
    }

    /// Load a config from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse a config from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid {
                reason: format!("window size must be non-zero, got {}x{}", self.width, self.height),
            });
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "vkshell".to_string(),
            width: 1280,
            height: 720,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_from_toml() {
        let toml_str = r#"
            title = "editor"
            width = 1920
            height = 1080
            clear_color = [0.1, 0.1, 0.1, 1.0]
        "#;

        let config = WindowConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.title, "editor");
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 1080);
        assert_eq!(config.clear_color, [0.1, 0.1, 0.1, 1.0]);
    }

    #[test]
    fn rejects_zero_dimensions() {
        let toml_str = r#"
            title = "bad"
            width = 0
            height = 600
            clear_color = [0.0, 0.0, 0.0, 1.0]
        "#;

        assert!(matches!(
            WindowConfig::from_toml(toml_str),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn default_is_valid() {
        assert!(WindowConfig::default().validate().is_ok());
    }
}
