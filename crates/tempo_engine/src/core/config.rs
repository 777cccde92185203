//! # Unified Configuration System
//!
//! Configuration for the loop driver, the display collaborator and engine-wide
//! diagnostics. Every section deserializes with defaults for missing fields so
//! a config file only needs to name what it changes.
//!
//! ```toml
//! [engine]
//! log_level = "debug"
//! error_mode = "release"
//!
//! [timing]
//! target_ups = 120
//! max_frame_skips = 8
//!
//! [window]
//! title = "Orbit"
//! width = 1280
//! height = 720
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// How collaborator failures during a session are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Report collaborator errors and then stop the session with a fatal error
    #[default]
    Development,
    /// Report collaborator errors and keep the session running
    Release,
}

impl ErrorMode {
    /// Whether collaborator errors end the session
    pub fn escalates_collaborator_errors(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// # Engine Configuration
///
/// Logging and error policy shared by the whole session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter for the engine
    pub log_level: String,
    /// Collaborator error policy
    pub error_mode: ErrorMode,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            error_mode: ErrorMode::Development,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the collaborator error policy
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Timing Configuration
///
/// Fixed-timestep parameters. Both values are latched when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Update steps per second
    pub target_ups: u32,
    /// Maximum catch-up update steps per outer loop iteration
    pub max_frame_skips: u32,
}

impl TimingConfig {
    /// Create a new timing configuration
    pub fn new() -> Self {
        Self {
            target_ups: 60,
            max_frame_skips: 5,
        }
    }

    /// Set the target update rate
    pub fn with_target_ups(mut self, ups: u32) -> Self {
        self.target_ups = ups;
        self
    }

    /// Set the catch-up bound
    pub fn with_max_frame_skips(mut self, skips: u32) -> Self {
        self.max_frame_skips = skips;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.target_ups == 0 {
            return Err("Target UPS must be at least 1".to_string());
        }
        if self.max_frame_skips == 0 {
            return Err("Max frame skips must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Window Configuration
///
/// Initial parameters handed to the display collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Whether the window may be resized
    pub resizable: bool,
}

impl WindowConfig {
    /// Create a new window configuration
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 800,
            height: 600,
            resizable: true,
        }
    }

    /// Set the window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() {
            return Err("Window title cannot be empty".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!("Window size {}x{} is empty", self.width, self.height));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("Tempo Engine Application")
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Loop timing configuration
    pub timing: TimingConfig,
    /// Display configuration
    pub window: WindowConfig,
}

impl ApplicationConfig {
    /// Create a new application configuration with defaults
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            engine: EngineConfig::default(),
            timing: TimingConfig::default(),
            window: WindowConfig::new(app_name),
        }
    }

    /// Replace the timing section
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Replace the engine section
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

impl Config for ApplicationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate().map_err(ConfigError::Invalid)?;
        self.window.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_loop() {
        let config = ApplicationConfig::default();
        assert_eq!(config.timing.target_ups, 60);
        assert_eq!(config.timing.max_frame_skips, 5);
        assert_eq!(config.engine.error_mode, ErrorMode::Development);
        assert!(Config::validate(&config).is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ApplicationConfig::from_toml_str(
            r#"
            [engine]
            error_mode = "release"

            [timing]
            target_ups = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.error_mode, ErrorMode::Release);
        assert_eq!(config.engine.log_level, "info");
        assert_eq!(config.timing.target_ups, 120);
        assert_eq!(config.timing.max_frame_skips, 5);
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn test_zero_target_ups_is_rejected() {
        let result = ApplicationConfig::from_toml_str("[timing]\ntarget_ups = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_error_mode_fails_to_parse() {
        let result = ApplicationConfig::from_toml_str("[engine]\nerror_mode = \"loud\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = ApplicationConfig::load_from_file("settings.ini");
        // The file does not exist either; the extension check runs after reading.
        assert!(matches!(result, Err(ConfigError::Io(_))));

        let config = ApplicationConfig::default();
        let saved = config.save_to_file("settings.ini");
        assert!(matches!(saved, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_error_mode_policy() {
        assert!(ErrorMode::Development.escalates_collaborator_errors());
        assert!(!ErrorMode::Release.escalates_collaborator_errors());
    }
}
