//! TOML Configuration File Support
//!
//! Centralized configuration loading for atelier, supporting a TOML file at
//! `~/.config/atelier/atelier.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "https://generativelanguage.googleapis.com"
//! timeout_secs = 120
//!
//! [models]
//! concept = "gemini-2.5-flash"
//! image = "gemini-2.5-flash-image"
//! search = "gemini-2.5-flash"
//!
//! [studio]
//! max_leads = 4
//! max_payload_bytes = 20971520
//! completion_buffer = 32
//!
//! [theme]
//! name = "Neon Vogue"
//! primary_color = "#FF0080"
//! secondary_color = "#00FFFF"
//! background_gradient = "linear-gradient(135deg, #050505 0%, #1a0b2e 50%, #000000 100%)"
//! text_color = "#ffffff"
//! ```
//!
//! The API key never comes from the file: it is read from `GEMINI_API_KEY`,
//! then `API_KEY`, and can be overridden on the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendConfig;
use crate::conductor::ConductorConfig;
use crate::gateway::GatewayConfig;
use crate::staging::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::theme::Theme;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the highest-priority configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// API base URL
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Models section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsToml {
    /// Concept synthesis model
    pub concept: Option<String>,
    /// Image model
    pub image: Option<String>,
    /// Grounded search model
    pub search: Option<String>,
}

/// Studio section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioToml {
    /// Maximum leads per concept
    pub max_leads: Option<usize>,
    /// Inline payload limit in bytes
    pub max_payload_bytes: Option<usize>,
    /// Completion channel capacity
    pub completion_buffer: Option<usize>,
}

/// Complete TOML configuration file structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtelierToml {
    /// Backend connection
    pub backend: BackendToml,
    /// Model selection
    pub models: ModelsToml,
    /// Studio limits
    pub studio: StudioToml,
    /// Default presentation theme
    pub theme: Option<Theme>,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Resolved configuration after merging all sources
#[derive(Clone, Debug)]
pub struct StudioConfig {
    /// Backend connection
    pub backend: BackendConfig,
    /// Gateway models and limits
    pub gateway: GatewayConfig,
    /// Conductor settings
    pub conductor: ConductorConfig,
    /// Inline payload limit in bytes
    pub max_payload_bytes: usize,
    /// Path of the config file that was loaded, if any
    pub config_file_path: Option<PathBuf>,
    /// Highest-priority source that contributed a value
    pub source: ConfigSource,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            gateway: GatewayConfig::default(),
            conductor: ConductorConfig::default(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl StudioConfig {
    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.max_leads == 0 {
            return Err(ConfigError::ValidationError(
                "max_leads must be at least 1".to_string(),
            ));
        }
        if self.max_payload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_payload_bytes must be at least 1".to_string(),
            ));
        }
        self.conductor
            .default_theme
            .check()
            .map_err(|(field, reason)| {
                ConfigError::ValidationError(format!("theme {field}: {reason}"))
            })
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/atelier/atelier.toml` or
/// `~/.config/atelier/atelier.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("atelier").join("atelier.toml"))
}

/// Load configuration from the default path, defaults and environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<StudioConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed, or if
/// the merged values fail validation.
pub fn load_config_from_path(path: Option<&Path>) -> Result<StudioConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration from a specific path, reading variables through `lookup`
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<StudioConfig, ConfigError> {
    let mut config = StudioConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: AtelierToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, lookup);
    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut StudioConfig, toml: AtelierToml) {
    if let Some(base_url) = toml.backend.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(timeout) = toml.backend.timeout_secs {
        config.backend.timeout_secs = timeout;
    }

    if let Some(model) = toml.models.concept {
        config.gateway.concept_model = model;
    }
    if let Some(model) = toml.models.image {
        config.gateway.image_model = model;
    }
    if let Some(model) = toml.models.search {
        config.gateway.search_model = model;
    }

    if let Some(max_leads) = toml.studio.max_leads {
        config.gateway.max_leads = max_leads;
    }
    if let Some(limit) = toml.studio.max_payload_bytes {
        config.max_payload_bytes = limit;
    }
    if let Some(buffer) = toml.studio.completion_buffer {
        config.conductor.completion_buffer = buffer;
    }

    if let Some(theme) = toml.theme {
        config.conductor.default_theme = theme;
    }
}

/// Apply environment variables through `lookup`
fn apply_env_config(config: &mut StudioConfig, lookup: impl Fn(&str) -> Option<String>) {
    let key = lookup("GEMINI_API_KEY")
        .or_else(|| lookup("API_KEY"))
        .filter(|k| !k.trim().is_empty());
    if let Some(key) = key {
        config.backend.api_key = Some(key);
        config.source = ConfigSource::Env;
    }

    if let Some(base_url) = lookup("ATELIER_BASE_URL") {
        config.backend.base_url = base_url;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = lookup("ATELIER_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.backend.timeout_secs = timeout;
        config.source = ConfigSource::Env;
    }

    if let Some(model) = lookup("ATELIER_CONCEPT_MODEL") {
        config.gateway.concept_model = model;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = lookup("ATELIER_IMAGE_MODEL") {
        config.gateway.image_model = model;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = lookup("ATELIER_SEARCH_MODEL") {
        config.gateway.search_model = model;
        config.source = ConfigSource::Env;
    }
    if let Some(max_leads) = lookup("ATELIER_MAX_LEADS").and_then(|v| v.parse().ok()) {
        config.gateway.max_leads = max_leads;
        config.source = ConfigSource::Env;
    }
    if let Some(limit) = lookup("ATELIER_MAX_PAYLOAD_BYTES").and_then(|v| v.parse().ok()) {
        config.max_payload_bytes = limit;
        config.source = ConfigSource::Env;
    }
    if let Some(buffer) = lookup("ATELIER_COMPLETION_BUFFER").and_then(|v| v.parse().ok()) {
        config.conductor.completion_buffer = buffer;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Command-line overrides layered on top of loaded configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// API key override
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// Concept model override
    pub concept_model: Option<String>,
    /// Image model override
    pub image_model: Option<String>,
    /// Max leads override
    pub max_leads: Option<usize>,
}

impl ConfigOverrides {
    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut StudioConfig) {
        if self.api_key.is_some()
            || self.base_url.is_some()
            || self.concept_model.is_some()
            || self.image_model.is_some()
            || self.max_leads.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref key) = self.api_key {
            config.backend.api_key = Some(key.clone());
        }
        if let Some(ref url) = self.base_url {
            config.backend.base_url = url.clone();
        }
        if let Some(ref model) = self.concept_model {
            config.gateway.concept_model = model.clone();
        }
        if let Some(ref model) = self.image_model {
            config.gateway.image_model = model.clone();
        }
        if let Some(max_leads) = self.max_leads {
            config.gateway.max_leads = max_leads;
        }
    }
}
