//! PromptGuard configuration management

use crate::catalog::{Category, Severity};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default environment variable holding the base64 encryption key
pub const DEFAULT_KEY_ENV: &str = "PROMPTGUARD_ENCRYPTION_KEY";

/// Main PromptGuard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptGuardConfig {
    /// Envelope encryption configuration
    #[serde(default)]
    pub crypto: CryptoConfig,

    /// Detector catalog configuration
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Optimizer configuration
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl PromptGuardConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}

/// Envelope encryption configuration
///
/// The key is never given a default value. When `key` is absent it is read
/// from the environment variable named by `key_env`; when that is absent too,
/// constructing the cipher fails.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Inline base64 key (prefer `key_env` outside of tests)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Environment variable holding the base64 key
    pub key_env: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            key: None,
            key_env: DEFAULT_KEY_ENV.to_string(),
        }
    }
}

impl std::fmt::Debug for CryptoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoConfig")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("key_env", &self.key_env)
            .finish()
    }
}

/// Detector catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Built-in categories to leave out of the catalog
    pub disabled: Vec<Category>,

    /// Additional detectors, ranked after every built-in one
    pub custom: Vec<CustomDetectorConfig>,
}

/// A user-supplied detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomDetectorConfig {
    /// Detector name, also used for the placeholder (`[REDACTED_<NAME>]`)
    pub name: String,

    /// Regex pattern
    pub pattern: String,

    /// Severity of a match
    #[serde(default = "default_custom_severity")]
    pub severity: Severity,

    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

fn default_custom_severity() -> Severity {
    Severity::Medium
}

/// Optimizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Run the optimizer at all; when disabled the optimized prompt is the
    /// whitespace-normalized original
    pub enabled: bool,

    /// Minimum length (chars) before a structure instruction is appended
    pub structure_threshold: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            structure_threshold: 100,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum preview length for stored prompts
    pub preview_len: usize,

    /// Allowed CORS origins (empty allows any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
            preview_len: 80,
            cors_origins: Vec::new(),
        }
    }
}
