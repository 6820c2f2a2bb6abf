// crates/upgrade-suite-config/src/config.rs
// ============================================================================
// Module: Upgrade Suite Configuration
// Description: Configuration loading and validation for upgrade suite selection.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: upgrade-suite-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly named file must exist; when no path is given and the default
//! `upgrade-suite.toml` is absent, built-in defaults apply. Unknown keys and
//! out-of-range values are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use upgrade_suite_core::DEFAULT_TRANSPORT_ENV;
use upgrade_suite_core::MAX_TRANSPORT_BYTES;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "upgrade-suite.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "UPGRADE_SUITE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of the transport environment variable name.
pub(crate) const MAX_ENV_VAR_NAME_LENGTH: usize = 128;
/// Upper bound accepted for `transport.max_bytes`.
pub const MAX_TRANSPORT_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Default maximum registry listing size in bytes.
pub const DEFAULT_REGISTRY_MAX_BYTES: usize = 1024 * 1024;
/// Upper bound accepted for `registry.max_bytes`.
pub const MAX_REGISTRY_BYTES_LIMIT: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level upgrade suite configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeSuiteConfig {
    /// Transport source and limits.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Test registry listing settings.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Selection audit logging settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl UpgradeSuiteConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`] in the working directory. Only the default
    /// file may be missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transport.validate()?;
        self.registry.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// Transport source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Environment variable holding the transport string.
    #[serde(default = "default_transport_env_var")]
    pub env_var: String,
    /// Maximum accepted transport size in bytes.
    #[serde(default = "default_transport_max_bytes")]
    pub max_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            env_var: default_transport_env_var(),
            max_bytes: default_transport_max_bytes(),
        }
    }
}

impl TransportConfig {
    /// Validates transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_env_var_name("transport.env_var", &self.env_var)?;
        if self.max_bytes == 0 || self.max_bytes > MAX_TRANSPORT_BYTES_LIMIT {
            return Err(ConfigError::Invalid("transport.max_bytes out of range".to_string()));
        }
        Ok(())
    }
}

/// Test registry listing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Optional path to a JSON array of test names.
    #[serde(default)]
    pub path: Option<String>,
    /// Maximum accepted registry listing size in bytes.
    #[serde(default = "default_registry_max_bytes")]
    pub max_bytes: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_bytes: default_registry_max_bytes(),
        }
    }
}

impl RegistryConfig {
    /// Validates registry configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("registry.path", path)?;
        }
        if self.max_bytes == 0 || self.max_bytes > MAX_REGISTRY_BYTES_LIMIT {
            return Err(ConfigError::Invalid("registry.max_bytes out of range".to_string()));
        }
        Ok(())
    }
}

/// Selection audit logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// The flag is true when the path was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path-valued config field.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an environment variable name (`[A-Za-z_][A-Za-z0-9_]*`).
fn validate_env_var_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_ENV_VAR_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if value.starts_with(|ch: char| ch.is_ascii_digit()) {
        return Err(ConfigError::Invalid(format!("{field} must not start with a digit")));
    }
    if !value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(ConfigError::Invalid(format!(
            "{field} must contain only ASCII letters, digits, and underscores"
        )));
    }
    Ok(())
}

/// Default transport environment variable.
fn default_transport_env_var() -> String {
    DEFAULT_TRANSPORT_ENV.to_string()
}

/// Default maximum transport size.
const fn default_transport_max_bytes() -> usize {
    MAX_TRANSPORT_BYTES
}

/// Default maximum registry listing size.
const fn default_registry_max_bytes() -> usize {
    DEFAULT_REGISTRY_MAX_BYTES
}

/// Audit logging is on by default.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
