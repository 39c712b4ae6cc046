//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{HostPlatform, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the backend origin.
pub const BACKEND_ORIGIN_ENV: &str = "BACKEND_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file without environment overrides or validation.
pub fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load configuration for this process.
///
/// Starts from the file at `path` (or defaults), applies environment
/// overrides, then validates.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let config = match path {
        Some(path) => read_config_file(path)?,
        None => ProxyConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Pick the backend origin from an environment value, or the built-in fallback.
pub fn resolve_backend_origin(value: Option<String>) -> String {
    value
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| crate::config::schema::DEFAULT_BACKEND_ORIGIN.to_string())
}

/// Detect the host platform from its environment markers.
pub fn detect_platform<F>(lookup: F) -> HostPlatform
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(platform) = lookup("PROXY_PLATFORM").and_then(|v| HostPlatform::from_name(&v)) {
        return platform;
    }
    if lookup("NETLIFY").is_some() {
        return HostPlatform::Envelope;
    }
    HostPlatform::Http
}

/// Overlay environment values onto a loaded config.
///
/// `lookup` abstracts `std::env::var` so the overlay can be exercised in tests.
pub fn apply_env_overrides<F>(mut config: ProxyConfig, lookup: F) -> ProxyConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(origin) = lookup(BACKEND_ORIGIN_ENV).filter(|v| !v.trim().is_empty()) {
        config.upstream.origin = Some(resolve_backend_origin(Some(origin)));
    } else if config.upstream.origin.is_none() {
        config.upstream.origin = Some(resolve_backend_origin(None));
    }

    if let Some(bind) = lookup("BIND_ADDRESS") {
        config.listener.bind_address = bind;
    } else if let Some(port) = lookup("PORT") {
        config.listener.bind_address = format!("0.0.0.0:{}", port.trim());
    }

    if lookup("PROXY_PLATFORM").is_some() || config.platform.kind.is_none() {
        config.platform.kind = Some(detect_platform(&lookup));
    }

    if let Some(prefix) = lookup("PROXY_MOUNT_PREFIX") {
        config.platform.mount_prefix = Some(prefix);
    }

    config
}
