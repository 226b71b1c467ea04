//! Binding configuration loading.

use std::path::Path;

use anyhow::{Context, Result};
use sos_common::BindingConfig;

/// Config file read when no path is given and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "config/sos-rest.yaml";

/// Load the binding configuration from YAML, then apply `SOS_*` environment overrides.
///
/// With no explicit path, [`DEFAULT_CONFIG_PATH`] is read if present and the
/// built-in defaults are used otherwise. An explicit path must exist.
pub fn load_binding_config(path: Option<&str>) -> Result<BindingConfig> {
    load_binding_config_with(path, |key| std::env::var(key).ok())
}

/// Like [`load_binding_config`], with overrides taken from `lookup`.
pub fn load_binding_config_with<F>(path: Option<&str>, lookup: F) -> Result<BindingConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match path {
        Some(path) => read_config_file(Path::new(path))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            read_config_file(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => {
            tracing::warn!(
                "Config file {} does not exist, using defaults",
                DEFAULT_CONFIG_PATH
            );
            BindingConfig::default()
        }
    };

    let config = config.with_overrides(lookup);
    tracing::info!(
        service = %config.service,
        version = %config.version,
        service_url = %config.service_url,
        "Loaded binding configuration"
    );
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<BindingConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {:?}", path))?;

    // An empty document means "all defaults".
    if content.trim().is_empty() {
        return Ok(BindingConfig::default());
    }

    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse: {:?}", path))
}
