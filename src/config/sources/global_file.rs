//! Global config file source: $XDG_CONFIG_HOME/tagtree/config.toml or ~/.config/tagtree/config.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;
    Some(config_home.join("tagtree").join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let canonical_path = global_path
                .canonicalize()
                .unwrap_or_else(|_| global_path.clone());
            builder = builder.add_source(File::from(canonical_path).required(false));
        } else {
            debug!(
                config_path = %global_path.display(),
                "No global configuration file; using defaults"
            );
        }
    }
    Ok(builder)
}
