//! Workspace config file source: config/config.toml, then an optional profile file
//! config/{TAGTREE_ENV}.toml.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the profile file layered over config/config.toml.
pub const PROFILE_ENV: &str = "TAGTREE_ENV";

/// Existing workspace config files for `profile`, lowest priority first.
pub fn workspace_config_files(workspace_root: &Path, profile: Option<&str>) -> Vec<PathBuf> {
    let config_dir = workspace_root.join("config");
    let profile_file = profile
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "config")
        .map(|name| config_dir.join(format!("{}.toml", name)));

    std::iter::once(config_dir.join("config.toml"))
        .chain(profile_file)
        .filter(|path| path.is_file())
        .collect()
}

/// Add the workspace config files to `builder`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let profile = std::env::var(PROFILE_ENV).ok();
    let files = workspace_config_files(workspace_root, profile.as_deref());
    Ok(files.into_iter().fold(builder, |builder, path| {
        debug!(path = %path.display(), "Adding workspace config file");
        builder.add_source(File::from(path).required(false))
    }))
}
