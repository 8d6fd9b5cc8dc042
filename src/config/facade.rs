//! Entry point for loading layered configuration.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::TagTreeConfig;
use config::{ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`.
    ///
    /// Sources, lowest priority first: defaults, the global user file, the workspace
    /// files, then `TAGTREE__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<TagTreeConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(
            Environment::with_prefix("TAGTREE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("storage.document_extensions"),
        );

        let config: TagTreeConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load a single file on top of the defaults, ignoring other sources.
    pub fn load_from_file(path: &Path) -> Result<TagTreeConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()
    }

    /// Location of the global user configuration file, if one can be determined.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    /// Built-in defaults only
    pub fn default() -> TagTreeConfig {
        TagTreeConfig::default()
    }
}
