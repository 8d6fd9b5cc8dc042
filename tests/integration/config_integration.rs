//! Layered configuration loading: global file, workspace file and environment

use std::fs;
use tagtree::config::ConfigLoader;
use tempfile::TempDir;

use crate::integration::with_xdg_env;

#[test]
fn test_defaults_without_files() {
    let xdg = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let config = with_xdg_env(&xdg, || ConfigLoader::load(workspace.path()).unwrap());
    assert_eq!(config.editor.unnamed_paste_name, "UNNAMED");
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.output, "stderr");
}

#[test]
fn test_global_file_is_read() {
    let xdg = TempDir::new().unwrap();
    fs::create_dir_all(xdg.path().join("tagtree")).unwrap();
    fs::write(
        xdg.path().join("tagtree/config.toml"),
        "[editor]\nunnamed_paste_name = \"Pasted\"\n",
    )
    .unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_xdg_env(&xdg, || ConfigLoader::load(workspace.path()).unwrap());
    assert_eq!(config.editor.unnamed_paste_name, "Pasted");
    assert_eq!(
        with_xdg_env(&xdg, ConfigLoader::xdg_config_path),
        Some(xdg.path().join("tagtree").join("config.toml"))
    );
}

#[test]
fn test_workspace_file_overrides_global() {
    let xdg = TempDir::new().unwrap();
    fs::create_dir_all(xdg.path().join("tagtree")).unwrap();
    fs::write(
        xdg.path().join("tagtree/config.toml"),
        "[editor]\nnewline_glyph = \"~\"\nshow_types = true\n",
    )
    .unwrap();

    let workspace = TempDir::new().unwrap();
    fs::create_dir_all(workspace.path().join("config")).unwrap();
    fs::write(
        workspace.path().join("config/config.toml"),
        "[editor]\nnewline_glyph = \"|\"\n",
    )
    .unwrap();

    let config = with_xdg_env(&xdg, || ConfigLoader::load(workspace.path()).unwrap());
    assert_eq!(config.editor.newline_glyph, "|");
    assert!(config.editor.show_types);
}

#[test]
fn test_environment_overrides_files() {
    let xdg = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::create_dir_all(workspace.path().join("config")).unwrap();
    fs::write(
        workspace.path().join("config/config.toml"),
        "[storage]\nchunk_store_suffix = \"db\"\n",
    )
    .unwrap();

    let config = with_xdg_env(&xdg, || {
        std::env::set_var("TAGTREE__STORAGE__CHUNK_STORE_SUFFIX", "region");
        let config = ConfigLoader::load(workspace.path());
        std::env::remove_var("TAGTREE__STORAGE__CHUNK_STORE_SUFFIX");
        config.unwrap()
    });
    assert_eq!(config.storage.chunk_store_suffix, "region");
}
