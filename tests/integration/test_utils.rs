//! Shared test utilities for integration tests
//!
//! Centralizes XDG isolation for config loading and the sample documents the
//! tests edit.

use std::path::Path;
use std::sync::Mutex;
use tagtree::store::{Document, FileStore, StorageBackend};
use tagtree::tag::{Tag, TagCompound, TagList};
use tempfile::TempDir;

/// Global mutex to serialize XDG environment variable access across all tests
/// This prevents race conditions when tests run in parallel
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        if let Some(orig) = self.home {
            std::env::set_var("HOME", orig);
        } else {
            std::env::remove_var("HOME");
        }

        if let Some(orig) = self.xdg_config_home {
            std::env::set_var("XDG_CONFIG_HOME", orig);
        } else {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }
}

/// Run `f` with XDG_CONFIG_HOME set to `test_dir` and HOME to `test_dir/home`.
/// The original environment is restored afterwards.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().to_str().unwrap());

    let result = f();

    env_state.restore();

    result
}

/// Player data used across the tests
pub fn level_root() -> TagCompound {
    let player = TagCompound::new()
        .with("Health", Tag::Short(20))
        .with("Name", Tag::String("Steve".to_string()))
        .with(
            "Scores",
            Tag::List(TagList::from_tags(vec![Tag::Int(1), Tag::Int(2), Tag::Int(3)]).unwrap()),
        )
        .with("Pos", Tag::List(TagList::from_tags(vec![Tag::Double(0.5), Tag::Double(64.0)]).unwrap()));
    TagCompound::new().with(
        "Data",
        Tag::Compound(
            TagCompound::new()
                .with("LevelName", Tag::String("World".to_string()))
                .with("Player", Tag::Compound(player)),
        ),
    )
}

pub fn write_document(path: &Path, root: TagCompound) {
    FileStore::new(path).save(&Document::new("", root)).unwrap();
}

/// Read back the tag at `names` below the root of the file at `path`.
pub fn read_tag(path: &Path, names: &[&str]) -> Option<Tag> {
    let document = FileStore::new(path).open_root().unwrap();
    let mut current = document.root.clone();
    for name in names {
        let next = current.borrow().as_compound()?.get(name)?.clone();
        current = next;
    }
    let tag = current.borrow().deep_copy();
    Some(tag)
}
