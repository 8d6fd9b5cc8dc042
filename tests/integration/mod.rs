//! Integration tests for the tagtree editing model and CLI

mod batch_cli;
mod clipboard_paste;
mod config_integration;
mod storage_backends;
mod test_utils;
mod tree_editing;

pub use test_utils::{level_root, read_tag, with_xdg_env, write_document};
