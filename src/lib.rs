//! Tagtree: Editable Tag-Tree Model
//!
//! Browse, edit and persist nested tagged-union documents. Documents are loaded
//! through pluggable storage backends into an arena of editable nodes with
//! per-node capabilities, container policies, a clipboard and a batch operation
//! catalog.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;
pub mod node;
pub mod ops;
pub mod snapshot;
pub mod store;
pub mod tag;
