//! Configuration System
//!
//! Layered configuration for the editor and the batch runner: built-in defaults, the
//! global user file, the workspace file, then `TAGTREE__*` environment variables.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagTreeConfig {
    /// Editing and display behaviour
    #[serde(default)]
    pub editor: EditorSettings,

    /// How directories are scanned for documents and chunk stores
    #[serde(default)]
    pub storage: StorageSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Editing and display behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Glyph shown in place of each newline when a string is displayed
    #[serde(default = "default_newline_glyph")]
    pub newline_glyph: String,

    /// Name given to a tag pasted into a compound without a name of its own
    #[serde(default = "default_unnamed_paste_name")]
    pub unnamed_paste_name: String,

    /// Prefix printed nodes with their kind marker
    #[serde(default)]
    pub show_types: bool,
}

fn default_newline_glyph() -> String {
    "\u{b6}".to_string()
}

fn default_unnamed_paste_name() -> String {
    "UNNAMED".to_string()
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            newline_glyph: default_newline_glyph(),
            unnamed_paste_name: default_unnamed_paste_name(),
            show_types: false,
        }
    }
}

/// Directory scanning rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// File extensions (without the dot) opened as tag documents
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,

    /// Directory extension that marks a sled chunk store
    #[serde(default = "default_chunk_store_suffix")]
    pub chunk_store_suffix: String,
}

fn default_document_extensions() -> Vec<String> {
    ["dat", "nbt", "schematic", "dat_mcr", "dat_old", "bpt", "rc"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_chunk_store_suffix() -> String {
    "chunks".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            document_extensions: default_document_extensions(),
            chunk_store_suffix: default_chunk_store_suffix(),
        }
    }
}

impl StorageSettings {
    pub fn is_document_extension(&self, extension: &str) -> bool {
        self.document_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    pub fn is_chunk_store_extension(&self, extension: &str) -> bool {
        self.chunk_store_suffix.eq_ignore_ascii_case(extension)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Editor(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Editor(msg) => write!(f, "Editor: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl TagTreeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.editor.newline_glyph.is_empty() {
            errors.push(ValidationError::Editor(
                "newline_glyph cannot be empty".to_string(),
            ));
        }
        if self.editor.newline_glyph.contains('\n') {
            errors.push(ValidationError::Editor(
                "newline_glyph cannot itself contain a newline".to_string(),
            ));
        }
        if self.editor.unnamed_paste_name.is_empty() {
            errors.push(ValidationError::Editor(
                "unnamed_paste_name cannot be empty".to_string(),
            ));
        }

        if self.storage.document_extensions.is_empty() {
            errors.push(ValidationError::Storage(
                "document_extensions cannot be empty".to_string(),
            ));
        }
        for ext in &self.storage.document_extensions {
            if ext.is_empty() || ext.starts_with('.') {
                errors.push(ValidationError::Storage(format!(
                    "Invalid document extension '{}' (give it without the leading dot)",
                    ext
                )));
            }
        }
        if self.storage.chunk_store_suffix.is_empty() {
            errors.push(ValidationError::Storage(
                "chunk_store_suffix cannot be empty".to_string(),
            ));
        }
        if self
            .storage
            .is_document_extension(&self.storage.chunk_store_suffix)
        {
            errors.push(ValidationError::Storage(format!(
                "chunk_store_suffix '{}' is also a document extension",
                self.storage.chunk_store_suffix
            )));
        }

        if !["json", "text"].contains(&self.logging.format.as_str()) {
            errors.push(ValidationError::Logging(format!(
                "Invalid format '{}'",
                self.logging.format
            )));
        }
        if !["stdout", "stderr", "file"].contains(&self.logging.output.as_str()) {
            errors.push(ValidationError::Logging(format!(
                "Invalid output '{}'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
