//! Directory scanning
//!
//! One level of a filesystem directory, classified into what a directory node shows:
//! subdirectories, tag documents (by extension) and sled chunk stores (directories
//! carrying the chunk store extension). Anything else is skipped.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::StorageSettings;
use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEntry {
    Directory(PathBuf),
    ChunkStore(PathBuf),
    Document(PathBuf),
}

impl DirectoryEntry {
    pub fn path(&self) -> &Path {
        match self {
            DirectoryEntry::Directory(path)
            | DirectoryEntry::ChunkStore(path)
            | DirectoryEntry::Document(path) => path,
        }
    }

    /// Final path component
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Classify a single path, or `None` if it is neither a directory nor a document.
pub fn classify(path: &Path, settings: &StorageSettings) -> Option<DirectoryEntry> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());
    if path.is_dir() {
        return match extension {
            Some(ext) if settings.is_chunk_store_extension(&ext) => {
                Some(DirectoryEntry::ChunkStore(path.to_path_buf()))
            }
            _ => Some(DirectoryEntry::Directory(path.to_path_buf())),
        };
    }
    match extension {
        Some(ext) if path.is_file() && settings.is_document_extension(&ext) => {
            Some(DirectoryEntry::Document(path.to_path_buf()))
        }
        _ => None,
    }
}

/// Directories first, then chunk stores and documents, each group sorted by name.
pub fn scan_directory(
    path: &Path,
    settings: &StorageSettings,
) -> Result<Vec<DirectoryEntry>, StorageError> {
    let mut directories = Vec::new();
    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to read directory {}: {}", path.display(), e),
            ))
        })?;
        match classify(entry.path(), settings) {
            Some(found @ DirectoryEntry::Directory(_)) => directories.push(found),
            Some(found) => files.push(found),
            None => {}
        }
    }

    directories.extend(files);
    Ok(directories)
}
