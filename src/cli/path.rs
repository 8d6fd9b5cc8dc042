//! Target path splitting: filesystem part first, tag path after.

use std::path::{Path, PathBuf};

use crate::config::StorageSettings;
use crate::error::ApiError;
use crate::store::directory::{classify, DirectoryEntry};

/// A CLI target split at the first document or chunk store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    pub fs_path: PathBuf,
    pub tag_path: String,
}

/// Split `raw` into the filesystem node to open and the tag path below it.
///
/// Segments are consumed while they name plain directories. The first segment that
/// names a document file or a chunk store ends the filesystem part; whatever follows
/// is the tag path. Relative targets resolve against `workspace`.
pub fn split_target(
    workspace: &Path,
    raw: &str,
    settings: &StorageSettings,
) -> Result<TargetPath, ApiError> {
    let (mut current, rest) = if raw.starts_with('/') {
        (PathBuf::from("/"), raw.trim_start_matches('/'))
    } else {
        (workspace.to_path_buf(), raw)
    };

    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    for (index, segment) in segments.iter().enumerate() {
        current.push(segment);
        match classify(&current, settings) {
            Some(DirectoryEntry::Directory(_)) => continue,
            Some(DirectoryEntry::Document(path)) | Some(DirectoryEntry::ChunkStore(path)) => {
                return Ok(TargetPath {
                    fs_path: path,
                    tag_path: segments[index + 1..].join("/"),
                });
            }
            None => {
                return Err(ApiError::InvalidPath(format!(
                    "{} is not a directory, document or chunk store",
                    current.display()
                )));
            }
        }
    }

    if current.is_dir() {
        Ok(TargetPath {
            fs_path: current,
            tag_path: String::new(),
        })
    } else {
        Err(ApiError::InvalidPath(format!(
            "{} is not a directory",
            current.display()
        )))
    }
}
