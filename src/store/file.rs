//! Single-file document storage

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StorageError;
use crate::store::{Document, StorageBackend};
use crate::tag::BinaryCodec;

/// One uncompressed binary tag file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path a save writes before renaming: the full file name plus `.tmp`.
    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl StorageBackend for FileStore {
    fn open_root(&self) -> Result<Document, StorageError> {
        let bytes = fs::read(&self.path)?;
        let document = Document::decode(&BinaryCodec, &bytes, &self.describe())?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Read tag file");
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<(), StorageError> {
        let bytes = document.encode(&BinaryCodec)?;
        // Write beside the target and rename so a failed write leaves the old file.
        let staging = self.staging_path();
        fs::write(&staging, &bytes)?;
        fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Wrote tag file");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
