//! Sled-backed chunk store
//!
//! Each key of the database is a chunk name; each value is one encoded tag tree.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StorageError;
use crate::store::{Document, StorageBackend};
use crate::tag::BinaryCodec;

/// A sled database of named chunks
#[derive(Clone)]
pub struct SledChunkStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledChunkStore {
    /// Open (or create) the chunk store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            StorageError::Database(format!(
                "Failed to open chunk store {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Chunk names in key order
    pub fn chunk_names(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for key in self.db.iter().keys() {
            let key = key?;
            names.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(names)
    }

    pub fn contains(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.db.contains_key(name.as_bytes())?)
    }

    /// Backend for one chunk. The chunk does not have to exist yet.
    pub fn chunk(&self, name: &str) -> SledChunk {
        SledChunk {
            db: self.db.clone(),
            name: name.to_string(),
            store: self.path.display().to_string(),
        }
    }

    /// Write `document` as chunk `name`, replacing any previous contents.
    pub fn put(&self, name: &str, document: &Document) -> Result<(), StorageError> {
        self.chunk(name).save(document)
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

/// One chunk of a [`SledChunkStore`]
#[derive(Clone)]
pub struct SledChunk {
    db: sled::Db,
    name: String,
    store: String,
}

impl SledChunk {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl StorageBackend for SledChunk {
    fn open_root(&self) -> Result<Document, StorageError> {
        let value = self
            .db
            .get(self.name.as_bytes())?
            .ok_or_else(|| StorageError::ChunkNotFound(self.describe()))?;
        Document::decode(&BinaryCodec, &value, &self.describe())
    }

    fn save(&self, document: &Document) -> Result<(), StorageError> {
        let bytes = document.encode(&BinaryCodec)?;
        self.db.insert(self.name.as_bytes(), bytes)?;
        self.db.flush()?;
        debug!(chunk = %self.describe(), "Saved chunk");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.store, self.name)
    }
}
