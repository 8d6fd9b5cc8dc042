//! Document storage
//!
//! Backends read and write whole named tag trees. The editing model never parses an
//! on-disk layout itself; it asks a [`StorageBackend`] for the root compound when a
//! document node is expanded and hands it back on save.

pub mod directory;
pub mod file;
pub mod memory;
pub mod persistence;

pub use directory::{scan_directory, DirectoryEntry};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use persistence::{SledChunk, SledChunkStore};

use crate::error::StorageError;
use crate::tag::{Tag, TagCodec, TagCompound, TagRef};

/// A named root compound as stored by a backend
#[derive(Debug)]
pub struct Document {
    pub name: String,
    pub root: TagRef,
}

impl Document {
    pub fn new(name: impl Into<String>, root: TagCompound) -> Self {
        Self {
            name: name.into(),
            root: Tag::Compound(root).into_ref(),
        }
    }

    /// Encode with `codec`, using the root name as the header name.
    pub fn encode(&self, codec: &dyn TagCodec) -> Result<Vec<u8>, StorageError> {
        Ok(codec.encode(&self.name, &self.root.borrow())?)
    }

    /// Decode a buffer whose root must be a compound; `source` names it in errors.
    pub fn decode(codec: &dyn TagCodec, bytes: &[u8], source: &str) -> Result<Self, StorageError> {
        let (name, root) = codec.decode(bytes)?;
        match root {
            Tag::Compound(compound) => Ok(Document::new(name, compound)),
            _ => Err(StorageError::RootNotCompound(source.to_string())),
        }
    }
}

/// Read/write service over one document
pub trait StorageBackend {
    /// Load the document root. May block on I/O.
    fn open_root(&self) -> Result<Document, StorageError>;

    /// Persist `document`, replacing what was stored.
    fn save(&self, document: &Document) -> Result<(), StorageError>;

    /// Human-readable location, used in logs and error messages.
    fn describe(&self) -> String;
}
