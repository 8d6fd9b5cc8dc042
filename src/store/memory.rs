//! In-memory document storage

use std::cell::{Cell, RefCell};

use crate::error::StorageError;
use crate::store::{Document, StorageBackend};
use crate::tag::{BinaryCodec, TagCompound};

/// Holds one encoded document in memory and counts saves.
#[derive(Debug)]
pub struct MemoryStore {
    label: String,
    bytes: RefCell<Vec<u8>>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new(name: &str, root: TagCompound) -> Result<Self, StorageError> {
        let bytes = Document::new(name, root).encode(&BinaryCodec)?;
        Ok(Self::from_bytes(name, bytes))
    }

    /// Wrap an already encoded buffer; it is only decoded on open.
    pub fn from_bytes(label: &str, bytes: Vec<u8>) -> Self {
        Self {
            label: label.to_string(),
            bytes: RefCell::new(bytes),
            saves: Cell::new(0),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl StorageBackend for MemoryStore {
    fn open_root(&self) -> Result<Document, StorageError> {
        Document::decode(&BinaryCodec, &self.bytes.borrow(), &self.describe())
    }

    fn save(&self, document: &Document) -> Result<(), StorageError> {
        *self.bytes.borrow_mut() = document.encode(&BinaryCodec)?;
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }
}
