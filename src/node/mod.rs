//! Editable node tree
//!
//! Every node wraps exactly one thing: a tag, a storage-backed document, a chunk store,
//! a filesystem directory, or the tree's virtual root. Nodes live in an arena owned by
//! [`TagTree`] and refer to each other by [`NodeId`]; a node's parent link is only used
//! for ancestry, naming and policy lookups.
//!
//! What a node may do is decided per node kind by [`NodeData::capabilities`], using the
//! [`Container`] adapter of its parent for the rules that depend on where it lives
//! (renaming needs a named parent, reordering an ordered one).

pub mod container;
pub mod scalar;
pub mod search;
pub mod tree;

pub use container::{CompoundContainer, Container, ListContainer, TagContainer};
pub use scalar::ScalarKind;
pub use search::{NameValueQuery, NumericOp, SearchRule, TextOp};
pub use tree::{TagTree, TreeSettings};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::snapshot::SnapshotList;
use crate::store::{Document, FileStore, SledChunk, SledChunkStore, StorageBackend};
use crate::tag::{TagKind, TagRef};

/// Arena handle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node currently permits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub edit: bool,
    pub delete: bool,
    pub rename: bool,
    pub copy: bool,
    pub cut: bool,
    pub paste_into: bool,
    pub create_tag: bool,
    pub reorder: bool,
    pub refresh: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        edit: false,
        delete: false,
        rename: false,
        copy: false,
        cut: false,
        paste_into: false,
        create_tag: false,
        reorder: false,
        refresh: false,
    };

    /// Rules shared by every tag-backed node, given its parent's adapter.
    fn for_tag(parent: Option<&Container>) -> Capabilities {
        let in_container = parent.is_some();
        Capabilities {
            copy: true,
            cut: in_container,
            delete: in_container,
            rename: parent.is_some_and(Container::is_named),
            reorder: parent.is_some_and(Container::is_ordered),
            ..Capabilities::NONE
        }
    }
}

/// Where a document node's data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    File,
    Chunk,
}

struct LoadedDocument {
    name: String,
    root: CompoundContainer,
}

/// A document behind a storage backend, loaded on first expansion
pub struct DocumentData {
    label: String,
    source: DocumentSource,
    backend: Box<dyn StorageBackend>,
    loaded: Option<LoadedDocument>,
}

impl DocumentData {
    pub fn new(label: impl Into<String>, source: DocumentSource, backend: Box<dyn StorageBackend>) -> Self {
        Self {
            label: label.into(),
            source,
            backend,
            loaded: None,
        }
    }

    pub fn file(path: &Path) -> Self {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(label, DocumentSource::File, Box::new(FileStore::new(path)))
    }

    pub fn chunk(chunk: SledChunk) -> Self {
        let label = chunk.name().to_string();
        Self::new(label, DocumentSource::Chunk, Box::new(chunk))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> DocumentSource {
        self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Name stored in the document header, once loaded
    pub fn root_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|loaded| loaded.name.as_str())
    }

    pub fn root(&self) -> Option<&CompoundContainer> {
        self.loaded.as_ref().map(|loaded| &loaded.root)
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    fn load(&mut self) -> Result<(), StorageError> {
        if self.loaded.is_none() {
            let document = self.backend.open_root()?;
            self.loaded = Some(LoadedDocument {
                name: document.name,
                root: CompoundContainer::new(document.root),
            });
        }
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = None;
    }

    fn set_root_name(&mut self, name: &str) -> bool {
        match self.loaded.as_mut() {
            Some(loaded) => {
                loaded.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Write the loaded document back. Returns false if nothing was loaded.
    fn save(&self) -> Result<bool, StorageError> {
        let Some(loaded) = &self.loaded else {
            return Ok(false);
        };
        self.backend.save(&Document {
            name: loaded.name.clone(),
            root: loaded.root.tag().clone(),
        })?;
        Ok(true)
    }
}

/// A sled chunk store directory; the database is opened on first expansion.
pub struct ChunkStoreData {
    path: PathBuf,
    store: Option<SledChunkStore>,
}

impl ChunkStoreData {
    pub fn new(path: PathBuf) -> Self {
        Self { path, store: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // The handle is kept across refreshes: sled holds a lock on the directory.
    fn open(&mut self) -> Result<SledChunkStore, StorageError> {
        if let Some(store) = &self.store {
            return Ok(store.clone());
        }
        let store = SledChunkStore::open(&self.path)?;
        self.store = Some(store.clone());
        Ok(store)
    }
}

/// Payload of one node
pub enum NodeData {
    Root,
    Directory(PathBuf),
    ChunkStore(ChunkStoreData),
    Document(DocumentData),
    Scalar(ScalarKind, TagRef),
    Array(TagRef),
    List(ListContainer),
    Compound(CompoundContainer),
}

impl NodeData {
    /// Node payload for a tag. Every tag kind maps to exactly one node kind.
    pub fn from_tag(tag: TagRef) -> NodeData {
        let kind = tag.borrow().kind();
        match kind {
            TagKind::Byte => NodeData::Scalar(ScalarKind::Byte, tag),
            TagKind::Short => NodeData::Scalar(ScalarKind::Short, tag),
            TagKind::Int => NodeData::Scalar(ScalarKind::Int, tag),
            TagKind::Long => NodeData::Scalar(ScalarKind::Long, tag),
            TagKind::Float => NodeData::Scalar(ScalarKind::Float, tag),
            TagKind::Double => NodeData::Scalar(ScalarKind::Double, tag),
            TagKind::String => NodeData::Scalar(ScalarKind::String, tag),
            TagKind::ByteArray | TagKind::ShortArray | TagKind::IntArray | TagKind::LongArray => {
                NodeData::Array(tag)
            }
            TagKind::List => NodeData::List(ListContainer::new(tag)),
            TagKind::Compound => NodeData::Compound(CompoundContainer::new(tag)),
        }
    }

    /// Kind marker used by the printers
    pub fn marker(&self) -> &'static str {
        match self {
            NodeData::Root => "",
            NodeData::Directory(_) => "/",
            NodeData::ChunkStore(_) => "R",
            NodeData::Document(doc) => match doc.source {
                DocumentSource::File => "N",
                DocumentSource::Chunk => "r",
            },
            NodeData::Scalar(kind, _) => kind.kind().marker(),
            NodeData::Array(tag) => tag.borrow().kind().marker(),
            NodeData::List(_) => TagKind::List.marker(),
            NodeData::Compound(_) => TagKind::Compound.marker(),
        }
    }

    /// Backing tag; for a loaded document, its root compound.
    pub fn tag(&self) -> Option<TagRef> {
        match self {
            NodeData::Scalar(_, tag) | NodeData::Array(tag) => Some(tag.clone()),
            NodeData::List(list) => Some(list.tag().clone()),
            NodeData::Compound(compound) => Some(compound.tag().clone()),
            NodeData::Document(doc) => doc.root().map(|root| root.tag().clone()),
            NodeData::Root | NodeData::Directory(_) | NodeData::ChunkStore(_) => None,
        }
    }

    /// Adapter this node offers its tag children
    pub fn container(&self) -> Option<Container> {
        match self {
            NodeData::List(list) => Some(Container::Ordered(list.clone())),
            NodeData::Compound(compound) => Some(Container::Named(compound.clone())),
            NodeData::Document(doc) => doc.root().map(|root| Container::Named(root.clone())),
            _ => None,
        }
    }

    pub fn is_container_type(&self) -> bool {
        !matches!(self, NodeData::Scalar(..) | NodeData::Array(_))
    }

    pub fn capabilities(&self, parent: Option<&Container>) -> Capabilities {
        match self {
            NodeData::Root => Capabilities::NONE,
            NodeData::Directory(_) | NodeData::ChunkStore(_) => Capabilities {
                refresh: true,
                ..Capabilities::NONE
            },
            NodeData::Document(_) => Capabilities {
                create_tag: true,
                paste_into: true,
                refresh: true,
                rename: true,
                ..Capabilities::NONE
            },
            NodeData::Scalar(..) => Capabilities {
                edit: true,
                ..Capabilities::for_tag(parent)
            },
            NodeData::Array(_) => Capabilities::for_tag(parent),
            NodeData::List(_) | NodeData::Compound(_) => Capabilities {
                create_tag: true,
                paste_into: true,
                ..Capabilities::for_tag(parent)
            },
        }
    }
}

/// One arena slot
pub struct Node {
    parent: Option<NodeId>,
    children: SnapshotList<NodeId>,
    expanded: bool,
    data_modified: bool,
    data: NodeData,
}

impl Node {
    fn new(parent: Option<NodeId>, data: NodeData) -> Self {
        Self {
            parent,
            children: SnapshotList::new(),
            expanded: false,
            data_modified: false,
            data,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Own data changed since the last save (descendants not included)
    pub fn is_data_modified(&self) -> bool {
        self.data_modified
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}
