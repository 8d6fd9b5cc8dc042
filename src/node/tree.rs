//! The node arena and every tree operation.
//!
//! Mutations go through `TagTree` so that a tag change and the matching child-node
//! change happen together: a failed operation returns an error before touching either.
//! Child lists are [`SnapshotList`]s, so a caller walking [`TagTree::children`] may
//! delete or insert siblings mid-walk and still see the list as it was.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

use crate::clipboard::{Clipboard, ClipboardEntry};
use crate::config::{EditorSettings, StorageSettings, TagTreeConfig};
use crate::editor::TextEditor;
use crate::error::EditError;
use crate::node::{
    Capabilities, ChunkStoreData, Container, DocumentData, DocumentSource, Node, NodeData, NodeId,
    TagContainer,
};
use crate::snapshot::Snapshot;
use crate::store::directory::{classify, scan_directory, DirectoryEntry};
use crate::store::StorageBackend;
use crate::tag::{Tag, TagKind, TagList, TagRef};

/// Settings the tree consults while editing and scanning
#[derive(Debug, Clone, Default)]
pub struct TreeSettings {
    pub editor: EditorSettings,
    pub storage: StorageSettings,
}

impl From<&TagTreeConfig> for TreeSettings {
    fn from(config: &TagTreeConfig) -> Self {
        Self {
            editor: config.editor.clone(),
            storage: config.storage.clone(),
        }
    }
}

/// Expanded-state of a subtree, keyed by path name
#[derive(Debug, Default)]
struct ExpandSet {
    children: HashMap<String, ExpandSet>,
}

pub struct TagTree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    clipboard: Rc<Clipboard>,
    settings: TreeSettings,
}

impl TagTree {
    pub fn new(clipboard: Rc<Clipboard>) -> Self {
        Self::with_settings(clipboard, TreeSettings::default())
    }

    pub fn with_settings(clipboard: Rc<Clipboard>, settings: TreeSettings) -> Self {
        let root = NodeId(0);
        let mut root_node = Node::new(None, NodeData::Root);
        root_node.expanded = true;

        let mut nodes = HashMap::new();
        nodes.insert(root, root_node);
        Self {
            nodes,
            root,
            next_id: 1,
            clipboard,
            settings,
        }
    }

    /// The virtual root; top-level documents and directories hang off it.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn clipboard(&self) -> &Rc<Clipboard> {
        &self.clipboard
    }

    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Number of live nodes, the root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn get(&self, id: NodeId) -> Result<&Node, EditError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| EditError::NotFound(format!("node {} does not exist", id)))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, EditError> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| EditError::NotFound(format!("node {} does not exist", id)))
    }

    fn allocate(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(Some(parent), data));
        id
    }

    fn push_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.allocate(parent, data);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        id
    }

    // ---- opening ----

    /// Add a top-level document served by `backend`.
    pub fn open_document(&mut self, label: &str, backend: Box<dyn StorageBackend>) -> NodeId {
        let data = DocumentData::new(label, DocumentSource::File, backend);
        self.push_child(self.root, NodeData::Document(data))
    }

    pub fn open_chunk_store(&mut self, path: &Path) -> NodeId {
        let data = ChunkStoreData::new(path.to_path_buf());
        self.push_child(self.root, NodeData::ChunkStore(data))
    }

    pub fn open_directory(&mut self, path: &Path) -> NodeId {
        self.push_child(self.root, NodeData::Directory(path.to_path_buf()))
    }

    /// Open a filesystem path as a document, chunk store or directory.
    pub fn open_path(&mut self, path: &Path) -> Result<NodeId, EditError> {
        let entry = classify(path, &self.settings.storage).ok_or_else(|| {
            EditError::NotFound(format!(
                "{} is not a directory or a recognised document",
                path.display()
            ))
        })?;
        let data = entry_data(entry);
        Ok(self.push_child(self.root, data))
    }

    // ---- queries ----

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Stable view of the materialized children. Mutating the tree while holding it
    /// leaves the view unchanged.
    pub fn children(&self, id: NodeId) -> Result<Snapshot<NodeId>, EditError> {
        Ok(self.get(id)?.children.snapshot())
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes.get(&id).map_or(0, |node| node.children.len())
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.expanded)
    }

    /// Own data or any materialized descendant changed since the last save.
    pub fn is_modified(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        node.data_modified || node.children.iter().any(|child| self.is_modified(*child))
    }

    /// Whether the node has, or may have, children, without expanding it.
    pub fn has_children(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if node.expanded || matches!(node.data, NodeData::Root) {
            return !node.children.is_empty();
        }
        match &node.data {
            NodeData::Scalar(..) | NodeData::Array(_) => false,
            NodeData::List(list) => list.tag_count() > 0,
            NodeData::Compound(compound) => compound.tag_count() > 0,
            NodeData::Root
            | NodeData::Directory(_)
            | NodeData::ChunkStore(_)
            | NodeData::Document(_) => true,
        }
    }

    fn parent_container(&self, id: NodeId) -> Option<Container> {
        let parent = self.nodes.get(&id)?.parent?;
        self.nodes.get(&parent)?.data.container()
    }

    pub fn capabilities(&self, id: NodeId) -> Capabilities {
        match self.nodes.get(&id) {
            Some(node) => node.data.capabilities(self.parent_container(id).as_ref()),
            None => Capabilities::NONE,
        }
    }

    /// Whether a tag of `kind` could be created under this node now.
    pub fn can_create_tag(&self, id: NodeId, kind: TagKind) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if !self.capabilities(id).create_tag {
            return false;
        }
        match node.data.container() {
            Some(container) => container.can_create_tag(kind),
            // An unloaded document still has a compound root.
            None => matches!(node.data, NodeData::Document(_)),
        }
    }

    /// Whether the clipboard holds something this node would accept.
    pub fn can_paste_into(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if !self.capabilities(id).paste_into || !self.clipboard.contains_data() {
            return false;
        }
        match node.data.container() {
            Some(Container::Ordered(list)) => self
                .clipboard
                .peek_kind()
                .is_some_and(|kind| list.can_create_tag(kind)),
            Some(Container::Named(_)) => true,
            None => matches!(node.data, NodeData::Document(_)),
        }
    }

    /// Whether [`TagTree::move_node`] with `offset` would succeed.
    pub fn can_move(&self, id: NodeId, offset: isize) -> bool {
        self.move_target(id, offset).is_ok()
    }

    pub fn tag(&self, id: NodeId) -> Option<TagRef> {
        self.nodes.get(&id).and_then(|node| node.data.tag())
    }

    pub fn tag_kind(&self, id: NodeId) -> Option<TagKind> {
        self.tag(id).map(|tag| tag.borrow().kind())
    }

    pub fn kind_marker(&self, id: NodeId) -> &'static str {
        self.nodes.get(&id).map_or("", |node| node.data.marker())
    }

    /// Name of the node: the compound key for a tag, the file or chunk name otherwise.
    /// List elements and the root have none.
    pub fn name(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(&id)?;
        match &node.data {
            NodeData::Root => None,
            NodeData::Directory(path) => Some(file_name(path)),
            NodeData::ChunkStore(data) => Some(file_name(data.path())),
            NodeData::Document(doc) => Some(doc.label().to_string()),
            data => {
                let tag = data.tag()?;
                self.parent_container(id)?.as_named()?.tag_name(&tag)
            }
        }
    }

    /// Path segment: the index for list elements, `*` for unnamed nodes.
    pub fn path_name(&self, id: NodeId) -> String {
        if let (Some(Container::Ordered(list)), Some(tag)) = (self.parent_container(id), self.tag(id)) {
            if let Some(index) = list.tag_index(&tag) {
                return index.to_string();
            }
        }
        match self.name(id) {
            Some(name) if !name.is_empty() => name,
            _ => "*".to_string(),
        }
    }

    /// `/`-joined path names from the top-level node down to `id`.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                break;
            }
            segments.push(self.path_name(node_id));
            current = self.parent(node_id);
        }
        segments.reverse();
        segments.join("/")
    }

    /// One-line rendering: `name: value` for tags, a summary for documents.
    pub fn display(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(&id) else {
            return String::new();
        };
        match &node.data {
            NodeData::Root => String::new(),
            NodeData::Directory(_) | NodeData::ChunkStore(_) => self.name(id).unwrap_or_default(),
            NodeData::Document(doc) => match doc.root() {
                Some(root) => {
                    let summary = root.tag().borrow().to_string();
                    match doc.root_name() {
                        Some(name) if !name.is_empty() => {
                            format!("{} [{}: {}]", doc.label(), name, summary)
                        }
                        _ => format!("{} [{}]", doc.label(), summary),
                    }
                }
                None => doc.label().to_string(),
            },
            _ => {
                let value = self.summary(id);
                match self.name(id) {
                    Some(name) if !name.is_empty() => format!("{}: {}", name, value),
                    _ => value,
                }
            }
        }
    }

    /// Value part of [`TagTree::display`]; empty for nodes without a tag.
    pub fn summary(&self, id: NodeId) -> String {
        match self.tag(id) {
            Some(tag) => self.value_text(&tag.borrow()),
            None => String::new(),
        }
    }

    fn value_text(&self, tag: &Tag) -> String {
        match tag {
            Tag::String(value) => {
                let glyph = self.settings.editor.newline_glyph.as_str();
                value.replace("\r\n", glyph).replace('\n', glyph)
            }
            other => other.to_string(),
        }
    }

    // ---- expansion ----

    /// Materialize child nodes. Later calls are no-ops returning the same count.
    #[instrument(level = "debug", skip(self), fields(node = %id))]
    pub fn expand(&mut self, id: NodeId) -> Result<usize, EditError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| EditError::NotFound(format!("node {} does not exist", id)))?;
        if node.expanded {
            return Ok(node.children.len());
        }

        let children: Vec<NodeData> = match &mut node.data {
            NodeData::Root | NodeData::Scalar(..) | NodeData::Array(_) => Vec::new(),
            NodeData::Directory(path) => scan_directory(path, &self.settings.storage)?
                .into_iter()
                .map(entry_data)
                .collect(),
            NodeData::ChunkStore(data) => {
                let store = data.open()?;
                store
                    .chunk_names()?
                    .iter()
                    .map(|name| NodeData::Document(DocumentData::chunk(store.chunk(name))))
                    .collect()
            }
            NodeData::Document(doc) => {
                doc.load()?;
                info!(document = %doc.describe(), "Loaded document");
                doc.root()
                    .map(|root| root.tags().into_iter().map(NodeData::from_tag).collect())
                    .unwrap_or_default()
            }
            NodeData::List(list) => list.tags().into_iter().map(NodeData::from_tag).collect(),
            NodeData::Compound(compound) => {
                compound.tags().into_iter().map(NodeData::from_tag).collect()
            }
        };

        for data in children {
            self.push_child(id, data);
        }
        let node = self.get_mut(id)?;
        node.expanded = true;
        let count = node.children.len();
        debug!(children = count, "Expanded node");
        Ok(count)
    }

    /// Drop the children of an unmodified node. Returns false if nothing was released.
    pub fn collapse(&mut self, id: NodeId) -> Result<bool, EditError> {
        if !self.get(id)?.expanded || self.is_modified(id) || id == self.root {
            return Ok(false);
        }
        self.release(id);
        Ok(true)
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children.iter() {
                self.remove_subtree(*child);
            }
        }
    }

    /// Remove every materialized child and mark the node unexpanded.
    fn clear_children(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => {
                let children = node.children.to_vec();
                node.children.clear();
                node.expanded = false;
                children
            }
            None => return,
        };
        for child in children {
            self.remove_subtree(child);
        }
    }

    /// Forget children and any loaded document data, discarding unsaved changes.
    fn release(&mut self, id: NodeId) {
        self.clear_children(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.data_modified = false;
            if let NodeData::Document(doc) = &mut node.data {
                doc.unload();
            }
        }
    }

    fn expand_set(&self, id: NodeId) -> Option<ExpandSet> {
        let node = self.nodes.get(&id)?;
        if !node.expanded {
            return None;
        }
        let mut set = ExpandSet::default();
        for child in node.children.iter() {
            if let Some(child_set) = self.expand_set(*child) {
                set.children.insert(self.path_name(*child), child_set);
            }
        }
        Some(set)
    }

    fn restore_expand_set(&mut self, id: NodeId, set: &ExpandSet) -> Result<(), EditError> {
        self.expand(id)?;
        let children = self.children(id)?;
        for child in children.iter() {
            if let Some(child_set) = set.children.get(&self.path_name(*child)) {
                self.restore_expand_set(*child, child_set)?;
            }
        }
        Ok(())
    }

    /// Reload from storage and re-expand what was expanded before.
    ///
    /// Refused while the node has unsaved changes. Returns whether the node was
    /// expanded, i.e. whether anything was reloaded.
    #[instrument(skip(self), fields(node = %id))]
    pub fn refresh(&mut self, id: NodeId) -> Result<bool, EditError> {
        if !self.capabilities(id).refresh {
            return Err(self.denied(id, "refreshed"));
        }
        if self.is_modified(id) {
            return Err(EditError::CapabilityDenied(format!(
                "{} has unsaved changes",
                self.describe(id)
            )));
        }

        let expand_set = self.expand_set(id);
        self.release(id);
        if let Some(set) = &expand_set {
            self.restore_expand_set(id, set)?;
        }
        info!(reloaded = expand_set.is_some(), "Refreshed node");
        Ok(expand_set.is_some())
    }

    // ---- persistence ----

    /// Write every modified document under `id` (or `id` itself) and clear the
    /// modified flags. A tag node saves the document that owns it. Returns the
    /// number of documents written.
    #[instrument(skip(self), fields(node = %id))]
    pub fn save(&mut self, id: NodeId) -> Result<usize, EditError> {
        let written = match &self.get(id)?.data {
            NodeData::Document(doc) => Some((doc.save()?, doc.describe())),
            NodeData::Root | NodeData::Directory(_) | NodeData::ChunkStore(_) => None,
            _ => {
                return match self.owning_document(id) {
                    Some(doc) => self.save(doc),
                    None => Ok(0),
                };
            }
        };
        if let Some((saved, location)) = written {
            self.clear_modified(id);
            if saved {
                info!(document = %location, "Saved document");
            }
            return Ok(usize::from(saved));
        }

        let children = self.children(id)?;
        let mut count = 0;
        for child in children.iter() {
            if self.is_modified(*child) {
                count += self.save(*child)?;
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.data_modified = false;
        }
        Ok(count)
    }

    /// Nearest document at or above `id`.
    pub fn owning_document(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(&node_id)?;
            if matches!(node.data, NodeData::Document(_)) {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    fn clear_modified(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.data_modified = false;
                node.children.to_vec()
            }
            None => return,
        };
        for child in children {
            self.clear_modified(child);
        }
    }

    fn mark_modified(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.data_modified = true;
        }
    }

    // ---- edits ----

    fn describe(&self, id: NodeId) -> String {
        let path = self.path(id);
        if path.is_empty() {
            format!("node {}", id)
        } else {
            format!("'{}'", path)
        }
    }

    fn denied(&self, id: NodeId, action: &str) -> EditError {
        EditError::CapabilityDenied(format!("{} cannot be {}", self.describe(id), action))
    }

    fn ensure_loaded(&mut self, id: NodeId) -> Result<(), EditError> {
        if matches!(self.get(id)?.data, NodeData::Document(_)) {
            self.expand(id)?;
        }
        Ok(())
    }

    fn container_of(&self, id: NodeId) -> Result<Container, EditError> {
        self.get(id)?
            .data
            .container()
            .ok_or_else(|| self.denied(id, "used as a container"))
    }

    /// Materialize a child for `tag` if the parent's children are already showing.
    fn materialize_child(&mut self, parent: NodeId, tag: TagRef) -> Option<NodeId> {
        if !self.is_expanded(parent) {
            return None;
        }
        Some(self.push_child(parent, NodeData::from_tag(tag)))
    }

    /// Edit a scalar through `editor`. Returns `Ok(false)` if the editor cancelled.
    pub fn edit_node(&mut self, id: NodeId, editor: &mut dyn TextEditor) -> Result<bool, EditError> {
        if !self.capabilities(id).edit {
            return Err(self.denied(id, "edited"));
        }
        let (kind, tag) = match &self.get(id)?.data {
            NodeData::Scalar(kind, tag) => (*kind, tag.clone()),
            _ => return Err(self.denied(id, "edited")),
        };

        let current = kind.edit_text(&tag.borrow());
        let Some(text) = editor.edit_text(&current) else {
            return Ok(false);
        };
        let value = kind.parse(&text)?;
        *tag.borrow_mut() = value;
        self.mark_modified(id);
        debug!(node = %id, kind = %kind.kind(), "Edited value");
        Ok(true)
    }

    /// Overwrite the node's tag with a value of the same kind. Children of a
    /// container are rebuilt from the new value.
    pub fn set_tag(&mut self, id: NodeId, value: Tag) -> Result<(), EditError> {
        self.ensure_loaded(id)?;
        let tag = self
            .tag(id)
            .ok_or_else(|| self.denied(id, "assigned a tag value"))?;
        let current = tag.borrow().kind();
        if current != value.kind() {
            return Err(EditError::TypeMismatch(format!(
                "cannot replace a {} with a {}",
                current,
                value.kind()
            )));
        }

        let was_expanded = self.is_expanded(id);
        let has_children = self.child_count(id) > 0;
        if has_children {
            self.clear_children(id);
        }
        *tag.borrow_mut() = value;
        if was_expanded {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.expanded = false;
            }
            self.expand(id)?;
        }
        self.mark_modified(id);
        Ok(())
    }

    /// Rename a compound entry, or a document's root name.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> Result<(), EditError> {
        if !self.capabilities(id).rename {
            return Err(self.denied(id, "renamed"));
        }

        if matches!(self.get(id)?.data, NodeData::Document(_)) {
            self.expand(id)?;
            if let NodeData::Document(doc) = &mut self.get_mut(id)?.data {
                doc.set_root_name(name);
            }
            self.mark_modified(id);
            return Ok(());
        }

        let tag = self.tag(id).ok_or_else(|| self.denied(id, "renamed"))?;
        let container = self
            .parent_container(id)
            .and_then(|container| container.as_named().cloned())
            .ok_or_else(|| self.denied(id, "renamed"))?;
        container.rename_tag(&tag, name)?;
        self.mark_modified(id);
        debug!(node = %id, name, "Renamed node");
        Ok(())
    }

    /// Remove the node's tag from its parent container and drop the node subtree.
    #[instrument(level = "debug", skip(self), fields(node = %id))]
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), EditError> {
        if id == self.root {
            return Err(EditError::CapabilityDenied(
                "the root node cannot be deleted".to_string(),
            ));
        }
        if !self.capabilities(id).delete {
            return Err(self.denied(id, "deleted"));
        }
        self.detach(id)
    }

    fn detach(&mut self, id: NodeId) -> Result<(), EditError> {
        let parent = self
            .parent(id)
            .ok_or_else(|| self.denied(id, "deleted"))?;
        let tag = self.tag(id).ok_or_else(|| self.denied(id, "deleted"))?;
        let container = self.container_of(parent)?;
        if !container.delete_tag(&tag) {
            return Err(EditError::NotFound(format!(
                "{} is no longer in its parent",
                self.describe(id)
            )));
        }

        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.remove(&id);
        }
        self.remove_subtree(id);
        self.mark_modified(parent);
        debug!(node = %id, parent = %parent, "Detached node");
        Ok(())
    }

    /// Create a default-valued tag of `kind`. Compounds and documents need a name;
    /// lists ignore it. Returns the new child node if the parent is expanded.
    pub fn create_node(
        &mut self,
        id: NodeId,
        kind: TagKind,
        name: Option<&str>,
    ) -> Result<Option<NodeId>, EditError> {
        if !self.capabilities(id).create_tag {
            return Err(self.denied(id, "given new tags"));
        }
        self.ensure_loaded(id)?;
        let container = self.container_of(id)?;
        let tag = kind.default_tag().into_ref();

        match &container {
            Container::Ordered(list) => {
                if !list.can_create_tag(kind) {
                    return Err(EditError::TypeMismatch(format!(
                        "list of {} cannot hold a {}",
                        list.element().map_or("nothing", TagKind::name),
                        kind
                    )));
                }
                list.append_tag(tag.clone())?;
            }
            Container::Named(compound) => {
                let name = name.filter(|name| !name.is_empty()).ok_or_else(|| {
                    EditError::ParseError("a name is required to create a tag here".to_string())
                })?;
                compound.add_tag(tag.clone(), name)?;
            }
        }

        self.mark_modified(id);
        debug!(node = %id, kind = %kind, "Created tag");
        Ok(self.materialize_child(id, tag))
    }

    /// Copy the node's name and a deep copy of its tag to the clipboard.
    pub fn copy_node(&self, id: NodeId) -> Result<(), EditError> {
        if !self.capabilities(id).copy {
            return Err(self.denied(id, "copied"));
        }
        let tag = self.tag(id).ok_or_else(|| self.denied(id, "copied"))?;
        let name = self.name(id).unwrap_or_default();
        let value = tag.borrow();
        self.clipboard.copy(&name, &value)
    }

    pub fn cut_node(&mut self, id: NodeId) -> Result<(), EditError> {
        if !self.capabilities(id).cut {
            return Err(self.denied(id, "cut"));
        }
        self.copy_node(id)?;
        self.detach(id)
    }

    /// Append a fresh copy of the clipboard tag. In a compound an empty name becomes
    /// the configured placeholder and a taken one gets a ` (Copy N)` suffix.
    pub fn paste_node(&mut self, id: NodeId) -> Result<Option<NodeId>, EditError> {
        if !self.capabilities(id).paste_into {
            return Err(self.denied(id, "pasted into"));
        }
        self.ensure_loaded(id)?;
        let container = self.container_of(id)?;
        let ClipboardEntry { name, tag } = self.clipboard.paste()?;
        let kind = tag.kind();
        let tag = tag.into_ref();

        match &container {
            Container::Ordered(list) => {
                if !list.can_create_tag(kind) {
                    return Err(EditError::TypeMismatch(format!(
                        "cannot paste a {} into a list of {}",
                        kind,
                        list.element().map_or("nothing", TagKind::name)
                    )));
                }
                list.append_tag(tag.clone())?;
            }
            Container::Named(compound) => {
                let base = if name.is_empty() {
                    self.settings.editor.unnamed_paste_name.clone()
                } else {
                    name
                };
                let unique = compound.make_unique_name(&base);
                compound.add_tag(tag.clone(), &unique)?;
            }
        }

        self.mark_modified(id);
        debug!(node = %id, kind = %kind, "Pasted tag");
        Ok(self.materialize_child(id, tag))
    }

    fn move_target(&self, id: NodeId, offset: isize) -> Result<(NodeId, usize, usize), EditError> {
        if !self.capabilities(id).reorder {
            return Err(self.denied(id, "reordered"));
        }
        let parent = self.parent(id).ok_or_else(|| self.denied(id, "reordered"))?;
        let tag = self.tag(id).ok_or_else(|| self.denied(id, "reordered"))?;
        let container = self.container_of(parent)?;
        let list = container
            .as_ordered()
            .ok_or_else(|| self.denied(id, "reordered"))?;
        let current = list
            .tag_index(&tag)
            .ok_or_else(|| EditError::NotFound(format!("{} is not in its list", self.describe(id))))?;

        let target = isize::try_from(current)
            .ok()
            .and_then(|index| index.checked_add(offset))
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < list.tag_count());
        match target {
            Some(target) => Ok((parent, current, target)),
            None => Err(EditError::CapabilityDenied(format!(
                "cannot move {} by {}",
                self.describe(id),
                offset
            ))),
        }
    }

    /// Move a list element by `offset` positions.
    pub fn move_node(&mut self, id: NodeId, offset: isize) -> Result<(), EditError> {
        let (parent, _, target) = self.move_target(id, offset)?;
        let tag = self.tag(id).ok_or_else(|| self.denied(id, "reordered"))?;
        let container = self.container_of(parent)?;
        let Some(list) = container.as_ordered() else {
            return Err(self.denied(id, "reordered"));
        };

        list.delete_tag(&tag);
        list.insert_tag(tag, target)?;

        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.remove(&id);
            let index = target.min(parent_node.children.len());
            parent_node.children.insert(index, id);
        }
        self.mark_modified(parent);
        Ok(())
    }

    /// Replace a list's contents in one step. The new tags must share one kind;
    /// on error the list is untouched.
    pub fn replace_list(&mut self, id: NodeId, tags: Vec<Tag>) -> Result<usize, EditError> {
        let list = match &self.get(id)?.data {
            NodeData::List(list) => list.clone(),
            _ => return Err(self.denied(id, "given list contents")),
        };
        let replacement = TagList::from_tags(tags)?;
        let count = replacement.len();

        let was_expanded = self.is_expanded(id);
        self.clear_children(id);
        *list.tag().borrow_mut() = Tag::List(replacement);
        if was_expanded {
            self.expand(id)?;
        }
        self.mark_modified(id);
        debug!(node = %id, count, "Replaced list contents");
        Ok(count)
    }

    /// Follow `/`-separated path names from `start`, expanding as needed.
    pub fn resolve(&mut self, start: NodeId, tag_path: &str) -> Result<NodeId, EditError> {
        let mut current = start;
        for part in tag_path.split('/').filter(|part| !part.is_empty()) {
            self.expand(current)?;
            let children = self.children(current)?;
            let found = children
                .iter()
                .copied()
                .find(|child| self.path_name(*child) == part);
            current = match found {
                Some(child) => child,
                None => {
                    warn!(part, under = %self.path(current), "Unresolved path segment");
                    return Err(EditError::NotFound(format!(
                        "no node '{}' under {}",
                        part,
                        self.describe(current)
                    )));
                }
            };
        }
        Ok(current)
    }

    /// Every node matching `tag_path` from `start`, in tree order.
    ///
    /// A `*` segment matches any child; `**` matches one or more levels. Other
    /// segments must equal the child's path name. Fails with `NotFound` when
    /// nothing matches.
    pub fn resolve_all(&mut self, start: NodeId, tag_path: &str) -> Result<Vec<NodeId>, EditError> {
        let parts: Vec<&str> = tag_path.split('/').filter(|part| !part.is_empty()).collect();
        let mut found = Vec::new();
        self.collect_matches(start, &parts, &mut found)?;
        if found.is_empty() {
            warn!(path = tag_path, under = %self.path(start), "Path matched no nodes");
            return Err(EditError::NotFound(format!(
                "nothing matches '{}' under {}",
                tag_path,
                self.describe(start)
            )));
        }
        debug!(path = tag_path, matches = found.len(), "Resolved path pattern");
        Ok(found)
    }

    fn collect_matches(
        &mut self,
        id: NodeId,
        parts: &[&str],
        found: &mut Vec<NodeId>,
    ) -> Result<(), EditError> {
        let Some((part, rest)) = parts.split_first() else {
            if !found.contains(&id) {
                found.push(id);
            }
            return Ok(());
        };

        self.expand(id)?;
        let children = self.children(id)?;
        for child in children.iter().copied() {
            match *part {
                "*" => self.collect_matches(child, rest, found)?,
                "**" => {
                    self.collect_matches(child, rest, found)?;
                    self.collect_matches(child, parts, found)?;
                }
                name if self.path_name(child) == name => {
                    self.collect_matches(child, rest, found)?
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn entry_data(entry: DirectoryEntry) -> NodeData {
    match entry {
        DirectoryEntry::Directory(path) => NodeData::Directory(path),
        DirectoryEntry::ChunkStore(path) => NodeData::ChunkStore(ChunkStoreData::new(path)),
        DirectoryEntry::Document(path) => NodeData::Document(DocumentData::file(&path)),
    }
}
