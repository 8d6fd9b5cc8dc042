//! Container adapters
//!
//! Insertion and deletion policy for the two container kinds. A node that holds
//! children through a tag (a list, a compound, or a loaded document's root compound)
//! exposes one of these; child nodes consult their parent's adapter for naming,
//! deletion and reordering.

use crate::error::EditError;
use crate::tag::{same_tag, Tag, TagKind, TagRef};

/// Behaviour shared by both container kinds
pub trait TagContainer {
    fn tag_count(&self) -> usize;

    /// Remove `tag` by identity. Returns false if it is not a member.
    fn delete_tag(&self, tag: &TagRef) -> bool;

    fn contains_tag(&self, tag: &TagRef) -> bool;

    /// Whether a new tag of `kind` may be created here (ignoring names).
    fn can_create_tag(&self, kind: TagKind) -> bool;

    /// Members in native order
    fn tags(&self) -> Vec<TagRef>;
}

fn not_a(kind: &str) -> EditError {
    EditError::TypeMismatch(format!("backing tag is not a {}", kind))
}

/// Ordered adapter over a list tag
#[derive(Debug, Clone)]
pub struct ListContainer {
    tag: TagRef,
}

impl ListContainer {
    pub fn new(tag: TagRef) -> Self {
        Self { tag }
    }

    pub fn tag(&self) -> &TagRef {
        &self.tag
    }

    /// Current element kind; `None` while empty.
    pub fn element(&self) -> Option<TagKind> {
        self.tag.borrow().as_list().and_then(|list| list.element())
    }

    pub fn tag_index(&self, tag: &TagRef) -> Option<usize> {
        self.tag.borrow().as_list().and_then(|list| list.position(tag))
    }

    pub fn insert_tag(&self, tag: TagRef, index: usize) -> Result<(), EditError> {
        let mut backing = self.tag.borrow_mut();
        let list = backing.as_list_mut().ok_or_else(|| not_a("list"))?;
        list.insert(index, tag)
    }

    pub fn append_tag(&self, tag: TagRef) -> Result<(), EditError> {
        let mut backing = self.tag.borrow_mut();
        let list = backing.as_list_mut().ok_or_else(|| not_a("list"))?;
        list.push(tag)
    }

    /// Empty the list, returning the removed members.
    pub fn clear(&self) -> Vec<TagRef> {
        match self.tag.borrow_mut().as_list_mut() {
            Some(list) => list.clear(),
            None => Vec::new(),
        }
    }
}

impl TagContainer for ListContainer {
    fn tag_count(&self) -> usize {
        self.tag.borrow().as_list().map_or(0, |list| list.len())
    }

    fn delete_tag(&self, tag: &TagRef) -> bool {
        self.tag
            .borrow_mut()
            .as_list_mut()
            .and_then(|list| list.remove(tag))
            .is_some()
    }

    fn contains_tag(&self, tag: &TagRef) -> bool {
        self.tag_index(tag).is_some()
    }

    /// Any kind while empty, otherwise only the current element kind.
    fn can_create_tag(&self, kind: TagKind) -> bool {
        self.tag
            .borrow()
            .as_list()
            .is_some_and(|list| list.accepts(kind))
    }

    fn tags(&self) -> Vec<TagRef> {
        self.tag
            .borrow()
            .as_list()
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Named adapter over a compound tag
#[derive(Debug, Clone)]
pub struct CompoundContainer {
    tag: TagRef,
}

impl CompoundContainer {
    pub fn new(tag: TagRef) -> Self {
        Self { tag }
    }

    pub fn tag(&self) -> &TagRef {
        &self.tag
    }

    pub fn tag_name(&self, tag: &TagRef) -> Option<String> {
        self.tag
            .borrow()
            .as_compound()
            .and_then(|compound| compound.name_of(tag).map(str::to_string))
    }

    pub fn names_in_use(&self) -> Vec<String> {
        self.tag
            .borrow()
            .as_compound()
            .map(|compound| compound.names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.tag
            .borrow()
            .as_compound()
            .is_some_and(|compound| compound.contains(name))
    }

    pub fn get(&self, name: &str) -> Option<TagRef> {
        self.tag
            .borrow()
            .as_compound()
            .and_then(|compound| compound.get(name).cloned())
    }

    /// Add under `name`; a taken name is a [`EditError::TypeMismatch`].
    pub fn add_tag(&self, tag: TagRef, name: &str) -> Result<(), EditError> {
        let mut backing = self.tag.borrow_mut();
        let compound = backing.as_compound_mut().ok_or_else(|| not_a("compound"))?;
        compound.insert(name, tag)
    }

    pub fn rename_tag(&self, tag: &TagRef, name: &str) -> Result<(), EditError> {
        let mut backing = self.tag.borrow_mut();
        let compound = backing.as_compound_mut().ok_or_else(|| not_a("compound"))?;
        compound.rename(tag, name)
    }

    /// `name` if free, otherwise the first free `"name (Copy N)"`.
    pub fn make_unique_name(&self, name: &str) -> String {
        if !self.contains_name(name) {
            return name.to_string();
        }
        let mut index = 1;
        loop {
            let candidate = format!("{} (Copy {})", name, index);
            if !self.contains_name(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }
}

impl TagContainer for CompoundContainer {
    fn tag_count(&self) -> usize {
        self.tag.borrow().as_compound().map_or(0, |compound| compound.len())
    }

    fn delete_tag(&self, tag: &TagRef) -> bool {
        self.tag
            .borrow_mut()
            .as_compound_mut()
            .and_then(|compound| compound.remove_tag(tag))
            .is_some()
    }

    fn contains_tag(&self, tag: &TagRef) -> bool {
        self.tag
            .borrow()
            .as_compound()
            .is_some_and(|compound| compound.iter().any(|(_, value)| same_tag(value, tag)))
    }

    fn can_create_tag(&self, _kind: TagKind) -> bool {
        matches!(*self.tag.borrow(), Tag::Compound(_))
    }

    fn tags(&self) -> Vec<TagRef> {
        self.tag
            .borrow()
            .as_compound()
            .map(|compound| compound.iter().map(|(_, value)| value.clone()).collect())
            .unwrap_or_default()
    }
}

/// The adapter a parent offers its children
#[derive(Debug, Clone)]
pub enum Container {
    Ordered(ListContainer),
    Named(CompoundContainer),
}

impl Container {
    pub fn is_ordered(&self) -> bool {
        matches!(self, Container::Ordered(_))
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Container::Named(_))
    }

    pub fn as_ordered(&self) -> Option<&ListContainer> {
        match self {
            Container::Ordered(list) => Some(list),
            Container::Named(_) => None,
        }
    }

    pub fn as_named(&self) -> Option<&CompoundContainer> {
        match self {
            Container::Named(compound) => Some(compound),
            Container::Ordered(_) => None,
        }
    }

    fn inner(&self) -> &dyn TagContainer {
        match self {
            Container::Ordered(list) => list as &dyn TagContainer,
            Container::Named(compound) => compound as &dyn TagContainer,
        }
    }
}

impl TagContainer for Container {
    fn tag_count(&self) -> usize {
        self.inner().tag_count()
    }

    fn delete_tag(&self, tag: &TagRef) -> bool {
        self.inner().delete_tag(tag)
    }

    fn contains_tag(&self, tag: &TagRef) -> bool {
        self.inner().contains_tag(tag)
    }

    fn can_create_tag(&self, kind: TagKind) -> bool {
        self.inner().can_create_tag(kind)
    }

    fn tags(&self) -> Vec<TagRef> {
        self.inner().tags()
    }
}
