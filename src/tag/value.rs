//! Tag values and the two container payloads.
//!
//! Tags are shared through [`TagRef`] handles so that the editing layer can refer to
//! one exact tag inside its parent container. Two handles are the *same* tag when
//! they point at the same allocation ([`same_tag`]); `PartialEq` compares values.
//! `Tag` deliberately does not implement `Clone`: cloning a container would alias
//! its children, so copies always go through [`Tag::deep_copy`].

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::EditError;
use crate::tag::kind::TagKind;

/// Shared, mutable handle to one tag
pub type TagRef = Rc<RefCell<Tag>>;

/// Identity comparison of two tag handles
pub fn same_tag(a: &TagRef, b: &TagRef) -> bool {
    Rc::ptr_eq(a, b)
}

/// One node of the tagged-union document format
#[derive(Debug, PartialEq)]
pub enum Tag {
    /// Stored unsigned; displayed and parsed as signed.
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(TagList),
    Compound(TagCompound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    ShortArray(Vec<i16>),
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Byte(_) => TagKind::Byte,
            Tag::Short(_) => TagKind::Short,
            Tag::Int(_) => TagKind::Int,
            Tag::Long(_) => TagKind::Long,
            Tag::Float(_) => TagKind::Float,
            Tag::Double(_) => TagKind::Double,
            Tag::ByteArray(_) => TagKind::ByteArray,
            Tag::String(_) => TagKind::String,
            Tag::List(_) => TagKind::List,
            Tag::Compound(_) => TagKind::Compound,
            Tag::IntArray(_) => TagKind::IntArray,
            Tag::LongArray(_) => TagKind::LongArray,
            Tag::ShortArray(_) => TagKind::ShortArray,
        }
    }

    /// Byte tag from its signed display value (bit reinterpretation).
    pub fn signed_byte(value: i8) -> Tag {
        Tag::Byte(value as u8)
    }

    /// Wrap in a fresh shared handle
    pub fn into_ref(self) -> TagRef {
        Rc::new(RefCell::new(self))
    }

    /// Recursive copy that shares no storage with `self`.
    pub fn deep_copy(&self) -> Tag {
        match self {
            Tag::Byte(v) => Tag::Byte(*v),
            Tag::Short(v) => Tag::Short(*v),
            Tag::Int(v) => Tag::Int(*v),
            Tag::Long(v) => Tag::Long(*v),
            Tag::Float(v) => Tag::Float(*v),
            Tag::Double(v) => Tag::Double(*v),
            Tag::ByteArray(v) => Tag::ByteArray(v.clone()),
            Tag::String(v) => Tag::String(v.clone()),
            Tag::List(list) => Tag::List(list.deep_copy()),
            Tag::Compound(compound) => Tag::Compound(compound.deep_copy()),
            Tag::IntArray(v) => Tag::IntArray(v.clone()),
            Tag::LongArray(v) => Tag::LongArray(v.clone()),
            Tag::ShortArray(v) => Tag::ShortArray(v.clone()),
        }
    }

    pub fn as_list(&self) -> Option<&TagList> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut TagList> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&TagCompound> {
        match self {
            Tag::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut TagCompound> {
        match self {
            Tag::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    /// Number of direct children for containers, `None` for leaves.
    pub fn child_count(&self) -> Option<usize> {
        match self {
            Tag::List(list) => Some(list.len()),
            Tag::Compound(compound) => Some(compound.len()),
            _ => None,
        }
    }
}

fn entries_label(count: usize) -> String {
    if count == 1 {
        "1 entry".to_string()
    } else {
        format!("{} entries", count)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Byte(v) => write!(f, "{}", *v as i8),
            Tag::Short(v) => write!(f, "{}", v),
            Tag::Int(v) => write!(f, "{}", v),
            Tag::Long(v) => write!(f, "{}", v),
            Tag::Float(v) => write!(f, "{}", v),
            Tag::Double(v) => write!(f, "{}", v),
            Tag::String(v) => f.write_str(v),
            Tag::ByteArray(v) => write!(f, "[{} bytes]", v.len()),
            Tag::ShortArray(v) => write!(f, "[{} shorts]", v.len()),
            Tag::IntArray(v) => write!(f, "[{} ints]", v.len()),
            Tag::LongArray(v) => write!(f, "[{} longs]", v.len()),
            Tag::List(list) => f.write_str(&entries_label(list.len())),
            Tag::Compound(compound) => f.write_str(&entries_label(compound.len())),
        }
    }
}

/// Ordered sequence of same-kind tags.
///
/// The element kind is fixed by the first insertion and released again when the
/// list becomes empty.
#[derive(Debug, Default, PartialEq)]
pub struct TagList {
    element: Option<TagKind>,
    items: Vec<TagRef>,
}

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from owned values, enforcing the element-kind invariant.
    pub fn from_tags(tags: Vec<Tag>) -> Result<Self, EditError> {
        let mut list = TagList::new();
        for tag in tags {
            list.push(tag.into_ref())?;
        }
        Ok(list)
    }

    /// Element kind; `None` while the list is empty.
    pub fn element(&self) -> Option<TagKind> {
        if self.items.is_empty() {
            None
        } else {
            self.element
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TagRef> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TagRef> {
        self.items.iter()
    }

    /// Whether a tag of `kind` may be inserted.
    pub fn accepts(&self, kind: TagKind) -> bool {
        match self.element() {
            None => true,
            Some(element) => element == kind,
        }
    }

    fn check_kind(&self, tag: &TagRef) -> Result<TagKind, EditError> {
        let kind = tag.borrow().kind();
        if !self.accepts(kind) {
            return Err(EditError::TypeMismatch(format!(
                "list of {} cannot hold a {}",
                self.element.map(TagKind::name).unwrap_or("nothing"),
                kind
            )));
        }
        Ok(kind)
    }

    pub fn push(&mut self, tag: TagRef) -> Result<(), EditError> {
        let kind = self.check_kind(&tag)?;
        self.element = Some(kind);
        self.items.push(tag);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, tag: TagRef) -> Result<(), EditError> {
        if index > self.items.len() {
            return Err(EditError::NotFound(format!(
                "index {} out of range for list of {}",
                index,
                self.items.len()
            )));
        }
        let kind = self.check_kind(&tag)?;
        self.element = Some(kind);
        self.items.insert(index, tag);
        Ok(())
    }

    /// Index of `tag` by identity
    pub fn position(&self, tag: &TagRef) -> Option<usize> {
        self.items.iter().position(|item| same_tag(item, tag))
    }

    /// Remove the first element identical to `tag`, returning its former index.
    pub fn remove(&mut self, tag: &TagRef) -> Option<usize> {
        let index = self.position(tag)?;
        self.items.remove(index);
        if self.items.is_empty() {
            self.element = None;
        }
        Some(index)
    }

    /// Remove every element, handing them back to the caller.
    pub fn clear(&mut self) -> Vec<TagRef> {
        self.element = None;
        std::mem::take(&mut self.items)
    }

    pub fn deep_copy(&self) -> TagList {
        TagList {
            element: self.element,
            items: self
                .items
                .iter()
                .map(|item| item.borrow().deep_copy().into_ref())
                .collect(),
        }
    }
}

/// Name-keyed container with unique names.
#[derive(Debug, Default, PartialEq)]
pub struct TagCompound {
    entries: IndexMap<String, TagRef>,
}

impl TagCompound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert that overwrites an existing entry.
    pub fn with(mut self, name: impl Into<String>, tag: Tag) -> Self {
        self.set(name, tag.into_ref());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TagRef> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TagRef> {
        self.entries.iter()
    }

    /// Add a new entry; fails if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, tag: TagRef) -> Result<(), EditError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(EditError::TypeMismatch(format!(
                "a tag named '{}' already exists",
                name
            )));
        }
        self.entries.insert(name, tag);
        Ok(())
    }

    /// Insert or overwrite, returning the displaced tag.
    pub fn set(&mut self, name: impl Into<String>, tag: TagRef) -> Option<TagRef> {
        self.entries.insert(name.into(), tag)
    }

    pub fn remove(&mut self, name: &str) -> Option<TagRef> {
        self.entries.shift_remove(name)
    }

    /// Name under which `tag` is stored, by identity
    pub fn name_of(&self, tag: &TagRef) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, value)| same_tag(value, tag))
            .map(|(name, _)| name.as_str())
    }

    /// Remove `tag` by identity, returning the name it was stored under.
    pub fn remove_tag(&mut self, tag: &TagRef) -> Option<String> {
        let index = self
            .entries
            .values()
            .position(|value| same_tag(value, tag))?;
        self.entries
            .shift_remove_index(index)
            .map(|(name, _)| name)
    }

    /// Re-key `tag` under `new_name`, keeping its position.
    pub fn rename(&mut self, tag: &TagRef, new_name: &str) -> Result<(), EditError> {
        let index = self
            .entries
            .values()
            .position(|value| same_tag(value, tag))
            .ok_or_else(|| EditError::NotFound("tag is not in this compound".to_string()))?;

        let (old_name, _) = self
            .entries
            .get_index(index)
            .ok_or_else(|| EditError::NotFound("tag is not in this compound".to_string()))?;
        if old_name == new_name {
            return Ok(());
        }
        if self.entries.contains_key(new_name) {
            return Err(EditError::TypeMismatch(format!(
                "a tag named '{}' already exists",
                new_name
            )));
        }

        if let Some((_, value)) = self.entries.shift_remove_index(index) {
            self.entries.shift_insert(index, new_name.to_string(), value);
        }
        Ok(())
    }

    pub fn deep_copy(&self) -> TagCompound {
        TagCompound {
            entries: self
                .entries
                .iter()
                .map(|(name, value)| (name.clone(), value.borrow().deep_copy().into_ref()))
                .collect(),
        }
    }
}
