//! Single-slot clipboard for named tags
//!
//! A copied tag is stored as an encoded buffer: a synthetic compound holding the tag
//! under [`CLIPBOARD_ROOT_KEY`], written with the root name set to the tag's own name.
//! Every paste decodes that buffer again, so pasted tags never alias each other or
//! the original.
//!
//! The slot is shared through `Rc` and mutated without locking; a clipboard belongs to
//! one thread. Trees receive it at construction so tests can use isolated instances.

use std::cell::RefCell;
use tracing::debug;

use crate::error::EditError;
use crate::tag::{BinaryCodec, Tag, TagCodec, TagCompound, TagKind};

/// Key under which the copied tag is stored inside the clipboard buffer.
pub const CLIPBOARD_ROOT_KEY: &str = "root";

/// A decoded clipboard value
#[derive(Debug)]
pub struct ClipboardEntry {
    pub name: String,
    pub tag: Tag,
}

pub struct Clipboard {
    slot: RefCell<Option<Vec<u8>>>,
    codec: Box<dyn TagCodec>,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard {
    pub fn new() -> Self {
        Self::with_codec(Box::new(BinaryCodec))
    }

    pub fn with_codec(codec: Box<dyn TagCodec>) -> Self {
        Self {
            slot: RefCell::new(None),
            codec,
        }
    }

    /// Replace the slot contents with a deep copy of `tag` under `name`.
    pub fn copy(&self, name: &str, tag: &Tag) -> Result<(), EditError> {
        let wrapper = TagCompound::new().with(CLIPBOARD_ROOT_KEY, tag.deep_copy());
        let buffer = self.codec.encode(name, &Tag::Compound(wrapper))?;
        debug!(name, kind = %tag.kind(), bytes = buffer.len(), "Copied tag to clipboard");
        *self.slot.borrow_mut() = Some(buffer);
        Ok(())
    }

    /// Decode a fresh copy of the slot contents. The slot is left intact.
    pub fn paste(&self) -> Result<ClipboardEntry, EditError> {
        let slot = self.slot.borrow();
        let buffer = slot
            .as_ref()
            .ok_or_else(|| EditError::NotFound("clipboard is empty".to_string()))?;

        let (name, root) = self.codec.decode(buffer)?;
        let Tag::Compound(mut wrapper) = root else {
            return Err(EditError::NotFound(
                "clipboard data is not a compound".to_string(),
            ));
        };
        let tag_ref = wrapper.remove(CLIPBOARD_ROOT_KEY).ok_or_else(|| {
            EditError::NotFound(format!(
                "clipboard data has no '{}' entry",
                CLIPBOARD_ROOT_KEY
            ))
        })?;
        // Freshly decoded, so this handle is the only one.
        let tag = match std::rc::Rc::try_unwrap(tag_ref) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => shared.borrow().deep_copy(),
        };
        Ok(ClipboardEntry { name, tag })
    }

    pub fn contains_data(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Kind of the held tag, if the slot decodes cleanly.
    pub fn peek_kind(&self) -> Option<TagKind> {
        self.paste().ok().map(|entry| entry.tag.kind())
    }

    pub fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }

    /// Install a raw buffer, bypassing [`Clipboard::copy`].
    pub fn set_raw(&self, buffer: Vec<u8>) {
        *self.slot.borrow_mut() = Some(buffer);
    }
}
