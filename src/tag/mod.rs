//! Tagged Value Model
//!
//! A closed sum type over every tag kind in the document format, plus the binary
//! codec and JSON export built on top of it.

pub mod codec;
pub mod json;
pub mod kind;
pub mod value;

pub use codec::{BinaryCodec, TagCodec};
pub use kind::TagKind;
pub use value::{same_tag, Tag, TagCompound, TagList, TagRef};
