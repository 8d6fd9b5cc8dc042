//! Tag kinds and their wire identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tag::value::{Tag, TagCompound, TagList};

/// Concrete tag kinds. There is no end/void kind: the end marker only exists on
/// the wire, and an empty list carries no element kind at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
    ShortArray,
}

/// Wire id of the end marker that terminates compounds and types empty lists.
pub const END_ID: u8 = 0;

impl TagKind {
    pub const ALL: [TagKind; 13] = [
        TagKind::Byte,
        TagKind::Short,
        TagKind::Int,
        TagKind::Long,
        TagKind::Float,
        TagKind::Double,
        TagKind::ByteArray,
        TagKind::String,
        TagKind::List,
        TagKind::Compound,
        TagKind::IntArray,
        TagKind::LongArray,
        TagKind::ShortArray,
    ];

    /// Wire type id
    pub fn id(self) -> u8 {
        match self {
            TagKind::Byte => 1,
            TagKind::Short => 2,
            TagKind::Int => 3,
            TagKind::Long => 4,
            TagKind::Float => 5,
            TagKind::Double => 6,
            TagKind::ByteArray => 7,
            TagKind::String => 8,
            TagKind::List => 9,
            TagKind::Compound => 10,
            TagKind::IntArray => 11,
            TagKind::LongArray => 12,
            TagKind::ShortArray => 16,
        }
    }

    pub fn from_id(id: u8) -> Option<TagKind> {
        TagKind::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            TagKind::Byte => "Byte",
            TagKind::Short => "Short",
            TagKind::Int => "Int",
            TagKind::Long => "Long",
            TagKind::Float => "Float",
            TagKind::Double => "Double",
            TagKind::ByteArray => "ByteArray",
            TagKind::String => "String",
            TagKind::List => "List",
            TagKind::Compound => "Compound",
            TagKind::IntArray => "IntArray",
            TagKind::LongArray => "LongArray",
            TagKind::ShortArray => "ShortArray",
        }
    }

    /// Single-letter type marker used by the batch printer.
    pub fn marker(self) -> &'static str {
        match self {
            TagKind::Byte => "b",
            TagKind::Short => "s",
            TagKind::Int => "i",
            TagKind::Long => "l",
            TagKind::Float => "f",
            TagKind::Double => "d",
            TagKind::String => "T",
            TagKind::ByteArray => "B",
            TagKind::ShortArray => "S",
            TagKind::IntArray => "I",
            TagKind::LongArray => "L",
            TagKind::List => "L",
            TagKind::Compound => "C",
        }
    }

    /// Numeric and string kinds edited through a single line of text.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            TagKind::Byte
                | TagKind::Short
                | TagKind::Int
                | TagKind::Long
                | TagKind::Float
                | TagKind::Double
                | TagKind::String
        )
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            TagKind::ByteArray | TagKind::ShortArray | TagKind::IntArray | TagKind::LongArray
        )
    }

    pub fn is_container(self) -> bool {
        matches!(self, TagKind::List | TagKind::Compound)
    }

    /// Freshly constructed default value of this kind
    pub fn default_tag(self) -> Tag {
        match self {
            TagKind::Byte => Tag::Byte(0),
            TagKind::Short => Tag::Short(0),
            TagKind::Int => Tag::Int(0),
            TagKind::Long => Tag::Long(0),
            TagKind::Float => Tag::Float(0.0),
            TagKind::Double => Tag::Double(0.0),
            TagKind::ByteArray => Tag::ByteArray(Vec::new()),
            TagKind::String => Tag::String(String::new()),
            TagKind::List => Tag::List(TagList::new()),
            TagKind::Compound => Tag::Compound(TagCompound::new()),
            TagKind::IntArray => Tag::IntArray(Vec::new()),
            TagKind::LongArray => Tag::LongArray(Vec::new()),
            TagKind::ShortArray => Tag::ShortArray(Vec::new()),
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TagKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown tag kind: {}", s))
    }
}
