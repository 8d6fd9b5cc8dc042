//! Scalar editing: one text grammar per scalar kind.

use crate::error::EditError;
use crate::tag::{Tag, TagKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl ScalarKind {
    pub fn from_kind(kind: TagKind) -> Option<ScalarKind> {
        match kind {
            TagKind::Byte => Some(ScalarKind::Byte),
            TagKind::Short => Some(ScalarKind::Short),
            TagKind::Int => Some(ScalarKind::Int),
            TagKind::Long => Some(ScalarKind::Long),
            TagKind::Float => Some(ScalarKind::Float),
            TagKind::Double => Some(ScalarKind::Double),
            TagKind::String => Some(ScalarKind::String),
            _ => None,
        }
    }

    pub fn kind(self) -> TagKind {
        match self {
            ScalarKind::Byte => TagKind::Byte,
            ScalarKind::Short => TagKind::Short,
            ScalarKind::Int => TagKind::Int,
            ScalarKind::Long => TagKind::Long,
            ScalarKind::Float => TagKind::Float,
            ScalarKind::Double => TagKind::Double,
            ScalarKind::String => TagKind::String,
        }
    }

    /// Parse `text` into a tag of this kind.
    ///
    /// Numbers are trimmed and must fit the exact bit width; bytes use the signed
    /// range. Strings are taken verbatim.
    pub fn parse(self, text: &str) -> Result<Tag, EditError> {
        if self == ScalarKind::String {
            return Ok(Tag::String(text.to_string()));
        }

        let trimmed = text.trim();
        let invalid = |e: &dyn std::fmt::Display| {
            EditError::ParseError(format!(
                "'{}' is not a valid {} value: {}",
                trimmed,
                self.kind(),
                e
            ))
        };

        let tag = match self {
            ScalarKind::Byte => Tag::signed_byte(trimmed.parse::<i8>().map_err(|e| invalid(&e))?),
            ScalarKind::Short => Tag::Short(trimmed.parse().map_err(|e| invalid(&e))?),
            ScalarKind::Int => Tag::Int(trimmed.parse().map_err(|e| invalid(&e))?),
            ScalarKind::Long => Tag::Long(trimmed.parse().map_err(|e| invalid(&e))?),
            ScalarKind::Float => {
                let value: f32 = trimmed.parse().map_err(|e| invalid(&e))?;
                check_finite(value.is_infinite(), trimmed, self)?;
                Tag::Float(value)
            }
            ScalarKind::Double => {
                let value: f64 = trimmed.parse().map_err(|e| invalid(&e))?;
                check_finite(value.is_infinite(), trimmed, self)?;
                Tag::Double(value)
            }
            ScalarKind::String => Tag::String(text.to_string()),
        };
        Ok(tag)
    }

    /// Text offered to an editor for the current value of `tag`.
    pub fn edit_text(self, tag: &Tag) -> String {
        match tag {
            Tag::String(value) => value.clone(),
            other => other.to_string(),
        }
    }
}

/// Overflow to infinity counts as out of range unless infinity was asked for.
fn check_finite(infinite: bool, text: &str, kind: ScalarKind) -> Result<(), EditError> {
    if infinite && !text.to_ascii_lowercase().contains("inf") {
        return Err(EditError::ParseError(format!(
            "'{}' is out of range for {}",
            text,
            kind.kind()
        )));
    }
    Ok(())
}
