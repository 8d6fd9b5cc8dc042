//! Binary tag codec
//!
//! Big-endian, length-prefixed encoding of one named root tag:
//! `type id (u8) | name (u16 length + UTF-8) | payload`.
//! Compounds are terminated by the end id; lists carry their element id and an
//! `i32` length, with the end id standing in for an empty list's element kind.

use tracing::trace;

use crate::error::CodecError;
use crate::tag::kind::{TagKind, END_ID};
use crate::tag::value::{Tag, TagCompound, TagList};

/// Nesting limit for decoding untrusted input
pub const MAX_DEPTH: usize = 512;

/// Encoder/decoder seam for whole named tag trees
pub trait TagCodec {
    fn encode(&self, name: &str, tag: &Tag) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<(String, Tag), CodecError>;
}

/// Uncompressed big-endian binary format
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl TagCodec for BinaryCodec {
    fn encode(&self, name: &str, tag: &Tag) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        out.push(tag.kind().id());
        write_string(&mut out, name)?;
        write_payload(&mut out, tag)?;
        trace!(bytes = out.len(), kind = %tag.kind(), "Encoded tag tree");
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<(String, Tag), CodecError> {
        let mut reader = Reader::new(bytes);
        let id = reader.read_u8()?;
        let kind = TagKind::from_id(id).ok_or(CodecError::UnknownTagType(id))?;
        let name = reader.read_string()?;
        let tag = reader.read_payload(kind, 0)?;
        trace!(bytes = bytes.len(), kind = %kind, "Decoded tag tree");
        Ok((name, tag))
    }
}

fn write_string(out: &mut Vec<u8>, value: &str) -> Result<(), CodecError> {
    let bytes = value.as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| CodecError::StringTooLong(bytes.len()))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

fn write_len(out: &mut Vec<u8>, len: usize) -> Result<(), CodecError> {
    let len = i32::try_from(len).map_err(|_| CodecError::LengthTooLarge(len))?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn write_payload(out: &mut Vec<u8>, tag: &Tag) -> Result<(), CodecError> {
    match tag {
        Tag::Byte(v) => out.push(*v),
        Tag::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
        Tag::ByteArray(v) => {
            write_len(out, v.len())?;
            out.extend_from_slice(v);
        }
        Tag::String(v) => write_string(out, v)?,
        Tag::List(list) => write_list(out, list)?,
        Tag::Compound(compound) => write_compound(out, compound)?,
        Tag::IntArray(v) => {
            write_len(out, v.len())?;
            for item in v {
                out.extend_from_slice(&item.to_be_bytes());
            }
        }
        Tag::LongArray(v) => {
            write_len(out, v.len())?;
            for item in v {
                out.extend_from_slice(&item.to_be_bytes());
            }
        }
        Tag::ShortArray(v) => {
            write_len(out, v.len())?;
            for item in v {
                out.extend_from_slice(&item.to_be_bytes());
            }
        }
    }
    Ok(())
}

fn write_list(out: &mut Vec<u8>, list: &TagList) -> Result<(), CodecError> {
    let element = list.element();
    out.push(element.map(TagKind::id).unwrap_or(END_ID));
    write_len(out, list.len())?;
    for item in list.iter() {
        let item = item.borrow();
        if let Some(declared) = element {
            if item.kind() != declared {
                return Err(CodecError::ListElementMismatch {
                    declared: declared.name(),
                    found: item.kind().name(),
                });
            }
        }
        write_payload(out, &item)?;
    }
    Ok(())
}

fn write_compound(out: &mut Vec<u8>, compound: &TagCompound) -> Result<(), CodecError> {
    for (name, value) in compound.iter() {
        let value = value.borrow();
        out.push(value.kind().id());
        write_string(out, name)?;
        write_payload(out, &value)?;
    }
    out.push(END_ID);
    Ok(())
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or(CodecError::UnexpectedEof {
                needed: n,
                offset: self.pos,
            })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.take(N)?);
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        let len = i32::from_be_bytes(self.read_array()?);
        usize::try_from(len).map_err(|_| CodecError::NegativeLength(len))
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        let len = u16::from_be_bytes(self.read_array()?) as usize;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8(offset))
    }

    fn read_payload(&mut self, kind: TagKind, depth: usize) -> Result<Tag, CodecError> {
        if depth > MAX_DEPTH {
            return Err(CodecError::TooDeep(MAX_DEPTH));
        }

        let tag = match kind {
            TagKind::Byte => Tag::Byte(self.read_u8()?),
            TagKind::Short => Tag::Short(i16::from_be_bytes(self.read_array()?)),
            TagKind::Int => Tag::Int(i32::from_be_bytes(self.read_array()?)),
            TagKind::Long => Tag::Long(i64::from_be_bytes(self.read_array()?)),
            TagKind::Float => Tag::Float(f32::from_be_bytes(self.read_array()?)),
            TagKind::Double => Tag::Double(f64::from_be_bytes(self.read_array()?)),
            TagKind::ByteArray => {
                let len = self.read_len()?;
                Tag::ByteArray(self.take(len)?.to_vec())
            }
            TagKind::String => Tag::String(self.read_string()?),
            TagKind::List => Tag::List(self.read_list(depth)?),
            TagKind::Compound => Tag::Compound(self.read_compound(depth)?),
            TagKind::IntArray => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len.min(self.remaining() / 4));
                for _ in 0..len {
                    items.push(i32::from_be_bytes(self.read_array()?));
                }
                Tag::IntArray(items)
            }
            TagKind::LongArray => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len.min(self.remaining() / 8));
                for _ in 0..len {
                    items.push(i64::from_be_bytes(self.read_array()?));
                }
                Tag::LongArray(items)
            }
            TagKind::ShortArray => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len.min(self.remaining() / 2));
                for _ in 0..len {
                    items.push(i16::from_be_bytes(self.read_array()?));
                }
                Tag::ShortArray(items)
            }
        };
        Ok(tag)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn read_list(&mut self, depth: usize) -> Result<TagList, CodecError> {
        let id = self.read_u8()?;
        let len = self.read_len()?;
        let mut list = TagList::new();
        if id == END_ID {
            // Empty lists are typed with the end id; anything else is malformed.
            if len != 0 {
                return Err(CodecError::UnknownTagType(END_ID));
            }
            return Ok(list);
        }

        let kind = TagKind::from_id(id).ok_or(CodecError::UnknownTagType(id))?;
        for _ in 0..len {
            let item = self.read_payload(kind, depth + 1)?;
            list.push(item.into_ref())
                .map_err(|_| CodecError::ListElementMismatch {
                    declared: kind.name(),
                    found: kind.name(),
                })?;
        }
        Ok(list)
    }

    fn read_compound(&mut self, depth: usize) -> Result<TagCompound, CodecError> {
        let mut compound = TagCompound::new();
        loop {
            let id = self.read_u8()?;
            if id == END_ID {
                return Ok(compound);
            }
            let kind = TagKind::from_id(id).ok_or(CodecError::UnknownTagType(id))?;
            let name = self.read_string()?;
            if compound.contains(&name) {
                return Err(CodecError::DuplicateKey(name));
            }
            let value = self.read_payload(kind, depth + 1)?;
            compound.set(name, value.into_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(tag: Tag) -> Tag {
        let codec = BinaryCodec;
        let bytes = codec.encode("value", &tag).unwrap();
        let (name, decoded) = codec.decode(&bytes).unwrap();
        assert_eq!(name, "value");
        decoded
    }

    #[test]
    fn test_scalar_boundaries_round_trip() {
        let samples = vec![
            Tag::Int(i32::MIN),
            Tag::Int(i32::MAX),
            Tag::Short(i16::MIN),
            Tag::Short(i16::MAX),
            Tag::Long(i64::MIN),
            Tag::Long(i64::MAX),
            Tag::Float(f32::MIN_POSITIVE),
            Tag::Double(-1.5e300),
            Tag::String("line one\nline two".to_string()),
        ];
        for tag in samples {
            let decoded = round_trip(tag.deep_copy());
            assert_eq!(decoded, tag);
        }
    }

    #[test]
    fn test_signed_bytes_round_trip() {
        for value in i8::MIN..=i8::MAX {
            let decoded = round_trip(Tag::signed_byte(value));
            assert_eq!(decoded, Tag::signed_byte(value));
            assert_eq!(decoded.to_string(), value.to_string());
        }
    }

    #[test]
    fn test_nested_containers_round_trip() {
        let list = TagList::from_tags(vec![
            Tag::Compound(TagCompound::new().with("id", Tag::Short(1))),
            Tag::Compound(TagCompound::new().with("id", Tag::Short(2))),
        ])
        .unwrap();
        let root = Tag::Compound(
            TagCompound::new()
                .with("Inventory", Tag::List(list))
                .with("Empty", Tag::List(TagList::new()))
                .with("Heights", Tag::IntArray(vec![1, -2, 3]))
                .with("Blocks", Tag::ByteArray(vec![0, 1, 255]))
                .with("Shorts", Tag::ShortArray(vec![-1, 2]))
                .with("Longs", Tag::LongArray(vec![i64::MAX])),
        );
        assert_eq!(round_trip(root.deep_copy()), root);
    }

    #[test]
    fn test_truncated_input_fails() {
        let codec = BinaryCodec;
        let bytes = codec.encode("x", &Tag::Long(5)).unwrap();
        let err = codec.decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_unknown_type_fails() {
        let codec = BinaryCodec;
        let err = codec.decode(&[99, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::UnknownTagType(99)));
    }

    #[test]
    fn test_negative_array_length_fails() {
        let codec = BinaryCodec;
        let mut bytes = vec![TagKind::IntArray.id(), 0, 0];
        bytes.extend_from_slice(&(-1i32).to_be_bytes());
        let err = codec.decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::NegativeLength(-1)));
    }

    #[test]
    fn test_duplicate_compound_key_fails() {
        let codec = BinaryCodec;
        let mut bytes = vec![TagKind::Compound.id(), 0, 0];
        for value in [5u8, 6] {
            bytes.extend_from_slice(&[TagKind::Byte.id(), 0, 1, b'a', value]);
        }
        bytes.push(0);
        let err = codec.decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateKey(ref name) if name == "a"));
    }

    #[test]
    fn test_oversized_length_fails() {
        let mut out = Vec::new();
        let too_long = i32::MAX as usize + 1;
        assert!(matches!(
            write_len(&mut out, too_long),
            Err(CodecError::LengthTooLarge(len)) if len == too_long
        ));
        assert!(out.is_empty());
    }
}
