//! Encoding then decoding reproduces the tag tree and its root name

use proptest::collection::vec;
use proptest::prelude::*;
use tagtree::node::ScalarKind;
use tagtree::tag::{BinaryCodec, Tag, TagCodec, TagCompound, TagList};

/// Every tag kind, nested two levels deep, survives the binary codec
#[test]
fn test_codec_round_trip_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                (any::<i8>(), any::<i16>(), any::<i32>(), any::<i64>()),
                (-1e30f32..1e30f32, -1e300f64..1e300f64),
                ("[a-zA-Z0-9 ]{0,12}", ".{0,24}"),
                vec(any::<u8>(), 0..16),
                vec(any::<i32>(), 0..8),
                vec(any::<i64>(), 0..8),
                vec(any::<i16>(), 0..8),
            ),
            |((b, s, i, l), (f, d), (name, text), bytes, ints, longs, shorts)| {
                let elements: Vec<Tag> = ints.iter().map(|v| Tag::Int(*v)).collect();
                let nested: Vec<Tag> = longs
                    .iter()
                    .map(|v| Tag::Compound(TagCompound::new().with("value", Tag::Long(*v))))
                    .collect();
                let root = TagCompound::new()
                    .with("byte", Tag::signed_byte(b))
                    .with("short", Tag::Short(s))
                    .with("int", Tag::Int(i))
                    .with("long", Tag::Long(l))
                    .with("float", Tag::Float(f))
                    .with("double", Tag::Double(d))
                    .with("text", Tag::String(text.clone()))
                    .with("bytes", Tag::ByteArray(bytes.clone()))
                    .with("ints", Tag::IntArray(ints.clone()))
                    .with("longs", Tag::LongArray(longs.clone()))
                    .with("shorts", Tag::ShortArray(shorts.clone()))
                    .with("list", Tag::List(TagList::from_tags(elements).unwrap()))
                    .with("compounds", Tag::List(TagList::from_tags(nested).unwrap()));
                let tag = Tag::Compound(root);

                let encoded = BinaryCodec.encode(&name, &tag).unwrap();
                let (decoded_name, decoded) = BinaryCodec.decode(&encoded).unwrap();
                prop_assert_eq!(decoded_name, name);
                prop_assert_eq!(decoded, tag);
                Ok(())
            },
        )
        .unwrap();
}

/// Truncating an encoding anywhere is an error, never a panic
#[test]
fn test_truncated_input_is_rejected() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(vec(any::<i32>(), 1..8), any::<prop::sample::Index>()), |(ints, cut)| {
            let tag = Tag::Compound(TagCompound::new().with("ints", Tag::IntArray(ints)));
            let encoded = BinaryCodec.encode("root", &tag).unwrap();
            let cut = cut.index(encoded.len());
            prop_assert!(BinaryCodec.decode(&encoded[..cut]).is_err());
            Ok(())
        })
        .unwrap();
}

/// Scalar text parsing accepts exactly the target type's range
#[test]
fn test_scalar_parse_ranges() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<i16>(), any::<i32>(), any::<i8>()), |(s, i, b)| {
            prop_assert_eq!(ScalarKind::Short.parse(&s.to_string()).unwrap(), Tag::Short(s));
            prop_assert_eq!(ScalarKind::Int.parse(&i.to_string()).unwrap(), Tag::Int(i));
            prop_assert_eq!(ScalarKind::Byte.parse(&b.to_string()).unwrap(), Tag::signed_byte(b));

            let fits_short = i16::try_from(i).is_ok();
            prop_assert_eq!(ScalarKind::Short.parse(&i.to_string()).is_ok(), fits_short);
            Ok(())
        })
        .unwrap();
}
