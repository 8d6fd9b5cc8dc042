//! JSON export of tag trees
//!
//! Compounds become objects (entry order preserved), lists become arrays, numbers stay
//! numbers and byte arrays are written as hex strings. Non-finite floats have no JSON
//! representation and are exported as `null`.

use serde_json::{Map, Number, Value};

use crate::tag::value::Tag;

pub fn to_json_value(tag: &Tag) -> Value {
    match tag {
        Tag::Byte(v) => Value::from(*v as i8),
        Tag::Short(v) => Value::from(*v),
        Tag::Int(v) => Value::from(*v),
        Tag::Long(v) => Value::from(*v),
        Tag::Float(v) => float_value(f64::from(*v)),
        Tag::Double(v) => float_value(*v),
        Tag::ByteArray(v) => Value::String(hex::encode(v)),
        Tag::String(v) => Value::String(v.clone()),
        Tag::List(list) => Value::Array(
            list.iter()
                .map(|item| to_json_value(&item.borrow()))
                .collect(),
        ),
        Tag::Compound(compound) => {
            let mut map = Map::new();
            for (name, value) in compound.iter() {
                map.insert(name.clone(), to_json_value(&value.borrow()));
            }
            Value::Object(map)
        }
        Tag::IntArray(v) => Value::Array(v.iter().map(|item| Value::from(*item)).collect()),
        Tag::LongArray(v) => Value::Array(v.iter().map(|item| Value::from(*item)).collect()),
        Tag::ShortArray(v) => Value::Array(v.iter().map(|item| Value::from(*item)).collect()),
    }
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// Pretty-printed JSON text for `tag`.
pub fn to_json_string(tag: &Tag) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_json_value(tag))
}
