//! Record extraction
//!
//! Turns the bytes of one downloaded file (a JSON array of `$type`-tagged
//! objects) into normalized [`RawRecord`]s. No type conversion happens here;
//! values stay textual until the loader knows the destination column kinds.
//!
//! # Example
//!
//! ```
//! use bucket_loader::extract::{extract_records, RawValue};
//!
//! let bytes = br#"[{"$type":"X.FooY, v1","Name":"a","On":"true"},null]"#;
//! let records = extract_records("a.json", bytes).unwrap();
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].entity_type.as_deref(), Some("foo"));
//! assert_eq!(records[0].get("ison"), Some(&RawValue::Bool(true)));
//! ```

mod types;

pub use types::{
    classify_key, parse_entity_type, KeyRule, RawRecord, RawValue, ReservedKey, ValueDecode,
    DISCRIMINATOR_KEY, RESERVED_KEYS,
};

use crate::error::{Error, Result};
use serde_json::{Map, Value};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Extract every record from one file's content.
///
/// `null` array elements are skipped. Anything that is not a JSON array of
/// objects (and nulls) fails the whole file.
pub fn extract_records(file: &str, bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let root: Value =
        serde_json::from_slice(bytes).map_err(|e| Error::parse(file, format!("{e}")))?;

    let Value::Array(elements) = root else {
        return Err(Error::parse(file, "expected a JSON array at the top level"));
    };

    let mut records = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match element {
            Value::Null => {}
            Value::Object(object) => records.push(decode_object(object)),
            other => {
                return Err(Error::parse(
                    file,
                    format!("element {index} is {}, expected an object", kind_name(other)),
                ));
            }
        }
    }

    Ok(records)
}

/// Decode one tagged object into a record
pub fn decode_object(object: &Map<String, Value>) -> RawRecord {
    let mut record = RawRecord::default();

    for (key, value) in object {
        match classify_key(key) {
            KeyRule::Discriminator => {
                record.entity_type = value.as_str().and_then(parse_entity_type);
            }
            KeyRule::Reserved(reserved) => {
                if let Some(raw) = reserved.decode.apply(value) {
                    record.fields.insert(reserved.column.to_string(), raw);
                }
            }
            KeyRule::Column(column) => {
                if column.is_empty() {
                    continue;
                }
                if let Some(raw) = ValueDecode::Text.apply(value) {
                    record.fields.insert(column, raw);
                }
            }
        }
    }

    record
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests;
