//! Record types and the key policy table

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Key carrying the type discriminator (`"Namespace.TypeName, Assembly"`)
pub const DISCRIMINATOR_KEY: &str = "$type";

/// Keys whose natural column name collides with a reserved word
pub static RESERVED_KEYS: &[ReservedKey] = &[ReservedKey {
    key: "On",
    column: "ison",
    decode: ValueDecode::Boolean,
}];

/// A source key that is renamed and decoded specially
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedKey {
    /// Exact (case-sensitive) source key
    pub key: &'static str,
    /// Destination column name
    pub column: &'static str,
    /// How the value is decoded
    pub decode: ValueDecode,
}

/// How a JSON value becomes a raw field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDecode {
    /// Keep the string form
    Text,
    /// `true` iff the string form is "true" (any case)
    Boolean,
}

impl ValueDecode {
    /// Decode a JSON value; `null` is treated as absent
    pub fn apply(self, value: &Value) -> Option<RawValue> {
        let text = match value {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some(match self {
            ValueDecode::Text => RawValue::Text(text),
            ValueDecode::Boolean => RawValue::Bool(text.eq_ignore_ascii_case("true")),
        })
    }
}

/// What a source key turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRule {
    /// The type discriminator; never a column
    Discriminator,
    /// A reserved key with a fixed column and decoding
    Reserved(&'static ReservedKey),
    /// A generic column (lower-cased key)
    Column(String),
}

/// Classify a source key
pub fn classify_key(key: &str) -> KeyRule {
    if key == DISCRIMINATOR_KEY {
        return KeyRule::Discriminator;
    }
    if let Some(reserved) = RESERVED_KEYS.iter().find(|r| r.key == key) {
        return KeyRule::Reserved(reserved);
    }
    KeyRule::Column(key.to_lowercase())
}

/// Derive the entity type from a discriminator value.
///
/// Takes the type token (before the first comma or whitespace), keeps its
/// last dotted segment, drops one trailing character and lower-cases it:
/// `"Namespace.FooBarX, Version=1.0"` becomes `"foobar"`.
pub fn parse_entity_type(discriminator: &str) -> Option<String> {
    let token = discriminator.split(',').next()?.split_whitespace().next()?;
    let segment = token.rsplit('.').next()?;

    let mut chars = segment.chars();
    chars.next_back()?;
    let name = chars.as_str().to_lowercase();

    (!name.is_empty()).then_some(name)
}

/// A raw, not yet coerced field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// String form of the source value
    Text(String),
    /// Boolean decoded from a reserved key
    Bool(bool),
}

impl RawValue {
    /// Textual form used for coercion
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            RawValue::Text(s) => std::borrow::Cow::Borrowed(s),
            RawValue::Bool(b) => std::borrow::Cow::Owned(b.to_string()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// One normalized source object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Destination table inferred from the discriminator
    pub entity_type: Option<String>,
    /// Lower-cased column name to raw value
    pub fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    /// Look up a column's raw value
    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.fields.get(column)
    }
}
