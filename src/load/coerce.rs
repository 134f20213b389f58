//! Value coercion
//!
//! Converts raw textual field values into typed parameters according to the
//! destination column kind. A value that cannot be converted, or that falls
//! outside a narrow column's range, becomes NULL; coercion never fails a row.

use super::types::SqlValue;
use crate::extract::{RawRecord, RawValue};
use crate::schema::{ColumnSchema, ValueKind};
use chrono::NaiveDateTime;

/// Only this many leading characters of a timestamp are parsed
pub const TIMESTAMP_PREFIX_CHARS: usize = 20;

/// Accepted timestamp layout; anything after it is discarded
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Coerce one raw value to a column kind
pub fn coerce(kind: ValueKind, raw: Option<&RawValue>) -> SqlValue {
    let Some(raw) = raw else {
        return SqlValue::Null;
    };

    let coerced = match (kind, raw) {
        (ValueKind::Text, raw) => Some(SqlValue::Text(raw.as_text().into_owned())),
        (ValueKind::Boolean, RawValue::Bool(b)) => Some(SqlValue::Boolean(*b)),
        (ValueKind::Boolean, RawValue::Text(s)) => parse_bool(s).map(SqlValue::Boolean),
        (ValueKind::Integer, RawValue::Text(s)) => s.parse::<i64>().ok().map(SqlValue::Integer),
        (ValueKind::Float, RawValue::Text(s)) => s.trim().parse::<f64>().ok().map(SqlValue::Float),
        (ValueKind::Timestamp, RawValue::Text(s)) => parse_timestamp(s).map(SqlValue::Timestamp),
        (ValueKind::Integer | ValueKind::Float | ValueKind::Timestamp, RawValue::Bool(_))
        | (ValueKind::Unknown, _) => None,
    };

    coerced.unwrap_or(SqlValue::Null)
}

/// Coerce a record into a positional row following the schema's column order.
///
/// Returns the row and the number of present values that were nulled.
pub fn coerce_row(schema: &ColumnSchema, record: &RawRecord) -> (Vec<SqlValue>, usize) {
    let mut nulled = 0;
    let row = schema
        .columns
        .iter()
        .map(|column| {
            let raw = record.get(&column.name);
            let value = match coerce(column.kind, raw) {
                value if column.admits(&value) => value,
                _ => SqlValue::Null,
            };
            if value.is_null() {
                if let Some(raw) = raw {
                    nulled += 1;
                    tracing::trace!(
                        column = %column.name,
                        kind = %column.kind,
                        value = %raw,
                        "Value could not be coerced or is out of range, binding NULL"
                    );
                }
            }
            value
        })
        .collect();
    (row, nulled)
}

/// Case-insensitive "true"/"false"
fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse the leading `yyyy-MM-ddTHH:mm:ss` of a value
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let prefix = match s.char_indices().nth(TIMESTAMP_PREFIX_CHARS) {
        Some((end, _)) => &s[..end],
        None => s,
    };
    NaiveDateTime::parse_and_remainder(prefix, TIMESTAMP_FORMAT)
        .ok()
        .map(|(timestamp, _)| timestamp)
}
