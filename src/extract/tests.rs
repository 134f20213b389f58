//! Tests for record extraction

use super::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn text(s: &str) -> RawValue {
    RawValue::Text(s.to_string())
}

// ============================================================================
// Discriminator Tests
// ============================================================================

#[test]
fn test_parse_entity_type_with_version_suffix() {
    assert_eq!(
        parse_entity_type("Namespace.FooBarX, Version=1.0"),
        Some("foobar".to_string())
    );
}

#[test]
fn test_parse_entity_type_assembly_suffix() {
    assert_eq!(
        parse_entity_type("SensusService.Probes.Location.LocationDatumX, SensusiOS"),
        Some("locationdatum".to_string())
    );
    assert_eq!(parse_entity_type("X.FooY, v1"), Some("foo".to_string()));
}

#[test]
fn test_parse_entity_type_without_namespace() {
    assert_eq!(parse_entity_type("BatteryX"), Some("battery".to_string()));
}

#[test]
fn test_parse_entity_type_degenerate() {
    assert_eq!(parse_entity_type(""), None);
    assert_eq!(parse_entity_type("   , v1"), None);
    assert_eq!(parse_entity_type("Namespace.X, v1"), None);
}

// ============================================================================
// Key Policy Tests
// ============================================================================

#[test]
fn test_classify_key() {
    assert_eq!(classify_key("$type"), KeyRule::Discriminator);
    assert_eq!(classify_key("On"), KeyRule::Reserved(&RESERVED_KEYS[0]));
    assert_eq!(classify_key("on"), KeyRule::Column("on".to_string()));
    assert_eq!(classify_key("ON"), KeyRule::Column("on".to_string()));
    assert_eq!(
        classify_key("DeviceId"),
        KeyRule::Column("deviceid".to_string())
    );
}

#[test]
fn test_value_decode() {
    use serde_json::json;

    assert_eq!(ValueDecode::Text.apply(&json!("abc")), Some(text("abc")));
    assert_eq!(ValueDecode::Text.apply(&json!(42)), Some(text("42")));
    assert_eq!(ValueDecode::Text.apply(&json!(1.5)), Some(text("1.5")));
    assert_eq!(ValueDecode::Text.apply(&json!(true)), Some(text("true")));
    assert_eq!(ValueDecode::Text.apply(&json!(null)), None);
    assert_eq!(
        ValueDecode::Text.apply(&json!({"a": 1})),
        Some(text(r#"{"a":1}"#))
    );

    assert_eq!(
        ValueDecode::Boolean.apply(&json!("TRUE")),
        Some(RawValue::Bool(true))
    );
    assert_eq!(
        ValueDecode::Boolean.apply(&json!(true)),
        Some(RawValue::Bool(true))
    );
    assert_eq!(
        ValueDecode::Boolean.apply(&json!("nope")),
        Some(RawValue::Bool(false))
    );
}

// ============================================================================
// Extraction Tests
// ============================================================================

#[test]
fn test_extract_skips_nulls() {
    let bytes = br#"[{"$type":"X.FooY, v1","Name":"a","On":"true"},null,{"$type":"X.FooY, v1","Name":"b","On":"false"}]"#;
    let records = extract_records("foo.json", bytes).unwrap();

    let expected = vec![
        RawRecord {
            entity_type: Some("foo".to_string()),
            fields: BTreeMap::from([
                ("ison".to_string(), RawValue::Bool(true)),
                ("name".to_string(), text("a")),
            ]),
        },
        RawRecord {
            entity_type: Some("foo".to_string()),
            fields: BTreeMap::from([
                ("ison".to_string(), RawValue::Bool(false)),
                ("name".to_string(), text("b")),
            ]),
        },
    ];
    assert_eq!(records, expected);
}

#[test]
fn test_discriminator_never_becomes_a_column() {
    let bytes = br#"[{"$type":"A.LocationDatumX, B","Latitude":12.5}]"#;
    let records = extract_records("loc.json", bytes).unwrap();

    assert_eq!(records[0].get("$type"), None);
    assert_eq!(records[0].get("type"), None);
    assert_eq!(records[0].get("latitude"), Some(&text("12.5")));
}

#[test]
fn test_lowercase_on_is_generic() {
    let bytes = br#"[{"$type":"A.ScreenDatumX, B","on":"true"}]"#;
    let records = extract_records("screen.json", bytes).unwrap();

    assert_eq!(records[0].get("on"), Some(&text("true")));
    assert_eq!(records[0].get("ison"), None);
}

#[test]
fn test_missing_discriminator() {
    let bytes = br#"[{"Name":"a"}]"#;
    let records = extract_records("x.json", bytes).unwrap();
    assert_eq!(records[0].entity_type, None);
    assert_eq!(records[0].get("name"), Some(&text("a")));
}

#[test]
fn test_empty_key_dropped_and_null_values_absent() {
    let bytes = br#"[{"$type":"A.FooX, B","":"x","Missing":null}]"#;
    let records = extract_records("x.json", bytes).unwrap();
    assert!(records[0].fields.is_empty());
}

#[test]
fn test_byte_order_mark_is_ignored() {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(br#"[{"$type":"A.FooX, B","Id":"1"}]"#);
    let records = extract_records("bom.json", &bytes).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_extraction_is_pure() {
    let bytes = br#"[{"$type":"A.FooX, B","Id":"1","Timestamp":"2016-06-01T10:00:00.123Z"},null,{"$type":"A.FooX, B","Id":"2"}]"#;
    let first = extract_records("x.json", bytes).unwrap();
    let second = extract_records("x.json", bytes).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_array() {
    assert!(extract_records("x.json", b"[]").unwrap().is_empty());
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_malformed_json_fails_file() {
    let err = extract_records("broken.json", br#"[{"$type": "#).unwrap_err();
    assert!(matches!(err, crate::Error::Parse { ref file, .. } if file == "broken.json"));
}

#[test]
fn test_non_array_root_fails_file() {
    let err = extract_records("obj.json", br#"{"$type":"A.FooX, B"}"#).unwrap_err();
    assert!(err.to_string().contains("expected a JSON array"));
}

#[test]
fn test_non_object_element_fails_file() {
    let err = extract_records("x.json", br#"[{"Id":"1"}, 42]"#).unwrap_err();
    assert!(err.to_string().contains("element 1 is a number"));
}

#[test]
fn test_invalid_utf8_fails_file() {
    let err = extract_records("x.json", b"[\"\xFF\"]").unwrap_err();
    assert!(matches!(err, crate::Error::Parse { .. }));
}
