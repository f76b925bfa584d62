//! Round-trip and identity tests for the schema tree and registry.

use avrowire::{SchemaError, SchemaRegistry};
use serde_json::{json, Value};

/// Parse raw Avro-JSON and render it back; shape-stable inputs must come
/// back byte-for-byte equal.
fn assert_roundtrip(raw: Value) {
    let mut registry = SchemaRegistry::new();
    let schema = registry.parse(&raw).expect("parse failed");
    assert_eq!(schema.to_avro(), raw, "round-trip mismatch for {}", raw);
}

#[test]
fn test_primitive_roundtrip() {
    for name in [
        "null", "boolean", "int", "long", "float", "double", "bytes", "string",
    ] {
        assert_roundtrip(json!(name));
    }
}

#[test]
fn test_complex_roundtrip() {
    assert_roundtrip(json!({
        "type": "record",
        "name": "Posting",
        "fields": [{"type": "boolean", "name": "active", "default": true}]
    }));
    assert_roundtrip(json!({
        "type": "enum",
        "name": "TruckType",
        "symbols": ["VAN", "REEFER", "FLATBED"]
    }));
    assert_roundtrip(json!({"type": "array", "items": "string"}));
    assert_roundtrip(json!({"type": "map", "values": "boolean"}));
    assert_roundtrip(json!({"type": "fixed", "name": "uuidish", "size": 16}));
    assert_roundtrip(json!(["null", "int"]));
}

#[test]
fn test_logical_roundtrip() {
    assert_roundtrip(json!({"type": "string", "logicalType": "uuid"}));
    assert_roundtrip(json!({"type": "int", "logicalType": "date"}));
    assert_roundtrip(json!({"type": "int", "logicalType": "time-millis"}));
    assert_roundtrip(json!({"type": "long", "logicalType": "time-micros"}));
    assert_roundtrip(json!({"type": "long", "logicalType": "timestamp-millis"}));
    assert_roundtrip(json!({"type": "long", "logicalType": "timestamp-micros"}));
    assert_roundtrip(json!({
        "type": "fixed", "name": "duration", "size": 12, "logicalType": "duration"
    }));
    assert_roundtrip(json!({
        "type": "bytes", "logicalType": "decimal", "precision": 4, "scale": 2
    }));
}

#[test]
fn test_unknown_logical_type_is_preserved() {
    assert_roundtrip(json!({"type": "string", "logicalType": "unknown"}));
}

#[test]
fn test_nested_type_object_collapses() {
    // {"type": "null"} and the doubly nested variant collapse to the
    // primitive; render(parse(render(s))) is then stable.
    for raw in [json!({"type": "null"}), json!({"type": {"type": "null"}})] {
        let mut registry = SchemaRegistry::new();
        let first = registry.parse(&raw).unwrap().to_avro();
        assert_eq!(first, json!("null"));

        let mut second_registry = SchemaRegistry::new();
        let second = second_registry.parse(&first).unwrap().to_avro();
        assert_eq!(second, first);
    }
}

#[test]
fn test_recursive_record_roundtrip() {
    let raw = json!({
        "type": "record",
        "name": "Recursive",
        "fields": [{"type": ["null", "Recursive"], "name": "inner"}]
    });
    let mut registry = SchemaRegistry::new();
    let schema = registry.parse(&raw).unwrap();
    assert_eq!(schema.to_avro(), raw);
    assert!(registry.contains("Recursive"));
}

#[test]
fn test_named_types_are_registered() {
    let mut registry = SchemaRegistry::new();
    registry
        .parse(&json!({
            "type": "record",
            "name": "TruckPosting",
            "fields": [
                {"type": "string", "name": "origin", "doc": "Origin location (city, state)"},
                {"type": ["null", "string"], "name": "dest"},
                {"type": {"type": "enum", "name": "TruckType", "symbols": ["VAN", "REEFER", "FLATBED"]}, "name": "type"}
            ]
        }))
        .unwrap();
    assert!(registry.contains("TruckPosting"));
    assert!(registry.contains("TruckType"));
}

#[test]
fn test_reparsing_identical_schema_is_silent() {
    let raw = json!({
        "type": "enum",
        "name": "Suit",
        "symbols": ["SPADES", "HEARTS", "DIAMONDS", "CLUBS"]
    });
    let mut registry = SchemaRegistry::new();
    registry.parse(&raw).unwrap();
    registry.parse(&raw).unwrap();
    assert!(registry.contains("Suit"));
}

#[test]
fn test_conflicting_redefinition_fails() {
    let mut registry = SchemaRegistry::new();
    registry
        .parse(&json!({"type": "enum", "name": "Dupe", "symbols": ["DU", "PLI", "CATE"]}))
        .unwrap();
    let err = registry
        .parse(&json!({"type": "enum", "name": "Dupe", "symbols": ["Dept", "of", "Redundancy"]}))
        .unwrap_err();
    assert!(matches!(err, SchemaError::AlreadyDefined { .. }));
}

#[test]
fn test_garbage_shapes_fail() {
    let mut registry = SchemaRegistry::new();
    for raw in [
        json!(42),
        json!(true),
        Value::Null,
        json!({"type": "rabbit_of_caerbannog"}),
        json!({"items": "string"}),
    ] {
        let err = registry.parse(&raw).unwrap_err();
        assert!(
            matches!(err, SchemaError::UnknownType { .. }),
            "expected UnknownType for {}",
            raw
        );
    }
}
