//! Model-to-schema parser.
//!
//! Walks a model's declared field shapes and builds an Avro schema tree
//! through a registry session. Records are registered by name before their
//! fields are resolved, so a field referencing the enclosing model resolves
//! to a by-name reference instead of recursing forever.

use serde_json::Value;

use crate::avrowire::schema::{
    AvroField, AvroSchema, EnumSchema, LogicalSchema, RecordSchema, SchemaError, SchemaRegistry,
    SchemaResult, UnionSchema,
};

use super::{EnumDescriptor, FieldDescriptor, LogicalKind, ModelDescriptor, PrimitiveType, TypeShape};

/// Default decimal precision when the model declares no digit bound,
/// matching the default numeric-context precision of the source models.
const DEFAULT_DECIMAL_PRECISION: u64 = 28;

/// Resolve a declared type shape to a schema node.
pub fn parse(registry: &mut SchemaRegistry, shape: &TypeShape) -> SchemaResult<AvroSchema> {
    match shape {
        TypeShape::Primitive(p) => Ok(parse_primitive(*p)),
        TypeShape::Logical(kind) => Ok(parse_logical(*kind)),
        TypeShape::Decimal {
            max_digits,
            max_decimal_places,
        } => Ok(parse_decimal(*max_digits, *max_decimal_places)),
        TypeShape::Model(descriptor) => parse_model(registry, descriptor()),
        TypeShape::Enum(descriptor) => parse_enum(registry, descriptor),
        TypeShape::Optional(inner) => {
            parse_union(registry, &[TypeShape::Primitive(PrimitiveType::Null), (**inner).clone()])
        }
        TypeShape::Union(alternatives) => parse_union(registry, alternatives),
        TypeShape::Sequence(element) => {
            Ok(AvroSchema::Array(Box::new(parse(registry, element)?)))
        }
        TypeShape::Mapping { keys, values } => parse_mapping(registry, keys, values),
    }
}

fn parse_primitive(primitive: PrimitiveType) -> AvroSchema {
    match primitive {
        PrimitiveType::Null => AvroSchema::Null,
        PrimitiveType::Boolean => AvroSchema::Boolean,
        PrimitiveType::Int => AvroSchema::Int,
        PrimitiveType::Long => AvroSchema::Long,
        PrimitiveType::Float => AvroSchema::Float,
        PrimitiveType::Double => AvroSchema::Double,
        PrimitiveType::Bytes => AvroSchema::Bytes,
        PrimitiveType::String => AvroSchema::String,
    }
}

/// Logical source types carry fixed physical mappings.
fn parse_logical(kind: LogicalKind) -> AvroSchema {
    let logical = match kind {
        LogicalKind::Date => LogicalSchema::new(AvroSchema::Int, "date"),
        LogicalKind::TimeMillis => LogicalSchema::new(AvroSchema::Int, "time-millis"),
        LogicalKind::TimeMicros => LogicalSchema::new(AvroSchema::Long, "time-micros"),
        LogicalKind::TimestampMillis => LogicalSchema::new(AvroSchema::Long, "timestamp-millis"),
        LogicalKind::TimestampMicros => LogicalSchema::new(AvroSchema::Long, "timestamp-micros"),
        LogicalKind::Uuid => LogicalSchema::new(AvroSchema::String, "uuid"),
    };
    AvroSchema::Logical(logical)
}

/// Decimals encode as `bytes`; precision covers the declared digits plus the
/// declared decimal places.
fn parse_decimal(max_digits: Option<u32>, max_decimal_places: Option<u32>) -> AvroSchema {
    let scale = max_decimal_places.map(u64::from);
    let precision = match max_digits {
        Some(digits) => u64::from(digits) + scale.unwrap_or(0),
        None => DEFAULT_DECIMAL_PRECISION,
    };
    AvroSchema::Logical(LogicalSchema::decimal(AvroSchema::Bytes, precision, scale))
}

/// Resolve a record model. If the model's name is already registered, the
/// existing definition wins and a by-name reference is returned — this both
/// terminates self-reference cycles and deduplicates shared nested models.
pub fn parse_model(
    registry: &mut SchemaRegistry,
    descriptor: ModelDescriptor,
) -> SchemaResult<AvroSchema> {
    if let Some(canonical) = registry.canonical_name(&descriptor.name) {
        return Ok(AvroSchema::Ref(canonical.to_string()));
    }

    let mut record = RecordSchema::new(descriptor.name.clone(), Vec::new())
        .with_aliases(descriptor.aliases.clone());
    if let Some(doc) = &descriptor.doc {
        record = record.with_doc(doc.clone());
    }
    record.origin = descriptor.rust_type;
    registry.reserve_record(record)?;

    let mut fields = Vec::with_capacity(descriptor.fields.len());
    for field in &descriptor.fields {
        fields.push(parse_field(registry, field)?);
    }
    registry.attach_fields(&descriptor.name, fields)
}

fn parse_field(registry: &mut SchemaRegistry, field: &FieldDescriptor) -> SchemaResult<AvroField> {
    let schema = parse(registry, &field.shape)?;
    let mut avro_field = AvroField::new(field.name.clone(), schema);
    if !field.required {
        avro_field = avro_field.with_default(field.default.clone().unwrap_or(Value::Null));
    }
    Ok(avro_field)
}

/// Enums are named types; the declaration-order symbol list is preserved.
fn parse_enum(registry: &mut SchemaRegistry, descriptor: &EnumDescriptor) -> SchemaResult<AvroSchema> {
    let mut node = EnumSchema::new(descriptor.name.clone(), descriptor.symbols.clone())
        .with_aliases(descriptor.aliases.clone());
    if let Some(doc) = &descriptor.doc {
        node = node.with_doc(doc.clone());
    }
    let schema = AvroSchema::Enum(node);
    registry.add(schema.clone())?;
    Ok(schema)
}

/// Avro requires the default-bearing branch first, so a null alternative is
/// moved to the front and duplicate nulls collapse to one.
fn parse_union(registry: &mut SchemaRegistry, alternatives: &[TypeShape]) -> SchemaResult<AvroSchema> {
    let mut resolved = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        resolved.push(parse(registry, alternative)?);
    }
    let has_null = resolved.iter().any(|s| matches!(s, AvroSchema::Null));
    if has_null {
        resolved.retain(|s| !matches!(s, AvroSchema::Null));
        resolved.insert(0, AvroSchema::Null);
    }
    Ok(AvroSchema::Union(UnionSchema::new(resolved)?))
}

fn parse_mapping(
    registry: &mut SchemaRegistry,
    keys: &TypeShape,
    values: &TypeShape,
) -> SchemaResult<AvroSchema> {
    if !matches!(keys, TypeShape::Primitive(PrimitiveType::String)) {
        return Err(SchemaError::NonStringMapKey {
            message: format!("mapping with {:?} keys", keys),
        });
    }
    Ok(AvroSchema::Map(Box::new(parse(registry, values)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_union_null_moves_first_and_collapses() {
        let mut registry = SchemaRegistry::new();
        let shape = TypeShape::Union(vec![
            TypeShape::Primitive(PrimitiveType::String),
            TypeShape::Primitive(PrimitiveType::Null),
            TypeShape::Primitive(PrimitiveType::Null),
        ]);
        let schema = parse(&mut registry, &shape).unwrap();
        assert_eq!(schema.to_avro(), json!(["null", "string"]));
    }

    #[test]
    fn test_mapping_requires_string_keys() {
        let mut registry = SchemaRegistry::new();
        let shape = TypeShape::Mapping {
            keys: Box::new(TypeShape::Primitive(PrimitiveType::Long)),
            values: Box::new(TypeShape::Primitive(PrimitiveType::Long)),
        };
        let err = parse(&mut registry, &shape).unwrap_err();
        assert!(matches!(err, SchemaError::NonStringMapKey { .. }));
    }

    #[test]
    fn test_decimal_precision_derivation() {
        let mut registry = SchemaRegistry::new();
        let bounded = parse(
            &mut registry,
            &TypeShape::Decimal {
                max_digits: Some(20),
                max_decimal_places: Some(2),
            },
        )
        .unwrap();
        assert_eq!(
            bounded.to_avro(),
            json!({"type": "bytes", "logicalType": "decimal", "precision": 22, "scale": 2})
        );

        let unbounded = parse(
            &mut registry,
            &TypeShape::Decimal {
                max_digits: None,
                max_decimal_places: None,
            },
        )
        .unwrap();
        assert_eq!(
            unbounded.to_avro(),
            json!({"type": "bytes", "logicalType": "decimal", "precision": 28})
        );
    }

    #[test]
    fn test_logical_mappings() {
        let mut registry = SchemaRegistry::new();
        for (kind, expected) in [
            (LogicalKind::Date, json!({"type": "int", "logicalType": "date"})),
            (
                LogicalKind::TimeMicros,
                json!({"type": "long", "logicalType": "time-micros"}),
            ),
            (
                LogicalKind::TimestampMicros,
                json!({"type": "long", "logicalType": "timestamp-micros"}),
            ),
            (
                LogicalKind::Uuid,
                json!({"type": "string", "logicalType": "uuid"}),
            ),
        ] {
            let schema = parse(&mut registry, &TypeShape::Logical(kind)).unwrap();
            assert_eq!(schema.to_avro(), expected);
        }
    }
}
