//! Avro schema tree.
//!
//! Immutable value types for Avro type nodes and their canonical Avro-JSON
//! rendering. Named types (records, enums, fixeds) carry a dotted full name
//! as identity; recursive references between named types are expressed with
//! [`AvroSchema::Ref`], a by-name lookup key into the
//! [`SchemaRegistry`](super::registry::SchemaRegistry) rather than an owning
//! pointer.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

/// An Avro schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    // Primitive types
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,

    // Complex types
    Record(RecordSchema),
    Enum(EnumSchema),
    Array(Box<AvroSchema>),
    Map(Box<AvroSchema>),
    Union(UnionSchema),
    Fixed(FixedSchema),

    /// A logical type annotation over a physical base type.
    Logical(LogicalSchema),

    /// A by-name reference to a named type held by the registry.
    Ref(String),
}

impl AvroSchema {
    /// Parse a primitive type name, if it is one.
    pub fn primitive_from_name(name: &str) -> Option<AvroSchema> {
        match name {
            "null" => Some(AvroSchema::Null),
            "boolean" => Some(AvroSchema::Boolean),
            "int" => Some(AvroSchema::Int),
            "long" => Some(AvroSchema::Long),
            "float" => Some(AvroSchema::Float),
            "double" => Some(AvroSchema::Double),
            "bytes" => Some(AvroSchema::Bytes),
            "string" => Some(AvroSchema::String),
            _ => None,
        }
    }

    /// The full name of this node if it is a named type or a reference.
    pub fn full_name(&self) -> Option<&str> {
        match self {
            AvroSchema::Record(r) => Some(&r.name),
            AvroSchema::Enum(e) => Some(&e.name),
            AvroSchema::Fixed(x) => Some(&x.name),
            AvroSchema::Logical(l) => l.base.full_name(),
            AvroSchema::Ref(name) => Some(name),
            _ => None,
        }
    }

    /// Aliases of this node if it is a named type.
    pub fn aliases(&self) -> &[String] {
        match self {
            AvroSchema::Record(r) => &r.aliases,
            AvroSchema::Enum(e) => &e.aliases,
            _ => &[],
        }
    }

    /// Render this schema to its canonical Avro-JSON form.
    ///
    /// Each named type is rendered in full at its first occurrence within one
    /// call; later occurrences (including recursive references) render as the
    /// bare full name.
    pub fn to_avro(&self) -> Value {
        let mut seen = HashSet::new();
        self.render(&mut seen)
    }

    fn render(&self, seen: &mut HashSet<String>) -> Value {
        match self {
            AvroSchema::Null => json!("null"),
            AvroSchema::Boolean => json!("boolean"),
            AvroSchema::Int => json!("int"),
            AvroSchema::Long => json!("long"),
            AvroSchema::Float => json!("float"),
            AvroSchema::Double => json!("double"),
            AvroSchema::Bytes => json!("bytes"),
            AvroSchema::String => json!("string"),
            AvroSchema::Record(r) => r.render(seen),
            AvroSchema::Enum(e) => e.render(seen),
            AvroSchema::Array(items) => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("array"));
                obj.insert("items".to_string(), items.render(seen));
                Value::Object(obj)
            }
            AvroSchema::Map(values) => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("map"));
                obj.insert("values".to_string(), values.render(seen));
                Value::Object(obj)
            }
            AvroSchema::Union(u) => {
                Value::Array(u.alternatives.iter().map(|s| s.render(seen)).collect())
            }
            AvroSchema::Fixed(x) => x.render(seen),
            AvroSchema::Logical(l) => l.render(seen),
            AvroSchema::Ref(name) => json!(name),
        }
    }
}

/// Schema for a record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    /// Dotted full name, unique within a registry.
    pub name: String,
    /// Alternate names accepted during lookup and compatibility checks.
    pub aliases: Vec<String>,
    pub doc: Option<String>,
    pub fields: Vec<AvroField>,
    /// The declaring host type, when the record was built from a model.
    pub origin: Option<&'static str>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>, fields: Vec<AvroField>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            doc: None,
            fields,
            origin: None,
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    fn render(&self, seen: &mut HashSet<String>) -> Value {
        if !seen.insert(self.name.clone()) {
            return json!(&self.name);
        }
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("record"));
        obj.insert("name".to_string(), json!(&self.name));
        if !self.aliases.is_empty() {
            obj.insert("aliases".to_string(), json!(&self.aliases));
        }
        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }
        let fields: Vec<Value> = self.fields.iter().map(|f| f.render(seen)).collect();
        obj.insert("fields".to_string(), Value::Array(fields));
        Value::Object(obj)
    }
}

// Structural equality ignores documentation and the host-type tag.
impl PartialEq for RecordSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.aliases == other.aliases && self.fields == other.fields
    }
}

/// A single field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct AvroField {
    pub name: String,
    pub schema: AvroSchema,
    /// `None` means no default; `Some(Value::Null)` is an explicit null default.
    pub default: Option<Value>,
    pub doc: Option<String>,
}

impl AvroField {
    pub fn new(name: impl Into<String>, schema: AvroSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            doc: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    fn render(&self, seen: &mut HashSet<String>) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), self.schema.render(seen));
        obj.insert("name".to_string(), json!(&self.name));
        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }
        if let Some(default) = &self.default {
            obj.insert("default".to_string(), default.clone());
        }
        Value::Object(obj)
    }
}

/// Schema for an enumeration type.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    pub name: String,
    pub aliases: Vec<String>,
    pub doc: Option<String>,
    pub symbols: Vec<String>,
}

impl EnumSchema {
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            doc: None,
            symbols,
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// The index of a symbol, used for binary enum encoding.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    fn render(&self, seen: &mut HashSet<String>) -> Value {
        if !seen.insert(self.name.clone()) {
            return json!(&self.name);
        }
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("enum"));
        obj.insert("name".to_string(), json!(&self.name));
        if !self.aliases.is_empty() {
            obj.insert("aliases".to_string(), json!(&self.aliases));
        }
        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }
        obj.insert("symbols".to_string(), json!(&self.symbols));
        Value::Object(obj)
    }
}

impl PartialEq for EnumSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.aliases == other.aliases && self.symbols == other.symbols
    }
}

/// Schema for a fixed-size byte array.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: String,
    pub size: usize,
}

impl FixedSchema {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    fn render(&self, seen: &mut HashSet<String>) -> Value {
        if !seen.insert(self.name.clone()) {
            return json!(&self.name);
        }
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("fixed"));
        obj.insert("name".to_string(), json!(&self.name));
        obj.insert("size".to_string(), json!(self.size));
        Value::Object(obj)
    }
}

/// A union of alternative schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    pub alternatives: Vec<AvroSchema>,
}

impl UnionSchema {
    /// Build a union, checking the structural invariants: at most one null
    /// alternative and no two alternatives sharing a full name.
    pub fn new(alternatives: Vec<AvroSchema>) -> Result<Self, super::error::SchemaError> {
        let mut names = HashSet::new();
        let mut nulls = 0usize;
        for alt in &alternatives {
            if matches!(alt, AvroSchema::Null) {
                nulls += 1;
            }
            if let Some(name) = alt.full_name() {
                if !names.insert(name.to_string()) {
                    return Err(super::error::SchemaError::Validation {
                        message: format!("union contains duplicate named type {}", name),
                    });
                }
            }
        }
        if nulls > 1 {
            return Err(super::error::SchemaError::Validation {
                message: "union contains more than one null alternative".to_string(),
            });
        }
        Ok(Self { alternatives })
    }

    /// The index of the null alternative, if any.
    pub fn null_index(&self) -> Option<usize> {
        self.alternatives
            .iter()
            .position(|s| matches!(s, AvroSchema::Null))
    }
}

/// A logical type wrapper: a physical base type plus a semantic tag.
///
/// Unrecognized logical names are preserved so they round-trip through
/// render/parse; decoding falls back to the base physical type.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalSchema {
    pub base: Box<AvroSchema>,
    pub logical_type: String,
    pub precision: Option<u64>,
    pub scale: Option<u64>,
}

impl LogicalSchema {
    pub fn new(base: AvroSchema, logical_type: impl Into<String>) -> Self {
        Self {
            base: Box::new(base),
            logical_type: logical_type.into(),
            precision: None,
            scale: None,
        }
    }

    pub fn decimal(base: AvroSchema, precision: u64, scale: Option<u64>) -> Self {
        Self {
            base: Box::new(base),
            logical_type: "decimal".to_string(),
            precision: Some(precision),
            scale,
        }
    }

    /// The effective decimal scale; Avro treats a missing scale as 0.
    pub fn effective_scale(&self) -> u32 {
        self.scale.unwrap_or(0) as u32
    }

    fn render(&self, seen: &mut HashSet<String>) -> Value {
        let base = self.base.render(seen);
        let mut obj = match base {
            Value::Object(m) => m,
            Value::String(name) => {
                let mut m = Map::new();
                m.insert("type".to_string(), json!(name));
                m
            }
            other => {
                let mut m = Map::new();
                m.insert("type".to_string(), other);
                m
            }
        };
        obj.insert("logicalType".to_string(), json!(&self.logical_type));
        if let Some(precision) = self.precision {
            obj.insert("precision".to_string(), json!(precision));
        }
        if let Some(scale) = self.scale {
            obj.insert("scale".to_string(), json!(scale));
        }
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_render() {
        assert_eq!(AvroSchema::Null.to_avro(), json!("null"));
        assert_eq!(AvroSchema::String.to_avro(), json!("string"));
    }

    #[test]
    fn test_record_render_order() {
        let record = RecordSchema::new(
            "com.example.LogMessage",
            vec![
                AvroField::new("fmt", AvroSchema::String),
                AvroField::new("data", AvroSchema::Map(Box::new(AvroSchema::String))),
            ],
        )
        .with_aliases(vec!["LogMessage".to_string()]);

        let rendered = serde_json::to_string(&AvroSchema::Record(record).to_avro()).unwrap();
        assert_eq!(
            rendered,
            r#"{"type":"record","name":"com.example.LogMessage","aliases":["LogMessage"],"fields":[{"type":"string","name":"fmt"},{"type":{"type":"map","values":"string"},"name":"data"}]}"#
        );
    }

    #[test]
    fn test_recursive_record_renders_name_reference() {
        let record = RecordSchema::new(
            "Recursive",
            vec![AvroField::new(
                "inner",
                AvroSchema::Union(
                    UnionSchema::new(vec![
                        AvroSchema::Null,
                        AvroSchema::Ref("Recursive".to_string()),
                    ])
                    .unwrap(),
                ),
            )],
        );
        let avro = AvroSchema::Record(record).to_avro();
        assert_eq!(avro["fields"][0]["type"], json!(["null", "Recursive"]));
    }

    #[test]
    fn test_equality_ignores_doc() {
        let a = EnumSchema::new("Colors", vec!["red".into(), "green".into()]);
        let b = EnumSchema::new("Colors", vec!["red".into(), "green".into()])
            .with_doc("An enumeration.");
        assert_eq!(a, b);

        let c = EnumSchema::new("Colors", vec!["red".into(), "blue".into()]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_union_rejects_duplicate_named_types() {
        let a = AvroSchema::Record(RecordSchema::new("Dup", vec![]));
        let b = AvroSchema::Ref("Dup".to_string());
        assert!(UnionSchema::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_logical_render() {
        let date = LogicalSchema::new(AvroSchema::Int, "date");
        assert_eq!(
            AvroSchema::Logical(date).to_avro(),
            json!({"type": "int", "logicalType": "date"})
        );

        let usd = LogicalSchema::decimal(AvroSchema::Bytes, 22, Some(2));
        assert_eq!(
            AvroSchema::Logical(usd).to_avro(),
            json!({"type": "bytes", "logicalType": "decimal", "precision": 22, "scale": 2})
        );
    }
}
