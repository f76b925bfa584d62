//! Named schema registry.
//!
//! Central collection of named schema definitions for one schema-generation
//! session. Because Avro records can reference themselves (or other named
//! types that are still being defined), registration happens in two phases:
//! [`SchemaRegistry::reserve_record`] claims the name before any field is
//! resolved, and [`SchemaRegistry::attach_fields`] fills the body afterwards.
//! A field that references the enclosing record therefore resolves against
//! the reserved placeholder and becomes an [`AvroSchema::Ref`] lookup key,
//! never an ownership cycle.

use std::collections::HashMap;

use serde_json::Value;

use super::error::{SchemaError, SchemaResult};
use super::tree::{
    AvroField, AvroSchema, EnumSchema, FixedSchema, LogicalSchema, RecordSchema, UnionSchema,
};

/// Registry of named schema nodes, keyed by dotted full name.
///
/// One instance covers one schema-generation or parse session; it is never
/// implicitly shared across unrelated generations.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    nodes: HashMap<String, AvroSchema>,
    aliases: HashMap<String, String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` (full name or alias) is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Resolve a full name or alias to the canonical full name.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        match self.nodes.get_key_value(name) {
            Some((key, _)) => Some(key.as_str()),
            None => self.aliases.get(name).map(|s| s.as_str()),
        }
    }

    /// Look up a previously registered node by full name or alias.
    pub fn get(&self, name: &str) -> SchemaResult<&AvroSchema> {
        let canonical = self.canonical_name(name).ok_or_else(|| SchemaError::NotFound {
            name: name.to_string(),
        })?;
        self.nodes.get(canonical).ok_or_else(|| SchemaError::NotFound {
            name: name.to_string(),
        })
    }

    /// Register a complete named node.
    ///
    /// Re-adding an identical definition is a no-op; re-adding the same name
    /// with a structurally different definition fails.
    pub fn add(&mut self, node: AvroSchema) -> SchemaResult<()> {
        let name = node
            .full_name()
            .ok_or_else(|| SchemaError::Validation {
                message: "only named types can be registered".to_string(),
            })?
            .to_string();
        if let Some(existing) = self.nodes.get(&name) {
            if *existing == node {
                return Ok(());
            }
            return Err(SchemaError::AlreadyDefined { name });
        }
        for alias in node.aliases() {
            self.aliases.entry(alias.clone()).or_insert_with(|| name.clone());
        }
        self.nodes.insert(name, node);
        Ok(())
    }

    /// Phase one of record construction: claim the record's identity before
    /// its fields are resolved. The placeholder carries no fields yet.
    pub fn reserve_record(&mut self, record: RecordSchema) -> SchemaResult<()> {
        if let Some(existing) = self.nodes.get(&record.name) {
            return match existing {
                AvroSchema::Record(_) => Ok(()),
                _ => Err(SchemaError::AlreadyDefined { name: record.name }),
            };
        }
        let name = record.name.clone();
        for alias in &record.aliases {
            self.aliases.entry(alias.clone()).or_insert_with(|| name.clone());
        }
        self.nodes.insert(name, AvroSchema::Record(record));
        Ok(())
    }

    /// Phase two of record construction: attach the resolved field list.
    ///
    /// Filling an already-complete record with the same fields is a no-op;
    /// conflicting fields fail.
    pub fn attach_fields(&mut self, name: &str, fields: Vec<AvroField>) -> SchemaResult<AvroSchema> {
        let canonical = self
            .canonical_name(name)
            .ok_or_else(|| SchemaError::NotFound {
                name: name.to_string(),
            })?
            .to_string();
        match self.nodes.get_mut(&canonical) {
            Some(AvroSchema::Record(record)) => {
                if record.fields.is_empty() {
                    record.fields = fields;
                } else if record.fields != fields {
                    return Err(SchemaError::AlreadyDefined { name: canonical });
                }
                Ok(AvroSchema::Record(record.clone()))
            }
            _ => Err(SchemaError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Hydrate a schema tree from raw Avro-JSON, populating this registry
    /// with every named type encountered.
    pub fn parse(&mut self, raw: &Value) -> SchemaResult<AvroSchema> {
        match raw {
            Value::String(name) => self.parse_name(name),
            Value::Array(alternatives) => {
                let parsed = alternatives
                    .iter()
                    .map(|alt| self.parse(alt))
                    .collect::<SchemaResult<Vec<_>>>()?;
                Ok(AvroSchema::Union(UnionSchema::new(parsed)?))
            }
            Value::Object(obj) => self.parse_object(obj),
            other => Err(SchemaError::UnknownType {
                message: other.to_string(),
            }),
        }
    }

    fn parse_name(&self, name: &str) -> SchemaResult<AvroSchema> {
        if let Some(primitive) = AvroSchema::primitive_from_name(name) {
            return Ok(primitive);
        }
        match self.canonical_name(name) {
            Some(canonical) => Ok(AvroSchema::Ref(canonical.to_string())),
            None => Err(SchemaError::UnknownType {
                message: name.to_string(),
            }),
        }
    }

    fn parse_object(&mut self, obj: &serde_json::Map<String, Value>) -> SchemaResult<AvroSchema> {
        let type_value = obj.get("type").ok_or_else(|| SchemaError::UnknownType {
            message: Value::Object(obj.clone()).to_string(),
        })?;

        match type_value {
            Value::String(t) => match t.as_str() {
                "record" => self.parse_record(obj),
                "enum" => self.parse_enum(obj),
                "fixed" => self.parse_fixed(obj),
                "array" => {
                    let items = obj.get("items").ok_or_else(|| SchemaError::UnknownType {
                        message: "array without items".to_string(),
                    })?;
                    Ok(AvroSchema::Array(Box::new(self.parse(items)?)))
                }
                "map" => {
                    let values = obj.get("values").ok_or_else(|| SchemaError::UnknownType {
                        message: "map without values".to_string(),
                    })?;
                    Ok(AvroSchema::Map(Box::new(self.parse(values)?)))
                }
                name => {
                    let base = self.parse_name(name)?;
                    Ok(self.maybe_logical(obj, base))
                }
            },
            // A nested {"type": <schema>} shape collapses to the inner schema.
            nested => self.parse(nested),
        }
    }

    /// Wrap a base type in a logical annotation when a `logicalType` property
    /// is present. Unknown logical names are preserved as-is so the schema
    /// round-trips; decoding treats the value as the base type.
    fn maybe_logical(&self, obj: &serde_json::Map<String, Value>, base: AvroSchema) -> AvroSchema {
        match obj.get("logicalType").and_then(|v| v.as_str()) {
            Some(logical) => AvroSchema::Logical(LogicalSchema {
                base: Box::new(base),
                logical_type: logical.to_string(),
                precision: obj.get("precision").and_then(|v| v.as_u64()),
                scale: obj.get("scale").and_then(|v| v.as_u64()),
            }),
            None => base,
        }
    }

    fn full_name_of(obj: &serde_json::Map<String, Value>) -> SchemaResult<String> {
        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::UnknownType {
                message: "named type without a name".to_string(),
            })?;
        // A separate namespace attribute joins into the dotted full name.
        match obj.get("namespace").and_then(|v| v.as_str()) {
            Some(ns) if !name.contains('.') => Ok(format!("{}.{}", ns, name)),
            _ => Ok(name.to_string()),
        }
    }

    fn string_list(value: Option<&Value>) -> Vec<String> {
        value
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parse_record(&mut self, obj: &serde_json::Map<String, Value>) -> SchemaResult<AvroSchema> {
        let name = Self::full_name_of(obj)?;
        let mut record = RecordSchema::new(name.clone(), Vec::new())
            .with_aliases(Self::string_list(obj.get("aliases")));
        if let Some(doc) = obj.get("doc").and_then(|v| v.as_str()) {
            record = record.with_doc(doc);
        }
        self.reserve_record(record)?;

        let raw_fields = obj
            .get("fields")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SchemaError::UnknownType {
                message: format!("record {} without fields", name),
            })?;
        let mut fields = Vec::with_capacity(raw_fields.len());
        for raw_field in raw_fields {
            fields.push(self.parse_field(raw_field)?);
        }
        self.attach_fields(&name, fields)
    }

    fn parse_field(&mut self, raw: &Value) -> SchemaResult<AvroField> {
        let obj = raw.as_object().ok_or_else(|| SchemaError::UnknownType {
            message: raw.to_string(),
        })?;
        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::UnknownType {
                message: "field without a name".to_string(),
            })?;
        let type_value = obj.get("type").ok_or_else(|| SchemaError::UnknownType {
            message: raw.to_string(),
        })?;
        let schema = self.parse(type_value)?;
        let mut field = AvroField::new(name, schema);
        if let Some(doc) = obj.get("doc").and_then(|v| v.as_str()) {
            field = field.with_doc(doc);
        }
        if let Some(default) = obj.get("default") {
            field = field.with_default(default.clone());
        }
        Ok(field)
    }

    fn parse_enum(&mut self, obj: &serde_json::Map<String, Value>) -> SchemaResult<AvroSchema> {
        let name = Self::full_name_of(obj)?;
        let symbols = Self::string_list(obj.get("symbols"));
        let mut node = EnumSchema::new(name, symbols)
            .with_aliases(Self::string_list(obj.get("aliases")));
        if let Some(doc) = obj.get("doc").and_then(|v| v.as_str()) {
            node = node.with_doc(doc);
        }
        let schema = AvroSchema::Enum(node);
        self.add(schema.clone())?;
        Ok(schema)
    }

    fn parse_fixed(&mut self, obj: &serde_json::Map<String, Value>) -> SchemaResult<AvroSchema> {
        let name = Self::full_name_of(obj)?;
        let size = obj
            .get("size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| SchemaError::UnknownType {
                message: format!("fixed {} without size", name),
            })? as usize;
        let schema = AvroSchema::Fixed(FixedSchema::new(name, size));
        self.add(schema.clone())?;
        Ok(self.maybe_logical(obj, schema))
    }
}
