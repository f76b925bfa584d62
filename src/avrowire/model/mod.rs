//! Declared data-model interface
//!
//! Models enter the crate exclusively through this metadata layer: a
//! [`ModelDescriptor`] names the model and lists its fields, and every
//! field's declared type is one of the closed set of [`TypeShape`]
//! categories. The shape set is derived once per model declaration, not
//! re-inspected per call.
//!
//! A model that references itself (or another model that references it back)
//! expresses the reference as a descriptor function — the indirection that
//! lets declaration metadata stay acyclic while the parser terminates the
//! cycle through the registry.

pub mod parser;

use serde_json::Value;

/// Function returning a model's descriptor; used for (possibly recursive)
/// model-to-model references inside field shapes.
pub type DescriptorFn = fn() -> ModelDescriptor;

/// The declared type of a model field, as one of a closed set of categories.
#[derive(Debug, Clone)]
pub enum TypeShape {
    /// One of the eight Avro primitive kinds.
    Primitive(PrimitiveType),
    /// A date/time/uuid logical source type with a fixed physical mapping.
    Logical(LogicalKind),
    /// An arbitrary-precision decimal with optional declared bounds.
    Decimal {
        max_digits: Option<u32>,
        max_decimal_places: Option<u32>,
    },
    /// A nested (or self-referential) record model.
    Model(DescriptorFn),
    /// An enumeration with symbols in declaration order.
    Enum(EnumDescriptor),
    /// Sugar for `Union[null, inner]` with a null default allowed.
    Optional(Box<TypeShape>),
    /// A union of alternatives in declaration order.
    Union(Vec<TypeShape>),
    /// A sequence of homogeneous elements.
    Sequence(Box<TypeShape>),
    /// A mapping; Avro requires string keys.
    Mapping {
        keys: Box<TypeShape>,
        values: Box<TypeShape>,
    },
}

/// Avro primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

/// Logical source types with fixed, non-configurable physical mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKind {
    /// Days since the Unix epoch, `int`/`date`.
    Date,
    /// Milliseconds since midnight, `int`/`time-millis`.
    TimeMillis,
    /// Microseconds since midnight, `long`/`time-micros`.
    TimeMicros,
    /// Milliseconds since the Unix epoch, `long`/`timestamp-millis`.
    TimestampMillis,
    /// Microseconds since the Unix epoch, `long`/`timestamp-micros`.
    TimestampMicros,
    /// RFC 4122 string, `string`/`uuid`.
    Uuid,
}

/// Declaration metadata for a record model.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Dotted full name used as the Avro record name.
    pub name: String,
    /// Alternate names accepted for lookup and compatibility.
    pub aliases: Vec<String>,
    pub doc: Option<String>,
    /// The declaring host type, for diagnostics.
    pub rust_type: Option<&'static str>,
    /// Ordered field declarations.
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            doc: None,
            rust_type: None,
            fields,
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

    pub fn with_rust_type(mut self, rust_type: &'static str) -> Self {
        self.rust_type = Some(rust_type);
        self
    }
}

/// One declared field of a model.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub shape: TypeShape,
    pub required: bool,
    /// Declared default, present for optional fields.
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// A required field: no default, always present on the wire.
    pub fn required(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
            default: None,
        }
    }

    /// An optional field carrying an explicit declared default.
    pub fn optional(name: impl Into<String>, shape: TypeShape, default: Value) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
            default: Some(default),
        }
    }
}

/// Declaration metadata for an enumeration type.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    /// Dotted full name (module-style path).
    pub name: String,
    pub aliases: Vec<String>,
    pub doc: Option<String>,
    /// Symbols in declaration order.
    pub symbols: Vec<String>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>, symbols: Vec<&str>) -> Self {
        let name = name.into();
        let aliases = name
            .rsplit('.')
            .next()
            .filter(|short| *short != name)
            .map(|short| vec![short.to_string()])
            .unwrap_or_default();
        Self {
            name,
            aliases,
            doc: None,
            symbols: symbols.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A type that declares an Avro record model.
pub trait AvroModel {
    /// The model's declaration metadata.
    fn descriptor() -> ModelDescriptor;

    /// Generate this model's Avro schema against a registry session.
    fn schema(registry: &mut crate::avrowire::schema::SchemaRegistry) -> crate::avrowire::schema::SchemaResult<crate::avrowire::schema::AvroSchema>
    where
        Self: Sized,
    {
        parser::parse_model(registry, Self::descriptor())
    }
}
