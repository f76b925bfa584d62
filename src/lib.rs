//! # avrowire
//!
//! Avro wire-format serde for Kafka-style streaming, backed by a
//! Confluent-compatible schema registry. Statically declared data-model
//! definitions are translated into Avro schemas, and those schemas drive
//! binary serialization behind the registry's self-describing wire header —
//! so independently evolving services agree on message layouts without
//! hand-writing or synchronizing schema files.
//!
//! ## Features
//!
//! - **Model-driven schemas**: declare a model's fields once; the parser
//!   produces the Avro schema, including unions, collections, enums,
//!   logical types, and self-referential records
//! - **Registry-framed messages**: every payload carries the magic byte and
//!   the 4-byte big-endian schema id, resolved lazily on first use
//! - **Compatibility-aware decoding**: payloads written under a different
//!   (compatible) schema version decode via writer-schema resolution
//! - **Pluggable registry**: an HTTP client for the real service and an
//!   in-memory registry for tests and development
//! - **Sync or async**: every network-touching call has a blocking twin
//!   that is safe to use inside or outside a running runtime
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use avrowire::{
//!     AvroCodec, FieldDescriptor, FieldValue, InMemorySchemaRegistry, ModelDescriptor,
//!     PrimitiveType, TypeShape,
//! };
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let person = ModelDescriptor::new(
//!         "com.example.Person",
//!         vec![
//!             FieldDescriptor::required("name", TypeShape::Primitive(PrimitiveType::String)),
//!             FieldDescriptor::required("age", TypeShape::Primitive(PrimitiveType::Long)),
//!         ],
//!     )
//!     .with_aliases(vec!["Person".to_string()]);
//!
//!     let registry = Arc::new(InMemorySchemaRegistry::new());
//!     let codec = AvroCodec::new(person, "people-value", registry)?;
//!
//!     let mut record = HashMap::new();
//!     record.insert("name".to_string(), FieldValue::String("Ada".to_string()));
//!     record.insert("age".to_string(), FieldValue::Integer(36));
//!
//!     let framed = codec.encode(&record).await?;
//!     assert_eq!(codec.decode(&framed).await?, record);
//!     Ok(())
//! }
//! ```

pub mod avrowire;

// Re-export the main API at the crate root for easy access
pub use avrowire::client::bridge::block_on;
pub use avrowire::client::{
    AuthConfig, ClientResult, ConfluentSchemaRegistryClient, InMemorySchemaRegistry,
    RegistryClientConfig, RegistryClientError, SchemaCache, SchemaRegistryApi,
};
pub use avrowire::model::{
    AvroModel, DescriptorFn, EnumDescriptor, FieldDescriptor, LogicalKind, ModelDescriptor,
    PrimitiveType, TypeShape,
};
pub use avrowire::schema::{
    AvroField, AvroSchema, EnumSchema, FixedSchema, LogicalSchema, RecordSchema, SchemaError,
    SchemaRegistry, SchemaResult, UnionSchema,
};
pub use avrowire::serialization::{
    AvroCodec, CodecConfig, FieldValue, MessageCodec, SerializationError, TopicSerde, HEADER_LEN,
    MAGIC_BYTE,
};
