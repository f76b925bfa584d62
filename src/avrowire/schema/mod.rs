//! Avro schema data model
//!
//! The schema tree ([`tree`]) holds immutable Avro type nodes and renders
//! them to canonical Avro-JSON. The registry ([`registry`]) deduplicates
//! named definitions, resolves forward and recursive references, and parses
//! raw Avro-JSON back into trees.

pub mod error;
pub mod registry;
pub mod tree;

pub use error::{SchemaError, SchemaResult};
pub use registry::SchemaRegistry;
pub use tree::{
    AvroField, AvroSchema, EnumSchema, FixedSchema, LogicalSchema, RecordSchema, UnionSchema,
};
