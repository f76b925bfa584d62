//! Schema-registry clients
//!
//! Codecs resolve schema ids through the [`SchemaRegistryApi`] trait. Two
//! implementations are provided: [`ConfluentSchemaRegistryClient`] speaks
//! the registry's HTTP API, and [`InMemorySchemaRegistry`] backs tests and
//! development with process-local storage. The [`bridge`] module lets
//! synchronous call sites drive either one.

pub mod api;
pub mod bridge;
pub mod cache;
pub mod confluent;
pub mod error;
pub mod memory;

pub use api::SchemaRegistryApi;
pub use cache::SchemaCache;
pub use confluent::{AuthConfig, ConfluentSchemaRegistryClient, RegistryClientConfig};
pub use error::{ClientResult, RegistryClientError};
pub use memory::InMemorySchemaRegistry;
