//! Schema-registry operation surface.
//!
//! Codecs talk to the registry exclusively through this trait, so the HTTP
//! client and the in-memory registry are interchangeable.

use async_trait::async_trait;

use super::error::{ClientResult, RegistryClientError};

/// Operations every schema-registry implementation provides.
#[async_trait]
pub trait SchemaRegistryApi: Send + Sync {
    /// Register `schema` under `subject`, returning its id. Idempotent:
    /// registering byte-identical schema content returns the same id.
    async fn register(&self, subject: &str, schema: &str) -> ClientResult<u32>;

    /// Look up the id of an already-registered schema under `subject`.
    ///
    /// Fails with [`RegistryClientError::SubjectNotFound`] if the subject has
    /// no schemas at all, and [`RegistryClientError::SchemaNotFound`] if the
    /// subject exists but this exact schema was never registered under it.
    async fn sync(&self, subject: &str, schema: &str) -> ClientResult<u32>;

    /// Fetch the schema body for a registry-issued id.
    async fn schema_by_id(&self, id: u32) -> ClientResult<String>;

    /// Fetch the latest schema body registered under `subject`.
    async fn schema_by_topic(&self, subject: &str) -> ClientResult<String>;

    /// All subject names known to the registry.
    async fn subjects(&self) -> ClientResult<Vec<String>>;

    /// Whether `schema` is compatible with the subject's latest schema under
    /// the registry's configured compatibility mode. An absent subject is
    /// vacuously compatible.
    async fn compatible(&self, subject: &str, schema: &str) -> ClientResult<bool>;

    /// True iff [`SchemaRegistryApi::sync`] would succeed.
    async fn is_registered(&self, subject: &str, schema: &str) -> ClientResult<bool> {
        match self.sync(subject, schema).await {
            Ok(_) => Ok(true),
            Err(RegistryClientError::SubjectNotFound { .. })
            | Err(RegistryClientError::SchemaNotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
