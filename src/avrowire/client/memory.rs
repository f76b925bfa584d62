//! In-memory schema registry.
//!
//! Implements the full [`SchemaRegistryApi`] contract against process-local
//! storage. Suitable for tests and development; all data is lost when the
//! process terminates. Ids are content-addressed the way the real registry
//! issues them: byte-identical schema content maps to one id, also when
//! registered under several subjects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::api::SchemaRegistryApi;
use super::error::{ClientResult, RegistryClientError};

/// One registered version under a subject.
#[derive(Debug, Clone)]
struct SchemaVersion {
    id: u32,
    version: i32,
    schema: String,
}

/// Process-local schema registry.
#[derive(Debug)]
pub struct InMemorySchemaRegistry {
    /// Storage: subject -> versions in registration order
    subjects: RwLock<HashMap<String, Vec<SchemaVersion>>>,
    /// Reverse lookup: schema id -> canonical schema text
    schemas_by_id: RwLock<HashMap<u32, String>>,
    /// Content addressing: canonical schema text -> id
    ids_by_schema: RwLock<HashMap<String, u32>>,
    next_id: AtomicU32,
}

impl Default for InMemorySchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self {
            subjects: RwLock::new(HashMap::new()),
            schemas_by_id: RwLock::new(HashMap::new()),
            ids_by_schema: RwLock::new(HashMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Normalize schema text so formatting differences do not split ids.
    fn canonicalize(schema: &str) -> ClientResult<String> {
        let value: Value =
            serde_json::from_str(schema).map_err(|e| RegistryClientError::Registry {
                code: 42201,
                message: format!("invalid schema: {}", e),
            })?;
        Ok(value.to_string())
    }

    /// Backward compatibility: a reader using `candidate` must be able to
    /// read data written with `latest`, so every field the candidate adds
    /// needs a default.
    fn backward_compatible(candidate: &Value, latest: &Value) -> bool {
        let candidate_fields = candidate.get("fields").and_then(|f| f.as_array());
        let latest_fields = latest.get("fields").and_then(|f| f.as_array());
        let (candidate_fields, latest_fields) = match (candidate_fields, latest_fields) {
            (Some(c), Some(l)) => (c, l),
            // Non-record schemas: only an identical schema is compatible.
            _ => return candidate == latest,
        };

        let latest_names: Vec<&str> = latest_fields
            .iter()
            .filter_map(|f| f.get("name").and_then(|n| n.as_str()))
            .collect();

        candidate_fields.iter().all(|field| {
            let name = field.get("name").and_then(|n| n.as_str());
            match name {
                Some(name) if latest_names.contains(&name) => true,
                Some(_) => field.get("default").is_some(),
                None => false,
            }
        })
    }
}

#[async_trait]
impl SchemaRegistryApi for InMemorySchemaRegistry {
    async fn register(&self, subject: &str, schema: &str) -> ClientResult<u32> {
        let canonical = Self::canonicalize(schema)?;

        let id = {
            let mut ids = self.ids_by_schema.write().await;
            match ids.get(&canonical) {
                Some(id) => *id,
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                    ids.insert(canonical.clone(), id);
                    self.schemas_by_id.write().await.insert(id, canonical.clone());
                    id
                }
            }
        };

        let mut subjects = self.subjects.write().await;
        let versions = subjects.entry(subject.to_string()).or_default();
        if !versions.iter().any(|v| v.id == id) {
            let next_version = versions.iter().map(|v| v.version).max().unwrap_or(0) + 1;
            versions.push(SchemaVersion {
                id,
                version: next_version,
                schema: canonical,
            });
        }
        Ok(id)
    }

    async fn sync(&self, subject: &str, schema: &str) -> ClientResult<u32> {
        let canonical = Self::canonicalize(schema)?;
        let subjects = self.subjects.read().await;
        let versions = subjects
            .get(subject)
            .ok_or_else(|| RegistryClientError::SubjectNotFound {
                subject: subject.to_string(),
            })?;
        versions
            .iter()
            .find(|v| v.schema == canonical)
            .map(|v| v.id)
            .ok_or_else(|| RegistryClientError::SchemaNotFound {
                subject: subject.to_string(),
            })
    }

    async fn schema_by_id(&self, id: u32) -> ClientResult<String> {
        self.schemas_by_id
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryClientError::SchemaNotFound {
                subject: format!("schema id {}", id),
            })
    }

    async fn schema_by_topic(&self, subject: &str) -> ClientResult<String> {
        let subjects = self.subjects.read().await;
        let versions = subjects
            .get(subject)
            .ok_or_else(|| RegistryClientError::SubjectNotFound {
                subject: subject.to_string(),
            })?;
        versions
            .iter()
            .max_by_key(|v| v.version)
            .map(|v| v.schema.clone())
            .ok_or_else(|| RegistryClientError::SubjectNotFound {
                subject: subject.to_string(),
            })
    }

    async fn subjects(&self) -> ClientResult<Vec<String>> {
        Ok(self.subjects.read().await.keys().cloned().collect())
    }

    async fn compatible(&self, subject: &str, schema: &str) -> ClientResult<bool> {
        let latest = {
            let subjects = self.subjects.read().await;
            subjects
                .get(subject)
                .and_then(|versions| versions.iter().max_by_key(|v| v.version))
                .map(|v| v.schema.clone())
        };
        let latest = match latest {
            Some(latest) => latest,
            // No schema registered yet: anything is compatible.
            None => return Ok(true),
        };

        let candidate: Value = serde_json::from_str(&Self::canonicalize(schema)?)
            .map_err(|e| RegistryClientError::Protocol {
                message: e.to_string(),
            })?;
        let latest: Value =
            serde_json::from_str(&latest).map_err(|e| RegistryClientError::Protocol {
                message: e.to_string(),
            })?;
        Ok(Self::backward_compatible(&candidate, &latest))
    }
}
