//! Client-owned schema cache.
//!
//! Registry-issued ids are immutable, so id-to-schema and schema-to-id
//! entries never expire. Latest-version lookups are deliberately absent:
//! "latest" can change underneath us and must be fetched per operation.
//!
//! The cache is owned by the client instance — not ambient global state —
//! and is shared by reference with every codec that client serves.

use std::collections::HashMap;

/// Permanent id/schema mappings for one registry client.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas_by_id: HashMap<u32, String>,
    ids_by_schema: HashMap<(String, String), u32>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self, id: u32) -> Option<&str> {
        self.schemas_by_id.get(&id).map(|s| s.as_str())
    }

    pub fn put_schema(&mut self, id: u32, schema: impl Into<String>) {
        self.schemas_by_id.entry(id).or_insert_with(|| schema.into());
    }

    pub fn id(&self, subject: &str, schema: &str) -> Option<u32> {
        self.ids_by_schema
            .get(&(subject.to_string(), schema.to_string()))
            .copied()
    }

    pub fn put_id(&mut self, subject: &str, schema: &str, id: u32) {
        self.ids_by_schema
            .insert((subject.to_string(), schema.to_string()), id);
    }
}
