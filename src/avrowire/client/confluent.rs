//! Confluent Schema Registry HTTP client.
//!
//! Speaks the registry's REST API with retry, authentication, and permanent
//! id/schema caching. The request paths are an external contract with the
//! registry service and must not be altered.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::api::SchemaRegistryApi;
use super::bridge;
use super::cache::SchemaCache;
use super::error::{ClientResult, RegistryClientError};

/// Registry error code for a missing subject.
const ERROR_SUBJECT_NOT_FOUND: u32 = 40401;
/// Registry error code for a schema missing under an existing subject.
const ERROR_SCHEMA_NOT_FOUND: u32 = 40403;

/// Configuration for the registry client
#[derive(Debug, Clone)]
pub struct RegistryClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum retry attempts for transport and server-side failures
    pub max_retries: u32,
    /// Base retry delay in milliseconds, doubled per attempt
    pub retry_delay_ms: u64,
}

impl Default for RegistryClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub enum AuthConfig {
    None,
    Basic { username: String, password: String },
    Bearer { token: String },
}

/// HTTP client for a Confluent-style schema registry.
pub struct ConfluentSchemaRegistryClient {
    base_url: String,
    auth: Option<AuthConfig>,
    http_client: Client,
    cache: Arc<RwLock<SchemaCache>>,
    config: RegistryClientConfig,
}

#[derive(Debug, Serialize)]
struct SchemaBody {
    schema: String,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct SchemaResponse {
    schema: String,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    id: u32,
    schema: String,
}

#[derive(Debug, Deserialize)]
struct CompatibilityResponse {
    is_compatible: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_code: u32,
    message: Option<String>,
}

impl ConfluentSchemaRegistryClient {
    /// Create a client with default configuration.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, RegistryClientConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(base_url: impl Into<String>, config: RegistryClientConfig) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: None,
            http_client: Client::new(),
            cache: Arc::new(RwLock::new(SchemaCache::new())),
            config,
        }
    }

    /// Set authentication configuration.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Fetch a specific version of a subject's schema.
    pub async fn schema_by_version(&self, subject: &str, version: i32) -> ClientResult<String> {
        let url = format!(
            "{}/subjects/{}/versions/{}",
            self.base_url, subject, version
        );
        let response = self.execute_request(Method::GET, &url, None).await?;
        let parsed: VersionResponse = Self::read_json(response).await?;
        self.remember(subject, parsed.id, &parsed.schema).await;
        Ok(parsed.schema)
    }

    // Blocking call surface. Each wrapper drives the async operation through
    // the bridge, so it is safe to call with or without an active runtime.

    pub fn register_blocking(&self, subject: &str, schema: &str) -> ClientResult<u32> {
        bridge::block_on(self.register(subject, schema))
    }

    pub fn sync_blocking(&self, subject: &str, schema: &str) -> ClientResult<u32> {
        bridge::block_on(self.sync(subject, schema))
    }

    pub fn schema_by_id_blocking(&self, id: u32) -> ClientResult<String> {
        bridge::block_on(self.schema_by_id(id))
    }

    pub fn schema_by_topic_blocking(&self, subject: &str) -> ClientResult<String> {
        bridge::block_on(self.schema_by_topic(subject))
    }

    pub fn subjects_blocking(&self) -> ClientResult<Vec<String>> {
        bridge::block_on(self.subjects())
    }

    pub fn compatible_blocking(&self, subject: &str, schema: &str) -> ClientResult<bool> {
        bridge::block_on(self.compatible(subject, schema))
    }

    async fn remember(&self, subject: &str, id: u32, schema: &str) {
        let mut cache = self.cache.write().await;
        cache.put_schema(id, schema);
        cache.put_id(subject, schema, id);
    }

    /// Execute one HTTP call with retry. Server-side (5xx) and transport
    /// failures retry with exponential backoff; client-side (4xx) responses
    /// are classified immediately and never retried.
    async fn execute_request(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> ClientResult<Response> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let mut request = self
                .http_client
                .request(method.clone(), url)
                .header("Content-Type", "application/vnd.schemaregistry.v1+json")
                .timeout(std::time::Duration::from_secs(self.config.timeout_seconds));

            if let Some(auth) = &self.auth {
                request = match auth {
                    AuthConfig::Basic { username, password } => {
                        request.basic_auth(username, Some(password))
                    }
                    AuthConfig::Bearer { token } => request.bearer_auth(token),
                    AuthConfig::None => request,
                };
            }

            if let Some(body_content) = &body {
                request = request.body(body_content.clone());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let text = response.text().await.unwrap_or_default();
                    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
                        Ok(err) => (err.error_code, err.message.unwrap_or(text)),
                        Err(_) => (status.as_u16() as u32, text),
                    };
                    let error = RegistryClientError::Registry { code, message };
                    if status.is_client_error() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(e) => {
                    log::warn!("registry request to {} failed: {}", url, e);
                    last_error = Some(RegistryClientError::Request {
                        message: e.to_string(),
                    });
                }
            }

            if attempt < self.config.max_retries {
                let delay = self.config.retry_delay_ms * 2_u64.pow(attempt);
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| RegistryClientError::Request {
            message: "all retry attempts failed".to_string(),
        }))
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(response: Response) -> ClientResult<T> {
        response
            .json()
            .await
            .map_err(|e| RegistryClientError::Protocol {
                message: e.to_string(),
            })
    }

    /// Translate registry lookup error codes for a subject-scoped call.
    fn lookup_error(subject: &str, error: RegistryClientError) -> RegistryClientError {
        match error {
            RegistryClientError::Registry {
                code: ERROR_SUBJECT_NOT_FOUND,
                ..
            } => RegistryClientError::SubjectNotFound {
                subject: subject.to_string(),
            },
            RegistryClientError::Registry {
                code: ERROR_SCHEMA_NOT_FOUND,
                ..
            } => RegistryClientError::SchemaNotFound {
                subject: subject.to_string(),
            },
            other => other,
        }
    }

    fn schema_body(schema: &str) -> ClientResult<String> {
        serde_json::to_string(&SchemaBody {
            schema: schema.to_string(),
        })
        .map_err(|e| RegistryClientError::Protocol {
            message: format!("failed to serialize request: {}", e),
        })
    }
}

#[async_trait]
impl SchemaRegistryApi for ConfluentSchemaRegistryClient {
    async fn register(&self, subject: &str, schema: &str) -> ClientResult<u32> {
        if let Some(id) = self.cache.read().await.id(subject, schema) {
            return Ok(id);
        }
        let url = format!("{}/subjects/{}/versions", self.base_url, subject);
        let body = Self::schema_body(schema)?;
        let response = self.execute_request(Method::POST, &url, Some(body)).await?;
        let parsed: IdResponse = Self::read_json(response).await?;
        log::debug!("registered schema id {} under {}", parsed.id, subject);
        self.remember(subject, parsed.id, schema).await;
        Ok(parsed.id)
    }

    async fn sync(&self, subject: &str, schema: &str) -> ClientResult<u32> {
        if let Some(id) = self.cache.read().await.id(subject, schema) {
            return Ok(id);
        }
        let url = format!("{}/subjects/{}", self.base_url, subject);
        let body = Self::schema_body(schema)?;
        let response = self
            .execute_request(Method::POST, &url, Some(body))
            .await
            .map_err(|e| Self::lookup_error(subject, e))?;
        let parsed: VersionResponse = Self::read_json(response).await?;
        self.remember(subject, parsed.id, schema).await;
        Ok(parsed.id)
    }

    async fn schema_by_id(&self, id: u32) -> ClientResult<String> {
        if let Some(schema) = self.cache.read().await.schema(id) {
            return Ok(schema.to_string());
        }
        let url = format!("{}/schemas/ids/{}", self.base_url, id);
        let response = self.execute_request(Method::GET, &url, None).await?;
        let parsed: SchemaResponse = Self::read_json(response).await?;
        self.cache.write().await.put_schema(id, parsed.schema.as_str());
        Ok(parsed.schema)
    }

    async fn schema_by_topic(&self, subject: &str) -> ClientResult<String> {
        // "latest" can change between calls, so only the immutable id/schema
        // pair from the response is cached, never the latest mapping itself.
        let url = format!("{}/subjects/{}/versions/latest", self.base_url, subject);
        let response = self
            .execute_request(Method::GET, &url, None)
            .await
            .map_err(|e| Self::lookup_error(subject, e))?;
        let parsed: VersionResponse = Self::read_json(response).await?;
        self.remember(subject, parsed.id, &parsed.schema).await;
        Ok(parsed.schema)
    }

    async fn subjects(&self) -> ClientResult<Vec<String>> {
        let url = format!("{}/subjects", self.base_url);
        let response = self.execute_request(Method::GET, &url, None).await?;
        Self::read_json(response).await
    }

    async fn compatible(&self, subject: &str, schema: &str) -> ClientResult<bool> {
        let url = format!(
            "{}/compatibility/subjects/{}/versions/latest",
            self.base_url, subject
        );
        let body = Self::schema_body(schema)?;
        match self.execute_request(Method::POST, &url, Some(body)).await {
            Ok(response) => {
                let parsed: CompatibilityResponse = Self::read_json(response).await?;
                Ok(parsed.is_compatible)
            }
            // A subject with no schemas yet is vacuously compatible.
            Err(RegistryClientError::Registry {
                code: ERROR_SUBJECT_NOT_FOUND,
                ..
            }) => Ok(true),
            Err(err) => Err(err),
        }
    }
}
