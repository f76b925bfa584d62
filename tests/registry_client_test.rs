//! Registry-client contract tests: the in-memory registry implements the
//! full operation surface, and the HTTP client speaks the exact registry
//! endpoints (verified against a mock server).

use avrowire::{
    ConfluentSchemaRegistryClient, InMemorySchemaRegistry, RegistryClientConfig,
    RegistryClientError, SchemaRegistryApi,
};
use serde_json::{json, Value};

fn unit_test_schema() -> String {
    json!({
        "type": "record",
        "name": "UnitTest",
        "fields": [{"name": "field", "type": "string"}]
    })
    .to_string()
}

fn unit_test_schema_compatible() -> String {
    json!({
        "type": "record",
        "name": "UnitTest",
        "fields": [
            {"name": "field", "type": "string"},
            {"name": "second", "type": "string", "default": ""}
        ]
    })
    .to_string()
}

fn unit_test_schema_incompatible() -> String {
    json!({
        "type": "record",
        "name": "UnitTest",
        "fields": [
            {"name": "field", "type": "string"},
            {"name": "second", "type": "string"}
        ]
    })
    .to_string()
}

fn assert_same_schema(left: &str, right: &str) {
    let left: Value = serde_json::from_str(left).unwrap();
    let right: Value = serde_json::from_str(right).unwrap();
    assert_eq!(left, right);
}

// In-memory registry contract

#[tokio::test]
async fn test_register_then_sync_returns_same_id() {
    let client = InMemorySchemaRegistry::new();
    let schema = unit_test_schema();

    let id = client.register("s", &schema).await.unwrap();
    assert_eq!(client.register("s", &schema).await.unwrap(), id);
    assert_eq!(client.sync("s", &schema).await.unwrap(), id);

    assert!(client.subjects().await.unwrap().contains(&"s".to_string()));
    assert_same_schema(&client.schema_by_id(id).await.unwrap(), &schema);
    assert_same_schema(&client.schema_by_topic("s").await.unwrap(), &schema);
}

#[tokio::test]
async fn test_sync_on_unregistered_subject() {
    let client = InMemorySchemaRegistry::new();
    let err = client.sync("missing", &unit_test_schema()).await.unwrap_err();
    assert!(matches!(err, RegistryClientError::SubjectNotFound { .. }));
}

#[tokio::test]
async fn test_sync_on_unregistered_schema() {
    let client = InMemorySchemaRegistry::new();
    client.register("s", &unit_test_schema()).await.unwrap();
    let err = client
        .sync("s", &unit_test_schema_compatible())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryClientError::SchemaNotFound { .. }));
}

#[tokio::test]
async fn test_is_registered() {
    let client = InMemorySchemaRegistry::new();
    let schema = unit_test_schema();
    assert!(!client.is_registered("s", &schema).await.unwrap());
    client.register("s", &schema).await.unwrap();
    assert!(client.is_registered("s", &schema).await.unwrap());
}

#[tokio::test]
async fn test_compatibility_checks() {
    let client = InMemorySchemaRegistry::new();

    // An empty subject is vacuously compatible.
    assert!(client
        .compatible("s", &unit_test_schema_incompatible())
        .await
        .unwrap());

    client.register("s", &unit_test_schema()).await.unwrap();
    // Adding an optional field with a default is backward compatible.
    assert!(client
        .compatible("s", &unit_test_schema_compatible())
        .await
        .unwrap());
    // Adding a required field without a default is not.
    assert!(!client
        .compatible("s", &unit_test_schema_incompatible())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_identical_content_shares_id_across_subjects() {
    let client = InMemorySchemaRegistry::new();
    let schema = unit_test_schema();
    let a = client.register("a-value", &schema).await.unwrap();
    let b = client.register("b-value", &schema).await.unwrap();
    assert_eq!(a, b);
}

// HTTP client against a mock registry

fn test_config() -> RegistryClientConfig {
    RegistryClientConfig {
        timeout_seconds: 5,
        max_retries: 0,
        retry_delay_ms: 1,
    }
}

#[tokio::test]
async fn test_http_register() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/subjects/test-value/versions")
        .match_header("content-type", "application/vnd.schemaregistry.v1+json")
        .with_status(200)
        .with_header("content-type", "application/vnd.schemaregistry.v1+json")
        .with_body(r#"{"id":7}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ConfluentSchemaRegistryClient::with_config(server.url(), test_config());
    let schema = unit_test_schema();
    assert_eq!(client.register("test-value", &schema).await.unwrap(), 7);
    // The second call is answered from the id cache.
    assert_eq!(client.register("test-value", &schema).await.unwrap(), 7);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_schema_by_id_is_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/schemas/ids/7")
        .with_status(200)
        .with_header("content-type", "application/vnd.schemaregistry.v1+json")
        .with_body(r#"{"schema":"{\"type\":\"record\",\"name\":\"Heartbeat\",\"fields\":[{\"name\":\"beat\",\"type\":\"long\"}]}"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ConfluentSchemaRegistryClient::with_config(server.url(), test_config());
    let first = client.schema_by_id(7).await.unwrap();
    let second = client.schema_by_id(7).await.unwrap();
    assert_eq!(first, second);
    assert!(first.contains("Heartbeat"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_schema_by_topic_is_not_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/subjects/test-value/versions/latest")
        .with_status(200)
        .with_header("content-type", "application/vnd.schemaregistry.v1+json")
        .with_body(r#"{"subject":"test-value","version":1,"id":3,"schema":"\"string\""}"#)
        .expect(2)
        .create_async()
        .await;

    let client = ConfluentSchemaRegistryClient::with_config(server.url(), test_config());
    assert_eq!(client.schema_by_topic("test-value").await.unwrap(), "\"string\"");
    // "latest" may change between calls, so it hits the registry again.
    assert_eq!(client.schema_by_topic("test-value").await.unwrap(), "\"string\"");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_sync_error_taxonomy() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/subjects/ghost-value")
        .with_status(404)
        .with_body(r#"{"error_code":40401,"message":"Subject not found."}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/subjects/stale-value")
        .with_status(404)
        .with_body(r#"{"error_code":40403,"message":"Schema not found"}"#)
        .create_async()
        .await;

    let client = ConfluentSchemaRegistryClient::with_config(server.url(), test_config());
    let schema = unit_test_schema();

    let err = client.sync("ghost-value", &schema).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryClientError::SubjectNotFound { ref subject } if subject == "ghost-value"
    ));

    let err = client.sync("stale-value", &schema).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryClientError::SchemaNotFound { ref subject } if subject == "stale-value"
    ));
}

#[tokio::test]
async fn test_http_compatibility() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/compatibility/subjects/test-value/versions/latest")
        .with_status(200)
        .with_body(r#"{"is_compatible":true}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/compatibility/subjects/empty-value/versions/latest")
        .with_status(404)
        .with_body(r#"{"error_code":40401,"message":"Subject not found."}"#)
        .create_async()
        .await;

    let client = ConfluentSchemaRegistryClient::with_config(server.url(), test_config());
    let schema = unit_test_schema();
    assert!(client.compatible("test-value", &schema).await.unwrap());
    // No latest schema to clash with: vacuously compatible.
    assert!(client.compatible("empty-value", &schema).await.unwrap());
}

#[tokio::test]
async fn test_http_subjects() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/subjects")
        .with_status(200)
        .with_body(r#"["alpha-value","beta-key"]"#)
        .create_async()
        .await;

    let client = ConfluentSchemaRegistryClient::with_config(server.url(), test_config());
    assert_eq!(
        client.subjects().await.unwrap(),
        vec!["alpha-value".to_string(), "beta-key".to_string()]
    );
}

#[tokio::test]
async fn test_http_server_errors_are_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/subjects")
        .with_status(500)
        .with_body("boom")
        .expect(2)
        .create_async()
        .await;

    let config = RegistryClientConfig {
        timeout_seconds: 5,
        max_retries: 1,
        retry_delay_ms: 1,
    };
    let client = ConfluentSchemaRegistryClient::with_config(server.url(), config);
    let err = client.subjects().await.unwrap_err();
    assert!(matches!(err, RegistryClientError::Registry { code: 500, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_client_errors_are_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/schemas/ids/9")
        .with_status(404)
        .with_body(r#"{"error_code":40403,"message":"Schema not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let config = RegistryClientConfig {
        timeout_seconds: 5,
        max_retries: 3,
        retry_delay_ms: 1,
    };
    let client = ConfluentSchemaRegistryClient::with_config(server.url(), config);
    let err = client.schema_by_id(9).await.unwrap_err();
    assert!(matches!(err, RegistryClientError::Registry { code: 40403, .. }));
    mock.assert_async().await;
}

#[test]
fn test_blocking_surface() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/subjects")
        .with_status(200)
        .with_body(r#"["s"]"#)
        .create();

    let client = ConfluentSchemaRegistryClient::with_config(server.url(), test_config());
    assert_eq!(client.subjects_blocking().unwrap(), vec!["s".to_string()]);
}
