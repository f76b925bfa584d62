//! Error types for codec operations

use crate::avrowire::client::RegistryClientError;
use crate::avrowire::schema::SchemaError;

/// Serialization error type
#[derive(Debug)]
pub enum SerializationError {
    /// A value could not be binary-encoded against the resolved schema
    EncodingFailed(String),
    /// A payload could not be decoded; carries enough context to diagnose a
    /// schema mismatch
    DecodingFailed {
        subject: String,
        schema_id: Option<u32>,
        payload_len: usize,
        message: String,
    },
    /// The wire header was missing, truncated, or carried a bad magic byte
    WireFormat(String),
    /// The model's schema definition was rejected
    Schema(SchemaError),
    /// A value does not fit the schema slot it was supplied for
    UnsupportedType(String),
    /// Invoked on a codec surface that only a concrete codec provides
    NotImplemented(String),
    /// A schema-registry call failed
    Registry(RegistryClientError),
}

impl SerializationError {
    pub fn not_implemented(what: &str) -> Self {
        SerializationError::NotImplemented(what.to_string())
    }
}

impl std::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializationError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            SerializationError::DecodingFailed {
                subject,
                schema_id,
                payload_len,
                message,
            } => write!(
                f,
                "Decoding failed for subject {} (schema id {:?}, {} payload bytes): {}",
                subject, schema_id, payload_len, message
            ),
            SerializationError::WireFormat(msg) => write!(f, "Invalid wire format: {}", msg),
            SerializationError::Schema(err) => write!(f, "Schema error: {}", err),
            SerializationError::UnsupportedType(msg) => write!(f, "Unsupported type: {}", msg),
            SerializationError::NotImplemented(what) => write!(f, "Not implemented: {}", what),
            SerializationError::Registry(err) => write!(f, "Registry error: {}", err),
        }
    }
}

impl std::error::Error for SerializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializationError::Schema(err) => Some(err),
            SerializationError::Registry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for SerializationError {
    fn from(err: SchemaError) -> Self {
        SerializationError::Schema(err)
    }
}

impl From<RegistryClientError> for SerializationError {
    fn from(err: RegistryClientError) -> Self {
        SerializationError::Registry(err)
    }
}
