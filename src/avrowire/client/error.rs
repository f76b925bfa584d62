//! Registry Client Error Types
//!
//! Failures talking to the schema-registry service. Lookup misses
//! (`SubjectNotFound`, `SchemaNotFound`) are surfaced to the caller, who may
//! retry after registering; transport failures carry whatever the HTTP layer
//! reported.

/// Error types for schema-registry client operations
#[derive(Debug)]
pub enum RegistryClientError {
    /// The subject has no registered schemas at all
    SubjectNotFound {
        subject: String,
    },
    /// The subject exists but this exact schema was never registered under it
    SchemaNotFound {
        subject: String,
    },
    /// The request never produced a usable response (connection, timeout)
    Request {
        message: String,
    },
    /// The registry answered with an error payload
    Registry {
        code: u32,
        message: String,
    },
    /// The registry answered with something the client could not interpret
    Protocol {
        message: String,
    },
}

impl std::fmt::Display for RegistryClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryClientError::SubjectNotFound { subject } => {
                write!(f, "Subject not found: {}", subject)
            }
            RegistryClientError::SchemaNotFound { subject } => {
                write!(f, "Schema not found under subject: {}", subject)
            }
            RegistryClientError::Request { message } => {
                write!(f, "Registry request failed: {}", message)
            }
            RegistryClientError::Registry { code, message } => {
                write!(f, "Registry error {}: {}", code, message)
            }
            RegistryClientError::Protocol { message } => {
                write!(f, "Unexpected registry response: {}", message)
            }
        }
    }
}

impl std::error::Error for RegistryClientError {}

pub type ClientResult<T> = Result<T, RegistryClientError>;
