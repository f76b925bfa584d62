//! Schema Definition Error Types
//!
//! Errors raised while turning model declarations or raw Avro-JSON into
//! schema trees. These are deterministic definition-time failures and are
//! never retried.

/// Error types for schema definition and registry operations
#[derive(Debug)]
pub enum SchemaError {
    /// A declared field type or raw schema shape has no Avro mapping
    UnknownType {
        message: String,
    },
    /// A named type was redefined with a structurally different definition
    AlreadyDefined {
        name: String,
    },
    /// A mapping type was declared with non-string keys
    NonStringMapKey {
        message: String,
    },
    /// A named type was looked up before being registered
    NotFound {
        name: String,
    },
    /// A schema violates a structural invariant (e.g. duplicate union branches)
    Validation {
        message: String,
    },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::UnknownType { message } => {
                write!(f, "No avro type known for {}", message)
            }
            SchemaError::AlreadyDefined { name } => {
                write!(f, "Schema already defined: {}", name)
            }
            SchemaError::NonStringMapKey { message } => {
                write!(f, "{} does not have string-like keys", message)
            }
            SchemaError::NotFound { name } => write!(f, "Schema not found: {}", name),
            SchemaError::Validation { message } => {
                write!(f, "Schema validation error: {}", message)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

pub type SchemaResult<T> = Result<T, SchemaError>;
