//! Error types and result types for gateway operations.
//!
//! Every fallible operation in the workspace returns [`GatewayResult<T>`]. Storage
//! driver failures that the gateway does not interpret are carried through
//! unchanged as [`GatewayError::Backend`].

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when going through the gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The storage backend could not be reached while initializing the gateway.
    #[error("Cannot connect to {url}: {reason}")]
    Connection {
        /// The target the backend was built against.
        url: String,
        /// The driver's description of the failure.
        reason: String,
    },
    /// A read-by-criteria, or a guarded update or remove, matched no active record.
    #[error("Record not found in model {model}")]
    NotFound {
        /// The model (collection) that was searched.
        model: String,
    },
    /// The model has no schema registered with the gateway.
    #[error("Unknown model: {0}")]
    UnknownModel(String),
    /// Serialization/deserialization error when converting between BSON and JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A value that must be a document (a record, a filter, a schema) was something else.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl GatewayError {
    /// Shorthand for a [`GatewayError::NotFound`] in the given model.
    pub fn not_found(model: &str) -> Self {
        GatewayError::NotFound { model: model.to_string() }
    }

    /// Returns `true` if this is a [`GatewayError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

/// A specialized `Result` type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<BsonError> for GatewayError {
    fn from(err: BsonError) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for GatewayError {
    fn from(err: SerdeJsonError) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}
