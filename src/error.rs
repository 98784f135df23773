//! Crate error types.

use thiserror::Error;

/// Errors surfaced by the search core, the tool adapter, and the agent.
///
/// No layer performs local recovery: a failed remote call or a malformed
/// index payload aborts the current operation and propagates to the caller.
/// An empty result set is not an error.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument is out of range or unparseable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration file could not be read, parsed, or written.
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or rejected credentials for an external provider.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The embedding provider was unreachable or returned a failure.
    #[error("embedding provider error: {0}")]
    Embedding(String),

    /// The vector index was unreachable or rejected an operation.
    #[error("vector index error: {0}")]
    Index(String),

    /// An index result payload is missing an expected product attribute.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The catalog file could not be loaded or contains no usable data.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// The conversational agent could not complete a turn.
    #[error("agent error: {0}")]
    Agent(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<qdrant_client::QdrantError> for Error {
    fn from(err: qdrant_client::QdrantError) -> Self {
        Error::Index(err.to_string())
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
