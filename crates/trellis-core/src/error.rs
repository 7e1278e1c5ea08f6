//! Error types for Trellis Core

use thiserror::Error;

/// Result type alias using Trellis' Error
pub type Result<T> = std::result::Result<T, Error>;

/// Trellis error types
#[derive(Error, Debug)]
pub enum Error {
    /// Misconfigured relationship: bad direction, bad label, or a class
    /// initializer whose type cannot produce the requested element kind.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Stored type metadata on an element is structurally corrupt.
    #[error("Type resolution failed for {element}: {reason}")]
    TypeResolution { element: String, reason: String },

    /// An adapter call failed after earlier steps of the same mutation
    /// had already been applied. Nothing is rolled back.
    #[error("{operation} failed after {applied} applied step(s): {source}")]
    PartialMutation {
        operation: &'static str,
        applied: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Vertex not found: {0}")]
    VertexNotFound(String),

    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error indicates a programming mistake rather than a
    /// runtime condition.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Error reported by the store, looking through a partial-mutation wrapper.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::PartialMutation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<crate::limits::ValidationError> for Error {
    fn from(err: crate::limits::ValidationError) -> Self {
        Self::Configuration(err.to_string())
    }
}
