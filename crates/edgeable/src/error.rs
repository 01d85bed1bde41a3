//! Error types for edgeable operations.
//!
//! All fallible operations return [`Result<T>`]. Reads of missing entities are not
//! errors; they surface as `None`, `false` or an empty collection instead.

use thiserror::Error;

/// Result type alias for edgeable operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error type for all graph operations.
///
/// Validation errors are raised before any state is touched.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Malformed id, property key, hook key or configuration value.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was rejected and why
        message: String,
    },

    /// Node not found in the graph
    #[error("Node not found: {node_id}")]
    NodeNotFound {
        /// ID of the missing node
        node_id: String,
    },

    /// Edge not found in the graph
    #[error("Edge not found: {source_id}->{destination_id}")]
    EdgeNotFound {
        /// Source node of the missing edge
        source_id: String,
        /// Destination node of the missing edge
        destination_id: String,
    },

    /// A hook vetoed the mutation.
    ///
    /// This is a negative outcome rather than a failure; nothing was changed
    /// apart from whatever side effects the hooks themselves performed.
    #[error("Cancelled by hook: {operation}")]
    Cancelled {
        /// The vetoed operation
        operation: String,
    },

    /// Operation that cannot be performed in the current state
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of what went wrong
        message: String,
    },

    /// Snapshot file I/O error
    #[error("Storage error: {message}")]
    Storage {
        /// Detailed error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GraphError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a storage error from a message and optional source.
    pub fn storage<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create a serialization error from a message and optional source.
    pub fn serialization<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Whether this error is a hook veto rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether this error reports a missing node or edge.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. } | Self::EdgeNotFound { .. })
    }
}
