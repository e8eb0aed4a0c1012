//! Error types for the `docchat-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in index, lifecycle and retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding provider is unreachable or misconfigured.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An uploaded file is not valid UTF-8 text or has an unsupported type.
    #[error("Cannot decode '{file}': {message}")]
    DecodeError {
        /// Name of the offending file.
        file: String,
        /// A description of the failure.
        message: String,
    },

    /// The relevance-scoring model returned text without a usable score.
    #[error("Cannot parse relevance score from model output: {response:?}")]
    ValidationParseError {
        /// The raw model output.
        response: String,
    },

    /// No records match the given identifier.
    #[error("{kind} '{id}' not found")]
    NotFoundError {
        /// What was looked up, e.g. `document`.
        kind: &'static str,
        /// The identifier that matched nothing.
        id: String,
    },

    /// The slot map, chunk store and nearest-neighbor structure disagree.
    #[error("Corrupt index: {0}")]
    CorruptIndexError(String),

    /// Reading or writing the on-disk index failed.
    #[error("Persistence error at {}: {message}", path.display())]
    PersistenceError {
        /// The file or directory involved.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error propagated from the language model provider.
    #[error(transparent)]
    ModelError(#[from] docchat_model::ModelError),
}

impl RagError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::PersistenceError { path: path.into(), message: err.to_string() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
