//! Error types for the `docchat-session` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the chat manager.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No chat has the given id.
    #[error("chat '{0}' not found")]
    NotFound(String),

    /// A chat field failed validation.
    #[error("invalid chat: {0}")]
    Invalid(String),

    /// The chat metadata file exists but is not a JSON array of chats.
    #[error("malformed chat file {}: {message}", path.display())]
    Malformed {
        /// The chat metadata file.
        path: PathBuf,
        /// The parser error.
        message: String,
    },

    /// Reading or writing the chat metadata file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, SessionError>;
