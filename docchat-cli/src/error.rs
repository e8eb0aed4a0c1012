//! Error types for the docchat assistant.

use std::path::PathBuf;

use docchat_model::ModelError;
use docchat_rag::RagError;
use docchat_session::SessionError;
use thiserror::Error;

/// Errors surfaced by [`Assistant`](crate::Assistant) operations.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Missing or invalid startup configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat metadata error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Index, lifecycle or retrieval error.
    #[error(transparent)]
    Rag(#[from] RagError),

    /// Language model client error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An upload could not be read from disk.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A convenience result type for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
