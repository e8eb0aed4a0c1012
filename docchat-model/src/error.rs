//! Error types for the `docchat-model` crate.

use thiserror::Error;

/// Errors that can occur while talking to a language model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The HTTP request could not be sent or timed out.
    #[error("Request error ({provider}): {message}")]
    Request {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("API error ({provider}) {status}: {message}")]
    Api {
        /// The provider that produced the error.
        provider: String,
        /// HTTP status code returned by the provider.
        status: u16,
        /// The error detail reported by the provider.
        message: String,
    },

    /// The provider answered, but the body could not be interpreted.
    #[error("Invalid response ({provider}): {message}")]
    InvalidResponse {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ModelError {
    /// Whether retrying the same request may succeed.
    ///
    /// Network failures, rate limiting and server-side errors are transient;
    /// everything else is reported immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse { .. } | Self::Config(_) => false,
        }
    }
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
