//! # docchat-cli
//!
//! The `docchat` command-line assistant.
//!
//! [`Assistant`] ties a [`ChatManager`](docchat_session::ChatManager) to a
//! [`RagPipeline`](docchat_rag::RagPipeline): chats own documents, questions
//! are answered from the asking chat's documents only, and deleting a chat
//! removes its documents from the shared index. [`AppConfig`] holds the
//! startup settings read from flags, the environment and `.env`.

pub mod assistant;
pub mod config;
pub mod error;

pub use assistant::{Assistant, DeletedChat, OCTET_STREAM, detect_mime, read_uploads};
pub use config::AppConfig;
pub use error::{AssistantError, Result};
