//! # docchat-session
//!
//! Chats and their persisted metadata.
//!
//! A [`Chat`] holds a name, a description, a system prompt, its conversation
//! and the `database_id` partition key that scopes its documents in the
//! shared index. [`ChatManager`] keeps every chat in one JSON file and
//! rewrites it on each change.

pub mod chat;
pub mod error;
pub mod manager;

pub use chat::{Chat, ChatUpdate};
pub use error::{Result, SessionError};
pub use manager::ChatManager;
