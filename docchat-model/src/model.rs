//! The language model provider trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// A provider that turns a conversation into a text completion.
///
/// Implementations own their retry, timeout and transport policy; callers
/// treat [`complete`](LanguageModel::complete) as a single opaque call.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_model::{LanguageModel, Message};
///
/// let reply = model
///     .complete(&[Message::system("Be brief."), Message::user("What is Rust?")])
///     .await?;
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// The model identifier, used in logs.
    fn name(&self) -> &str;

    /// Generate a completion for the given messages and return its text verbatim.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}
