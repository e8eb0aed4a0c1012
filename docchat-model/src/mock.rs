//! A scripted language model for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::message::Message;
use crate::model::LanguageModel;

type Responder = dyn Fn(&[Message]) -> Result<String> + Send + Sync;

/// A [`LanguageModel`] whose replies are decided by a closure.
///
/// Every call is recorded so tests can assert on the prompts that were sent.
///
/// # Example
///
/// ```rust
/// use docchat_model::{MockModel, Message};
///
/// let model = MockModel::scripted(["90%", "12%"]);
/// let model = MockModel::with_reply("always this");
/// let model = MockModel::new(|messages: &[Message]| Ok(messages.len().to_string()));
/// ```
pub struct MockModel {
    responder: Box<Responder>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockModel {
    /// Create a mock that answers with the result of `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[Message]) -> Result<String> + Send + Sync + 'static,
    {
        Self { responder: Box::new(responder), calls: Mutex::new(Vec::new()) }
    }

    /// Create a mock that always answers with the same text.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::new(move |_| Ok(reply.clone()))
    }

    /// Create a mock that answers with `replies` in order and fails once they run out.
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: Mutex<VecDeque<String>> =
            Mutex::new(replies.into_iter().map(Into::into).collect());
        Self::new(move |_| {
            let mut queue = queue.lock().map_err(|_| ModelError::InvalidResponse {
                provider: "Mock".into(),
                message: "script lock poisoned".into(),
            })?;
            queue.pop_front().ok_or_else(|| ModelError::InvalidResponse {
                provider: "Mock".into(),
                message: "no scripted replies left".into(),
            })
        })
    }

    /// Every message list this mock has been called with, oldest first.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of completed calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        (self.responder)(messages)
    }
}
