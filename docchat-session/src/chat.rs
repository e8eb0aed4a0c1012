//! The chat record.

use docchat_model::Message;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chat: its prompt, its conversation, and the partition key of its documents.
///
/// `database_id` is generated once, at creation, and never changes: it ties
/// the chat to its chunks in the shared document index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// System prompt sent with every question.
    #[serde(default)]
    pub system_prompt: String,
    /// Partition key of this chat's documents.
    pub database_id: String,
    /// Conversation so far, oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Chat {
    /// Create a chat with a fresh id and partition key and no messages.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            database_id: format!("{name}_{}", Uuid::new_v4()),
            name,
            description: description.into(),
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
        }
    }

    /// The conversation without placeholder entries, such as the `"pass"`
    /// message older chat files start with.
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role.is_model_role())
    }
}

/// Changes applied by [`ChatManager::update`](crate::ChatManager::update).
///
/// `None` and empty strings leave the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New system prompt.
    pub system_prompt: Option<String>,
}

impl ChatUpdate {
    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub(crate) fn apply(self, chat: &mut Chat) {
        let fields = [
            (self.name, &mut chat.name),
            (self.description, &mut chat.description),
            (self.system_prompt, &mut chat.system_prompt),
        ];
        for (value, field) in fields {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }
}
