//! File-backed chat manager.
//!
//! All chats live in one JSON array. Every mutation rewrites the whole file:
//! the new contents go to a sibling temp file which is then renamed over the
//! old one, so a crash never leaves a half-written chat list behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use docchat_model::Message;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::{Chat, ChatUpdate};
use crate::error::{Result, SessionError};

fn read_chats(path: &Path) -> Result<Vec<Chat>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(SessionError::io(path, e)),
    };
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&contents)
        .map_err(|e| SessionError::Malformed { path: path.to_path_buf(), message: e.to_string() })
}

fn write_chats(path: &Path, chats: &[Chat]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SessionError::io(parent, e))?;
    }
    let mut staging = path.as_os_str().to_os_string();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    let file = File::create(&staging).map_err(|e| SessionError::io(&staging, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, chats)
        .map_err(|e| SessionError::io(&staging, e.into()))?;
    writer.flush().map_err(|e| SessionError::io(&staging, e))?;
    writer.get_ref().sync_all().map_err(|e| SessionError::io(&staging, e))?;
    fs::rename(&staging, path).map_err(|e| SessionError::io(path, e))?;
    debug!(path = %path.display(), chat_count = chats.len(), "chat file written");
    Ok(())
}

/// Owns the list of chats and the file it is persisted to.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_session::ChatManager;
///
/// let chats = ChatManager::open("db/chats/chats.json")?;
/// let chat = chats.create("research", "papers on retrieval", "Answer tersely.").await?;
/// chats.append_message(chat.id, Message::user("hi")).await?;
/// ```
pub struct ChatManager {
    path: PathBuf,
    chats: RwLock<Vec<Chat>>,
}

impl ChatManager {
    /// Load the chats stored at `path`. A missing or empty file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Malformed`] if the file is not a JSON array of
    /// chats, or [`SessionError::Io`] if it cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let chats = read_chats(&path)?;
        info!(path = %path.display(), chat_count = chats.len(), "loaded chats");
        Ok(Self { path, chats: RwLock::new(chats) })
    }

    /// The chat metadata file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All chats, in creation order.
    pub async fn list(&self) -> Vec<Chat> {
        self.chats.read().await.clone()
    }

    /// The chat with `id`.
    pub async fn get(&self, id: Uuid) -> Result<Chat> {
        self.chats
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Apply `mutation` to a copy of the chat list, persist it, then publish it.
    async fn commit<T>(&self, mutation: impl FnOnce(&mut Vec<Chat>) -> Result<T>) -> Result<T> {
        let mut chats = self.chats.write().await;
        let mut next = chats.clone();
        let value = mutation(&mut next)?;
        write_chats(&self.path, &next)?;
        *chats = next;
        Ok(value)
    }

    /// Create and persist a new chat.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Invalid`] if `name` is blank.
    pub async fn create(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Result<Chat> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SessionError::Invalid("chat name must not be empty".into()));
        }
        let chat = Chat::new(name, description, system_prompt);
        let created = chat.clone();
        self.commit(move |chats| {
            chats.push(chat);
            Ok(())
        })
        .await?;
        info!(chat.id = %created.id, database_id = %created.database_id, "created chat");
        Ok(created)
    }

    /// Change a chat's name, description or system prompt.
    pub async fn update(&self, id: Uuid, update: ChatUpdate) -> Result<Chat> {
        let chat = self
            .commit(|chats| {
                let chat = find_mut(chats, id)?;
                update.apply(chat);
                Ok(chat.clone())
            })
            .await?;
        info!(chat.id = %id, "updated chat");
        Ok(chat)
    }

    /// Append a message to a chat's conversation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if no chat has `id`.
    pub async fn append_message(&self, id: Uuid, message: Message) -> Result<()> {
        let role = message.role.clone();
        self.commit(|chats| {
            find_mut(chats, id)?.messages.push(message);
            Ok(())
        })
        .await?;
        debug!(chat.id = %id, %role, "appended message");
        Ok(())
    }

    /// Remove a chat and return it.
    ///
    /// Only the chat record is removed; its documents stay in the index.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if no chat has `id`.
    pub async fn delete(&self, id: Uuid) -> Result<Chat> {
        let chat = self
            .commit(|chats| {
                let pos = chats
                    .iter()
                    .position(|c| c.id == id)
                    .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
                Ok(chats.remove(pos))
            })
            .await?;
        info!(chat.id = %id, database_id = %chat.database_id, "deleted chat");
        Ok(chat)
    }
}

fn find_mut(chats: &mut [Chat], id: Uuid) -> Result<&mut Chat> {
    chats.iter_mut().find(|c| c.id == id).ok_or_else(|| SessionError::NotFound(id.to_string()))
}
