//! The assistant facade: chats, their documents and question answering.
//!
//! Every collaborator is built once at startup and handed in explicitly;
//! nothing is cached globally.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docchat_model::Message;
use docchat_rag::{
    Answer, AnswerRequest, DocumentInfo, IndexStats, IngestReport, RagPipeline, RetrievalStrategy,
    TEXT_PLAIN, UploadedFile, VectorIndexStore,
};
use docchat_session::{Chat, ChatManager, ChatUpdate};
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AssistantError, Result};

/// Mime type given to uploads that are not plain text.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess an upload's mime type from its extension. Only `.txt` is plain text.
pub fn detect_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("txt") => TEXT_PLAIN,
        _ => OCTET_STREAM,
    }
}

/// Read files from disk as uploads.
pub async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AssistantError::Read { path: path.clone(), source })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(UploadedFile::new(name, detect_mime(path), bytes));
    }
    Ok(files)
}

/// What [`Assistant::delete_chat`] removed.
#[derive(Debug, Clone)]
pub struct DeletedChat {
    /// The removed chat record.
    pub chat: Chat,
    /// Chunks purged from the index.
    pub purged_chunks: usize,
}

/// Chats plus the RAG pipeline that answers questions about their documents.
pub struct Assistant {
    chats: ChatManager,
    pipeline: RagPipeline,
}

impl Assistant {
    /// Combine an opened chat list and a built pipeline.
    pub fn new(chats: ChatManager, pipeline: RagPipeline) -> Self {
        Self { chats, pipeline }
    }

    /// Build every collaborator from `config`: embedding provider, index,
    /// chat model, pipeline and chat list.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let embedder = Arc::new(config.embedding_provider()?);
        let store = Arc::new(VectorIndexStore::load(&config.index_path, embedder).await?);
        let pipeline = RagPipeline::builder()
            .config(config.rag_config()?)
            .store(store)
            .model(Arc::new(config.chat_model()?))
            .build()?;
        let chats = ChatManager::open(&config.chats_path)?;
        info!(
            index_path = %config.index_path.display(),
            chats_path = %config.chats_path.display(),
            "assistant ready"
        );
        Ok(Self::new(chats, pipeline))
    }

    /// The chat list.
    pub fn chats(&self) -> &ChatManager {
        &self.chats
    }

    /// The RAG pipeline.
    pub fn pipeline(&self) -> &RagPipeline {
        &self.pipeline
    }

    /// Create a chat.
    pub async fn create_chat(&self, name: &str, description: &str, system_prompt: &str) -> Result<Chat> {
        Ok(self.chats.create(name, description, system_prompt).await?)
    }

    /// All chats.
    pub async fn list_chats(&self) -> Vec<Chat> {
        self.chats.list().await
    }

    /// One chat.
    pub async fn chat(&self, id: Uuid) -> Result<Chat> {
        Ok(self.chats.get(id).await?)
    }

    /// Change a chat's name, description or system prompt.
    pub async fn update_chat(&self, id: Uuid, update: ChatUpdate) -> Result<Chat> {
        Ok(self.chats.update(id, update).await?)
    }

    /// Delete a chat and every chunk stored under its partition key.
    ///
    /// The chat record goes first; if purging then fails the chunks are left
    /// in the index and the error is returned.
    pub async fn delete_chat(&self, id: Uuid) -> Result<DeletedChat> {
        let chat = self.chats.delete(id).await?;
        let purged_chunks = self.pipeline.documents().purge_partition(&chat.database_id).await?;
        info!(chat.id = %id, purged_chunks, "deleted chat and its documents");
        Ok(DeletedChat { chat, purged_chunks })
    }

    /// Index uploads into a chat's partition.
    pub async fn upload(&self, chat_id: Uuid, files: &[UploadedFile]) -> Result<IngestReport> {
        let chat = self.chats.get(chat_id).await?;
        Ok(self.pipeline.documents().ingest(files, &chat.database_id).await?)
    }

    /// Read files from disk and index them into a chat's partition.
    pub async fn upload_paths(&self, chat_id: Uuid, paths: &[PathBuf]) -> Result<IngestReport> {
        let files = read_uploads(paths).await?;
        self.upload(chat_id, &files).await
    }

    /// Documents of a chat, one entry per document.
    pub async fn documents(&self, chat_id: Uuid) -> Result<Vec<DocumentInfo>> {
        let chat = self.chats.get(chat_id).await?;
        Ok(self.pipeline.documents().list_documents(&chat.database_id).await)
    }

    /// Delete one document from a chat. Returns the number of chunks removed.
    pub async fn delete_document(&self, chat_id: Uuid, doc_id: &str) -> Result<usize> {
        let chat = self.chats.get(chat_id).await?;
        Ok(self.pipeline.documents().delete_document(doc_id, &chat.database_id).await?)
    }

    /// One conversation turn: record the question, answer it from the chat's
    /// documents, record the answer.
    ///
    /// The model sees only the chat's system prompt, the retrieved context
    /// and the question, not the earlier conversation.
    pub async fn ask(
        &self,
        chat_id: Uuid,
        question: &str,
        strategy: RetrievalStrategy,
        theme: Option<&str>,
    ) -> Result<Answer> {
        let chat = self.chats.get(chat_id).await?;
        self.chats.append_message(chat_id, Message::user(question)).await?;

        let mut request = AnswerRequest::new(question, &chat.system_prompt, &chat.database_id)
            .with_strategy(strategy);
        if let Some(theme) = theme {
            request = request.with_theme(theme);
        }
        let answer = self.pipeline.respond(&request).await?;

        self.chats.append_message(chat_id, Message::assistant(&answer.text)).await?;
        Ok(answer)
    }

    /// Index counters.
    pub async fn stats(&self) -> IndexStats {
        self.pipeline.store().stats().await
    }

    /// Run the index consistency check.
    pub async fn verify(&self) -> Result<()> {
        Ok(self.pipeline.store().verify().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_txt_is_plain_text() {
        assert_eq!(detect_mime(Path::new("notes.txt")), TEXT_PLAIN);
        assert_eq!(detect_mime(Path::new("NOTES.TXT")), TEXT_PLAIN);
        assert_eq!(detect_mime(Path::new("scan.pdf")), OCTET_STREAM);
        assert_eq!(detect_mime(Path::new("README")), OCTET_STREAM);
    }
}
