//! End-to-end assistant flows with an offline embedder and a scripted model.

use std::sync::Arc;

use async_trait::async_trait;
use docchat_cli::{Assistant, AssistantError};
use docchat_model::{Message, MockModel, Role};
use docchat_rag::{
    EmbeddingProvider, RagPipeline, RetrievalStrategy, UploadedFile, VectorIndexStore,
};
use docchat_session::{ChatManager, SessionError};
use tempfile::TempDir;
use uuid::Uuid;

struct LetterCounts;

#[async_trait]
impl EmbeddingProvider for LetterCounts {
    async fn embed(&self, text: &str) -> docchat_rag::Result<Vec<f32>> {
        let mut vector = vec![0.0; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        26
    }
}

async fn assistant(reply: &str) -> (TempDir, Assistant, Arc<MockModel>) {
    let temp = tempfile::tempdir().unwrap();
    let store = VectorIndexStore::load(temp.path().join("index"), Arc::new(LetterCounts)).await.unwrap();
    let model = Arc::new(MockModel::with_reply(reply));
    let pipeline = RagPipeline::builder().store(Arc::new(store)).model(model.clone()).build().unwrap();
    let chats = ChatManager::open(temp.path().join("chats.json")).unwrap();
    (temp, Assistant::new(chats, pipeline), model)
}

#[tokio::test]
async fn ask_records_both_turns_and_uses_the_chat_prompt() {
    let (_temp, assistant, model) = assistant("Forty-two.").await;
    let chat = assistant.create_chat("guide", "", "Answer like a towel.").await.unwrap();
    assistant
        .upload(chat.id, &[UploadedFile::text("answer.txt", "The answer is forty-two.")])
        .await
        .unwrap();

    let answer = assistant.ask(chat.id, "What is the answer?", RetrievalStrategy::Plain, None).await.unwrap();
    assert_eq!(answer.text, "Forty-two.");
    assert_eq!(answer.sources.len(), 1);

    let chat = assistant.chat(chat.id).await.unwrap();
    assert_eq!(
        chat.messages,
        vec![Message::user("What is the answer?"), Message::assistant("Forty-two.")]
    );

    let sent = &model.calls()[0];
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].role, Role::System);
    assert!(sent[0].content.contains("Answer like a towel."));
    assert!(sent[0].content.contains("The answer is forty-two."));
}

#[tokio::test]
async fn chats_only_see_their_own_documents() {
    let (_temp, assistant, model) = assistant("ok").await;
    let a = assistant.create_chat("a", "", "").await.unwrap();
    let b = assistant.create_chat("b", "", "").await.unwrap();
    assistant.upload(a.id, &[UploadedFile::text("secret.txt", "only chat a knows this")]).await.unwrap();

    let answer = assistant.ask(b.id, "what does chat a know?", RetrievalStrategy::Plain, None).await.unwrap();
    assert!(answer.sources.is_empty());
    assert!(!model.calls()[0][0].content.contains("only chat a knows this"));
    assert!(assistant.documents(b.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_chat_purges_its_chunks() {
    let (_temp, assistant, _model) = assistant("ok").await;
    let keep = assistant.create_chat("keep", "", "").await.unwrap();
    let doomed = assistant.create_chat("drop", "", "").await.unwrap();
    assistant.upload(keep.id, &[UploadedFile::text("k.txt", "kept words")]).await.unwrap();
    assistant
        .upload(doomed.id, &[UploadedFile::text("d1.txt", "doomed"), UploadedFile::text("d2.txt", "gone")])
        .await
        .unwrap();
    let before = assistant.stats().await;

    let deleted = assistant.delete_chat(doomed.id).await.unwrap();
    assert_eq!(deleted.purged_chunks, 2);
    assert_eq!(assistant.stats().await.chunks, before.chunks - 2);
    assert!(assistant.pipeline().store().partition_chunks(&doomed.database_id).await.is_empty());
    assert_eq!(assistant.documents(keep.id).await.unwrap().len(), 1);
    assistant.verify().await.unwrap();
}

#[tokio::test]
async fn uploads_from_disk_skip_non_text_files() {
    let (temp, assistant, _model) = assistant("ok").await;
    let chat = assistant.create_chat("files", "", "").await.unwrap();
    let txt = temp.path().join("notes.txt");
    let pdf = temp.path().join("scan.pdf");
    std::fs::write(&txt, "plain notes").unwrap();
    std::fs::write(&pdf, "%PDF-1.7").unwrap();

    let report = assistant.upload_paths(chat.id, &[txt, pdf]).await.unwrap();
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].doc_name, "notes.txt");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "scan.pdf");

    let missing = assistant.upload_paths(chat.id, &[temp.path().join("nope.txt")]).await;
    assert!(matches!(missing, Err(AssistantError::Read { .. })));
}

#[tokio::test]
async fn unknown_chats_are_not_found() {
    let (_temp, assistant, model) = assistant("ok").await;
    let id = Uuid::new_v4();
    let err = assistant.ask(id, "hello?", RetrievalStrategy::Plain, None).await.unwrap_err();
    assert!(matches!(err, AssistantError::Session(SessionError::NotFound(_))));
    assert_eq!(model.call_count(), 0);
    assert!(matches!(
        assistant.delete_chat(id).await,
        Err(AssistantError::Session(SessionError::NotFound(_)))
    ));
}

#[tokio::test]
async fn document_deletion_through_the_assistant() {
    let (_temp, assistant, _model) = assistant("ok").await;
    let chat = assistant.create_chat("docs", "", "").await.unwrap();
    let report = assistant.upload(chat.id, &[UploadedFile::text("a.txt", "alpha")]).await.unwrap();
    let doc_id = &report.documents[0].doc_id;

    assert_eq!(assistant.delete_document(chat.id, doc_id).await.unwrap(), 1);
    assert_eq!(assistant.delete_document(chat.id, doc_id).await.unwrap(), 0);
    assert!(assistant.documents(chat.id).await.unwrap().is_empty());
}
