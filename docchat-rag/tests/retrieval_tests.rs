//! Retrieval strategies and answer generation with a scripted model.

mod common;

use std::sync::Arc;

use common::memory_store;
use docchat_model::{LanguageModel, Message, MockModel, ModelError, Role};
use docchat_rag::{
    AnswerRequest, Chunk, DocumentMeta, RagConfig, RagError, RagPipeline, RetrievalStrategy,
    Retriever, UploadedFile, VectorIndexStore,
};

fn meta(pk: &str) -> DocumentMeta {
    DocumentMeta::new(pk, "notes.txt", 100, chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
}

async fn store_with(pk: &str, texts: &[&str]) -> Arc<VectorIndexStore> {
    let store = memory_store().await;
    let meta = meta(pk);
    let chunks = texts.iter().enumerate().map(|(i, t)| Chunk::new(&meta, *t, i, 0)).collect();
    store.add(chunks).await.unwrap();
    store
}

fn user_text(messages: &[Message]) -> String {
    messages.iter().filter(|m| m.role == Role::User).map(|m| m.content.clone()).collect()
}

/// Scores passages by the keyword they contain.
fn scoring_model() -> MockModel {
    MockModel::new(|messages: &[Message]| {
        let text = user_text(messages);
        let score = if text.contains("alpha") {
            "90"
        } else if text.contains("beta") {
            "50%"
        } else if text.contains("gamma") {
            "Relevance: 71%"
        } else if text.contains("delta") {
            "70"
        } else {
            "no idea"
        };
        Ok(score.to_string())
    })
}

#[tokio::test]
async fn validation_keeps_only_scores_above_seventy() {
    let store = store_with("c1", &["alpha report", "beta report", "gamma report", "delta report"]).await;
    let model = Arc::new(scoring_model());
    let retriever = Retriever::new(store, model.clone(), RagConfig::default());

    let results = retriever
        .retrieve("report", "c1", RetrievalStrategy::RelevanceValidated, None)
        .await
        .unwrap();

    let mut kept: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
    kept.sort_unstable();
    assert_eq!(kept, ["alpha report", "gamma report"]);
    assert_eq!(model.call_count(), 4);
}

#[tokio::test]
async fn validation_scores_against_the_theme_when_given() {
    let store = store_with("c1", &["alpha report"]).await;
    let model = Arc::new(scoring_model());
    let retriever = Retriever::new(store, model.clone(), RagConfig::default());

    retriever
        .retrieve("report", "c1", RetrievalStrategy::RelevanceValidated, Some("quarterly finance"))
        .await
        .unwrap();
    assert!(user_text(&model.calls()[0]).contains("Request topic: quarterly finance"));
}

#[tokio::test]
async fn unreadable_scores_exclude_only_that_chunk() {
    let store = store_with("c1", &["alpha report", "epsilon report"]).await;
    let retriever = Retriever::new(store, Arc::new(scoring_model()), RagConfig::default());

    let results = retriever
        .retrieve("report", "c1", RetrievalStrategy::RelevanceValidated, None)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.text, "alpha report");
}

#[tokio::test]
async fn model_failure_during_validation_is_surfaced() {
    let store = store_with("c1", &["alpha report"]).await;
    let model = MockModel::new(|_: &[Message]| {
        Err(ModelError::Api { provider: "mock".into(), status: 503, message: "overloaded".into() })
    });
    let retriever = Retriever::new(store, Arc::new(model), RagConfig::default());

    let err = retriever
        .retrieve("report", "c1", RetrievalStrategy::RelevanceValidated, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::ModelError(_)));
}

#[tokio::test]
async fn query_expansion_unions_results_without_duplicates() {
    let store = store_with("c1", &["apples grow on trees", "bananas are yellow", "cherries are red"]).await;
    let model = Arc::new(MockModel::with_reply("1. bananas yellow\n2. cherries red\n3. apples trees"));
    let config = RagConfig::builder().top_k(1).build().unwrap();
    let retriever = Retriever::new(store, model.clone(), config);

    let results = retriever
        .retrieve("apples grow", "c1", RetrievalStrategy::QueryExpansion, None)
        .await
        .unwrap();

    let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
    assert_eq!(texts, ["apples grow on trees", "bananas are yellow", "cherries are red"]);
    assert_eq!(model.call_count(), 1);
    assert!(model.calls()[0][0].content.contains("generate 3 different versions"));
}

#[tokio::test]
async fn strategies_never_cross_partitions() {
    let store = store_with("c1", &["shared words here"]).await;
    let other = meta("c2");
    store.add(vec![Chunk::new(&other, "shared words here too", 0, 0)]).await.unwrap();
    let model: Arc<dyn LanguageModel> = Arc::new(MockModel::new(|messages: &[Message]| {
        Ok(if messages[0].content.contains("versions") { "shared words".into() } else { "99".into() })
    }));
    let retriever = Retriever::new(store, model, RagConfig::default());

    for strategy in [
        RetrievalStrategy::Plain,
        RetrievalStrategy::QueryExpansion,
        RetrievalStrategy::RelevanceValidated,
    ] {
        let results = retriever.retrieve("shared words", "c2", strategy, None).await.unwrap();
        assert_eq!(results.len(), 1, "{strategy}");
        assert!(results.iter().all(|r| r.chunk.partition_key == "c2"));
    }
}

#[tokio::test]
async fn answer_grounds_the_model_in_retrieved_chunks() {
    let store = memory_store().await;
    let model = Arc::new(MockModel::with_reply("The launch is on Friday."));
    let pipeline = RagPipeline::builder().store(store).model(model.clone()).build().unwrap();
    pipeline
        .documents()
        .ingest(&[UploadedFile::text("plan.txt", "The launch is scheduled for Friday.")], "c1")
        .await
        .unwrap();

    let answer = pipeline
        .answer("When is the launch?", "Answer in one sentence.", "c1", RetrievalStrategy::Plain)
        .await
        .unwrap();
    assert_eq!(answer, "The launch is on Friday.");

    let sent = &model.calls()[0];
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].role, Role::System);
    assert!(sent[0].content.contains("Answer in one sentence."));
    assert!(sent[0].content.contains("Use the following context: The launch is scheduled for Friday."));
    assert_eq!(sent[1], Message::user("When is the launch?"));
}

#[tokio::test]
async fn answer_without_documents_uses_an_empty_context() {
    let model = Arc::new(MockModel::with_reply("I don't know."));
    let pipeline = RagPipeline::builder().store(memory_store().await).model(model.clone()).build().unwrap();

    let answer = pipeline
        .respond(&AnswerRequest::new("Anything?", "", "c9").with_strategy(RetrievalStrategy::Plain))
        .await
        .unwrap();
    assert_eq!(answer.text, "I don't know.");
    assert!(answer.sources.is_empty());
    assert!(model.calls()[0][0].content.contains("Use the following context: \n"));
}
