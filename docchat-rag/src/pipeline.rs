//! RAG orchestrator.
//!
//! The [`RagPipeline`] wires the shared [`VectorIndexStore`], a [`Chunker`]
//! and a [`LanguageModel`] together. It owns the [`DocumentManager`] used for
//! uploads and the [`Retriever`] used for questions, and turns retrieved
//! chunks into a grounded prompt.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::{RagPipeline, RagConfig, RetrievalStrategy, VectorIndexStore};
//!
//! let store = Arc::new(VectorIndexStore::load("db/mvp_rag_database", embedder).await?);
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .store(store)
//!     .model(Arc::new(model))
//!     .build()?;
//!
//! pipeline.documents().ingest(&files, "chat_1").await?;
//! let text = pipeline.answer("What changed?", "Be brief.", "chat_1", RetrievalStrategy::Plain).await?;
//! ```

use std::sync::Arc;

use docchat_model::{LanguageModel, Message};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::lifecycle::DocumentManager;
use crate::retrieval::{RetrievalStrategy, Retriever};
use crate::store::VectorIndexStore;

/// A question to answer from one chat's documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// The user's question.
    pub question: String,
    /// The chat's system prompt.
    pub system_prompt: String,
    /// Partition key of the chat's documents.
    pub partition_key: String,
    /// Retrieval strategy for this request.
    #[serde(default)]
    pub strategy: RetrievalStrategy,
    /// Relevance theme for strategy 3; the question is used when absent.
    #[serde(default)]
    pub theme: Option<String>,
}

impl AnswerRequest {
    /// Create a plain-retrieval request.
    pub fn new(
        question: impl Into<String>,
        system_prompt: impl Into<String>,
        partition_key: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            system_prompt: system_prompt.into(),
            partition_key: partition_key.into(),
            strategy: RetrievalStrategy::default(),
            theme: None,
        }
    }

    /// Use `strategy` for retrieval.
    pub fn with_strategy(mut self, strategy: RetrievalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Score relevance against `theme` instead of the question.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }
}

/// A model answer and the chunks it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The model's completion, verbatim.
    pub text: String,
    /// Retrieved chunks, in the order they appear in the context.
    pub sources: Vec<SearchResult>,
}

/// Join chunk texts into the grounding context. Empty when nothing was retrieved.
pub fn build_context(results: &[SearchResult]) -> String {
    results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n")
}

/// Build the `[system, user]` message pair sent to the model.
pub fn build_messages(question: &str, system_prompt: &str, context: &str) -> Vec<Message> {
    let mut instruction = String::new();
    if !system_prompt.trim().is_empty() {
        instruction.push_str(system_prompt.trim());
        instruction.push_str("\n\n");
    }
    instruction.push_str("You are an intelligent assistant. Use the following context: ");
    instruction.push_str(context);
    instruction.push_str("\nThe answer must be accurate, concise and structured.");
    vec![Message::system(instruction), Message::user(question)]
}

/// The RAG orchestrator. Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    store: Arc<VectorIndexStore>,
    model: Arc<dyn LanguageModel>,
    documents: DocumentManager,
    retriever: Retriever,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return the shared index.
    pub fn store(&self) -> &Arc<VectorIndexStore> {
        &self.store
    }

    /// Return the language model.
    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }

    /// Return the document lifecycle manager.
    pub fn documents(&self) -> &DocumentManager {
        &self.documents
    }

    /// Return the retriever.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer `question` from the documents of `partition_key` and return the
    /// completion text verbatim.
    ///
    /// When nothing is retrieved the context is empty and the model answers
    /// ungrounded.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if retrieval cannot embed the
    /// question and [`RagError::ModelError`] if a model call fails.
    pub async fn answer(
        &self,
        question: &str,
        system_prompt: &str,
        partition_key: &str,
        strategy: RetrievalStrategy,
    ) -> Result<String> {
        let request = AnswerRequest::new(question, system_prompt, partition_key).with_strategy(strategy);
        Ok(self.respond(&request).await?.text)
    }

    /// Like [`answer`](Self::answer), also returning the chunks used as context.
    pub async fn respond(&self, request: &AnswerRequest) -> Result<Answer> {
        let sources = self
            .retriever
            .retrieve(
                &request.question,
                &request.partition_key,
                request.strategy,
                request.theme.as_deref(),
            )
            .await?;

        let context = build_context(&sources);
        let messages = build_messages(&request.question, &request.system_prompt, &context);
        let text = self.model.complete(&messages).await.map_err(|e| {
            error!(partition_key = %request.partition_key, error = %e, "answer generation failed");
            RagError::from(e)
        })?;

        info!(
            partition_key = %request.partition_key,
            strategy = %request.strategy,
            source_count = sources.len(),
            context_chars = context.chars().count(),
            "answered question"
        );
        Ok(Answer { text, sources })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `store` and `model` are required. `config` defaults to
/// [`RagConfig::default()`] and `chunker` to a [`RecursiveChunker`] sized
/// from the config.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    store: Option<Arc<VectorIndexStore>>,
    model: Option<Arc<dyn LanguageModel>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the shared index.
    pub fn store(mut self, store: Arc<VectorIndexStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the language model used for answers, expansion and validation.
    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `store` or `model` is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let store = self.store.ok_or_else(|| RagError::ConfigError("store is required".to_string()))?;
        let model = self.model.ok_or_else(|| RagError::ConfigError("model is required".to_string()))?;
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(RecursiveChunker::from_config(&config)));

        Ok(RagPipeline {
            documents: DocumentManager::new(Arc::clone(&store), chunker),
            retriever: Retriever::new(Arc::clone(&store), Arc::clone(&model), config.clone()),
            config,
            store,
            model,
        })
    }
}
