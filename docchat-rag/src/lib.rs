//! # docchat-rag
//!
//! Per-chat document index and retrieval engine for docchat.
//!
//! ## Overview
//!
//! Every chat owns a set of uploaded plain-text documents, but all chats share
//! one vector index. Each stored [`Chunk`] carries its chat's partition key and
//! every search is restricted to one partition.
//!
//! - [`RecursiveChunker`] - splits text into overlapping, boundary-aligned chunks
//! - [`EmbeddingProvider`] - turns text into fixed-dimension vectors
//! - [`VectorIndexStore`] - the shared, persisted, partitioned index
//! - [`DocumentManager`] - ingest, list and delete documents per chat
//! - [`Retriever`] - plain, query-expansion and relevance-validated retrieval
//! - [`RagPipeline`] - retrieval plus grounded answer generation
//!
//! ## Features
//!
//! - `openai` (default) - [`OpenAIEmbeddingProvider`](openai::OpenAIEmbeddingProvider)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docchat_rag::{RagPipeline, RetrievalStrategy, UploadedFile, VectorIndexStore};
//! use docchat_rag::openai::OpenAIEmbeddingProvider;
//!
//! let embedder = Arc::new(OpenAIEmbeddingProvider::from_env()?);
//! let store = Arc::new(VectorIndexStore::load("db/mvp_rag_database", embedder).await?);
//! let pipeline = RagPipeline::builder().store(store).model(model).build()?;
//!
//! pipeline.documents().ingest(&[UploadedFile::text("notes.txt", text)], "chat_1").await?;
//! let answer = pipeline
//!     .answer("What do the notes say?", "", "chat_1", RetrievalStrategy::Plain)
//!     .await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod flat;
pub mod lifecycle;
pub mod pipeline;
pub mod retrieval;
pub mod snapshot;
pub mod store;
pub mod validation;

#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, RecursiveChunker, TextSpan, split_upload};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, DocumentInfo, DocumentMeta, SearchResult, TEXT_PLAIN, UploadedFile};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use flat::{FlatIndex, Neighbor};
pub use lifecycle::{DocumentManager, IngestReport, SkippedFile};
pub use pipeline::{Answer, AnswerRequest, RagPipeline, RagPipelineBuilder};
pub use retrieval::{RetrievalStrategy, Retriever};
pub use store::{IndexStats, SEED_PARTITION, VectorIndexStore};
pub use validation::{RelevanceValidator, parse_relevance_score};
