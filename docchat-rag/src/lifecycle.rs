//! Document lifecycle: ingest uploads, list a chat's documents, delete them.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::chunking::{Chunker, split_upload};
use crate::document::{Chunk, DocumentInfo, UploadedFile};
use crate::error::{RagError, Result};
use crate::store::{SEED_PARTITION, VectorIndexStore};

/// A file left out of an ingest batch, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Name of the upload.
    pub name: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Outcome of [`DocumentManager::ingest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Documents that were indexed.
    pub documents: Vec<DocumentInfo>,
    /// Uploads that were not indexed.
    pub skipped: Vec<SkippedFile>,
}

impl IngestReport {
    /// Total chunks written by the batch.
    pub fn chunk_count(&self) -> usize {
        self.documents.iter().map(|d| d.chunk_count).sum()
    }
}

fn summarize(chunks: &[Chunk]) -> Vec<DocumentInfo> {
    let mut docs: BTreeMap<&str, DocumentInfo> = BTreeMap::new();
    for chunk in chunks {
        docs.entry(chunk.doc_id.as_str())
            .or_insert_with(|| DocumentInfo {
                doc_id: chunk.doc_id.clone(),
                doc_name: chunk.doc_name.clone(),
                doc_size: chunk.doc_size,
                doc_date: chunk.doc_date,
                chunk_count: 0,
            })
            .chunk_count += 1;
    }
    let mut docs: Vec<DocumentInfo> = docs.into_values().collect();
    docs.sort_by(|a, b| {
        (a.doc_date, &a.doc_name, &a.doc_id).cmp(&(b.doc_date, &b.doc_name, &b.doc_id))
    });
    docs
}

fn check_partition(partition_key: &str) -> Result<()> {
    if partition_key.is_empty() || partition_key == SEED_PARTITION {
        return Err(RagError::ConfigError(format!("invalid partition key '{partition_key}'")));
    }
    Ok(())
}

/// Orchestrates document ingestion and deletion over a [`VectorIndexStore`].
///
/// Every mutating call changes the index and persists it as one step; a
/// failure leaves both the in-memory index and the on-disk snapshot as they
/// were.
pub struct DocumentManager {
    store: Arc<VectorIndexStore>,
    chunker: Arc<dyn Chunker>,
}

impl DocumentManager {
    /// Create a manager over `store`, splitting uploads with `chunker`.
    pub fn new(store: Arc<VectorIndexStore>, chunker: Arc<dyn Chunker>) -> Self {
        Self { store, chunker }
    }

    /// Return the underlying store.
    pub fn store(&self) -> &Arc<VectorIndexStore> {
        &self.store
    }

    /// Chunk, embed and index a batch of uploads for `partition_key`, then
    /// persist once.
    ///
    /// Uploads that are not `text/plain`, not valid UTF-8, or contain no text
    /// are skipped with a warning and listed in the report.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the provider fails, in which
    /// case nothing from the batch is indexed.
    pub async fn ingest(&self, files: &[UploadedFile], partition_key: &str) -> Result<IngestReport> {
        check_partition(partition_key)?;
        let today = Utc::now().date_naive();

        let mut report = IngestReport::default();
        let mut batch = Vec::new();
        for file in files {
            match split_upload(self.chunker.as_ref(), file, partition_key, today) {
                Ok(chunks) if chunks.is_empty() => {
                    warn!(file = %file.name, "skipping upload without text");
                    report.skipped.push(SkippedFile {
                        name: file.name.clone(),
                        reason: "file contains no text".into(),
                    });
                }
                Ok(chunks) => batch.extend(chunks),
                Err(e @ RagError::DecodeError { .. }) => {
                    warn!(file = %file.name, error = %e, "skipping upload");
                    report.skipped.push(SkippedFile { name: file.name.clone(), reason: e.to_string() });
                }
                Err(e) => return Err(e),
            }
        }

        if batch.is_empty() {
            info!(partition_key, skipped = report.skipped.len(), "nothing to ingest");
            return Ok(report);
        }

        report.documents = summarize(&batch);
        self.store.add_and_persist(batch).await?;
        info!(
            partition_key,
            documents = report.documents.len(),
            chunk_count = report.chunk_count(),
            skipped = report.skipped.len(),
            "ingested batch"
        );
        Ok(report)
    }

    /// One record per document stored under `partition_key`, regardless of chunk count.
    pub async fn list_documents(&self, partition_key: &str) -> Vec<DocumentInfo> {
        summarize(&self.store.partition_chunks(partition_key).await)
    }

    /// Delete every chunk of `doc_id` in `partition_key` and persist.
    ///
    /// Returns the number of chunks removed; zero when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptIndexError`] or [`RagError::PersistenceError`]
    /// if the deletion cannot be completed, in which case no chunk is removed.
    pub async fn delete_document(&self, doc_id: &str, partition_key: &str) -> Result<usize> {
        let ids = self.store.document_chunk_ids(doc_id, partition_key).await;
        if ids.is_empty() {
            info!(doc_id, partition_key, "no chunks to delete");
            return Ok(0);
        }
        let removed = self.store.delete_and_persist(&ids).await?;
        info!(doc_id, partition_key, removed, "deleted document");
        Ok(removed)
    }

    /// Delete every chunk under `partition_key` and persist. Used when a chat is removed.
    pub async fn purge_partition(&self, partition_key: &str) -> Result<usize> {
        let ids = self.store.partition_chunk_ids(partition_key).await;
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self.store.delete_and_persist(&ids).await?;
        info!(partition_key, removed, "purged partition");
        Ok(removed)
    }
}
