//! Data types for uploaded files, chunks, document listings and search results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The only mime type the chunking pipeline accepts.
pub const TEXT_PLAIN: &str = "text/plain";

/// A file handed to [`DocumentManager::ingest`](crate::DocumentManager::ingest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Display name, usually the original file name.
    pub name: String,
    /// Declared mime type. Only [`TEXT_PLAIN`] is indexed.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Upload date recorded on every chunk. Defaults to today when `None`.
    pub date: Option<NaiveDate>,
}

impl UploadedFile {
    /// Create an upload dated today.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime_type: mime_type.into(), bytes, date: None }
    }

    /// Create a `text/plain` upload from a string.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, TEXT_PLAIN, text.into().into_bytes())
    }

    /// Override the upload date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Metadata shared by every chunk of one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Chat-scoped partition key the document belongs to.
    pub partition_key: String,
    /// Identifier shared by all chunks of the document.
    pub doc_id: String,
    /// Original file name.
    pub doc_name: String,
    /// Size of the uploaded file in bytes.
    pub doc_size: u64,
    /// Upload date.
    pub doc_date: NaiveDate,
}

impl DocumentMeta {
    /// Create metadata with a freshly generated `doc_id`.
    pub fn new(
        partition_key: impl Into<String>,
        doc_name: impl Into<String>,
        doc_size: u64,
        doc_date: NaiveDate,
    ) -> Self {
        Self {
            partition_key: partition_key.into(),
            doc_id: format!("doc_id_{}", Uuid::new_v4()),
            doc_name: doc_name.into(),
            doc_size,
            doc_date,
        }
    }
}

/// A bounded span of a document's text, stored as one retrievable unit.
///
/// Chunks are immutable once stored. While a chunk lives in the index its
/// vector is held by the nearest-neighbor structure; `embedding` is filled in
/// again on the copies returned from a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: Uuid,
    /// The text content of the chunk.
    pub text: String,
    /// Chat-scoped partition key.
    pub partition_key: String,
    /// Identifier of the owning document.
    pub doc_id: String,
    /// Name of the owning document.
    pub doc_name: String,
    /// Size of the owning document in bytes.
    pub doc_size: u64,
    /// Upload date of the owning document.
    pub doc_date: NaiveDate,
    /// Position of the chunk within its document.
    pub chunk_index: usize,
    /// Character offset of the chunk within its document.
    pub start: usize,
    /// The vector embedding for this chunk's text. Empty until embedded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create an unembedded chunk with a fresh random id.
    pub fn new(meta: &DocumentMeta, text: impl Into<String>, chunk_index: usize, start: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            partition_key: meta.partition_key.clone(),
            doc_id: meta.doc_id.clone(),
            doc_name: meta.doc_name.clone(),
            doc_size: meta.doc_size,
            doc_date: meta.doc_date,
            chunk_index,
            start,
            embedding: Vec::new(),
        }
    }

    /// Whether the chunk already carries an embedding.
    pub fn is_embedded(&self) -> bool {
        !self.embedding.is_empty()
    }
}

/// One logical document, derived from its chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Identifier shared by all chunks of the document.
    pub doc_id: String,
    /// Original file name.
    pub doc_name: String,
    /// Size of the uploaded file in bytes.
    pub doc_size: u64,
    /// Upload date.
    pub doc_date: NaiveDate,
    /// Number of chunks currently stored for the document.
    pub chunk_count: usize,
}

/// A retrieved [`Chunk`] paired with its distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Squared Euclidean distance to the query embedding (lower is more relevant).
    pub distance: f32,
}
