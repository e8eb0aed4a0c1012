//! The shared, partitioned vector index store.
//!
//! One [`VectorIndexStore`] holds the chunks of every chat. Each chunk is
//! tagged with its chat's partition key, and every search is restricted to a
//! single partition by an inline filter over an explicit
//! `partition_key -> chunk ids` secondary index.
//!
//! Internally three structures must stay in step: the slot map
//! (slot id <-> chunk id), the chunk store, and the [`FlatIndex`] of
//! embeddings keyed by slot id. Every mutation runs under one write lock,
//! re-checks that invariant, and is rolled back if the check or the
//! following persist fails.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::document::{Chunk, DocumentMeta, SearchResult};
use crate::embedding::{EmbeddingProvider, check_dimensions};
use crate::error::{RagError, Result};
use crate::flat::FlatIndex;
use crate::snapshot::{self, DocstoreFile, VectorsFile};

/// Partition key of the placeholder chunk every fresh store is seeded with.
///
/// No search, listing or lifecycle operation ever sees this partition.
pub const SEED_PARTITION: &str = "__docchat_seed__";

const SEED_TEXT: &str = "docchat index seed";

/// Counters describing the current index contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Points in the nearest-neighbor structure.
    pub slots: usize,
    /// Stored chunk records.
    pub chunks: usize,
    /// Distinct partition keys, the seed partition included.
    pub partitions: usize,
    /// Distinct documents, the seed document included.
    pub documents: usize,
}

#[derive(Debug, Clone, Default)]
struct IndexState {
    index: FlatIndex,
    slot_to_chunk: BTreeMap<u64, Uuid>,
    chunk_to_slot: HashMap<Uuid, u64>,
    chunks: HashMap<Uuid, Chunk>,
    by_partition: HashMap<String, BTreeSet<Uuid>>,
    by_document: HashMap<String, BTreeSet<Uuid>>,
    next_slot: u64,
}

impl IndexState {
    fn new(dimensions: usize) -> Self {
        Self { index: FlatIndex::new(dimensions), ..Self::default() }
    }

    fn from_files(vectors: VectorsFile, docstore: DocstoreFile) -> Result<Self> {
        let dimensions = vectors.dimensions;
        if let Some(v) = vectors.vectors.iter().find(|v| v.len() != dimensions) {
            return Err(RagError::CorruptIndexError(format!(
                "stored vector has {} dimensions, index declares {dimensions}",
                v.len()
            )));
        }
        let flat: Vec<f32> = vectors.vectors.into_iter().flatten().collect();
        let index = FlatIndex::from_parts(dimensions, vectors.slots, flat)?;

        let mut state = Self {
            index,
            slot_to_chunk: docstore.slots,
            next_slot: docstore.next_slot,
            ..Self::default()
        };
        for (slot, id) in &state.slot_to_chunk {
            if state.chunk_to_slot.insert(*id, *slot).is_some() {
                return Err(RagError::CorruptIndexError(format!("chunk {id} owns several slots")));
            }
        }
        for (id, chunk) in docstore.chunks {
            if chunk.id != id {
                return Err(RagError::CorruptIndexError(format!(
                    "chunk record {} stored under key {id}",
                    chunk.id
                )));
            }
            state.link(&chunk);
            state.chunks.insert(id, chunk);
        }
        state.verify()?;
        Ok(state)
    }

    fn to_files(&self) -> (VectorsFile, DocstoreFile) {
        let (dimensions, slots, flat) = self.index.parts();
        let vectors = VectorsFile {
            dimensions,
            slots: slots.to_vec(),
            vectors: flat.chunks(dimensions.max(1)).map(<[f32]>::to_vec).collect(),
        };
        let docstore = DocstoreFile {
            next_slot: self.next_slot,
            slots: self.slot_to_chunk.clone(),
            chunks: self.chunks.iter().map(|(id, c)| (*id, c.clone())).collect(),
        };
        (vectors, docstore)
    }

    fn link(&mut self, chunk: &Chunk) {
        self.by_partition.entry(chunk.partition_key.clone()).or_default().insert(chunk.id);
        self.by_document.entry(chunk.doc_id.clone()).or_default().insert(chunk.id);
    }

    fn unlink(&mut self, chunk: &Chunk) {
        for (map, key) in
            [(&mut self.by_partition, &chunk.partition_key), (&mut self.by_document, &chunk.doc_id)]
        {
            if let Some(ids) = map.get_mut(key) {
                ids.remove(&chunk.id);
                if ids.is_empty() {
                    map.remove(key);
                }
            }
        }
    }

    fn insert(&mut self, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Vec<u64>> {
        let mut fresh = HashSet::with_capacity(chunks.len());
        if let Some(c) = chunks.iter().find(|c| self.chunks.contains_key(&c.id) || !fresh.insert(c.id))
        {
            return Err(RagError::ConfigError(format!("chunk {} is already stored", c.id)));
        }

        let slots: Vec<u64> = (self.next_slot..self.next_slot + chunks.len() as u64).collect();
        self.index.add_with_ids(&slots, &vectors)?;
        self.next_slot += chunks.len() as u64;

        for (slot, mut chunk) in slots.iter().zip(chunks) {
            chunk.embedding = Vec::new();
            self.slot_to_chunk.insert(*slot, chunk.id);
            self.chunk_to_slot.insert(chunk.id, *slot);
            self.link(&chunk);
            self.chunks.insert(chunk.id, chunk);
        }
        Ok(slots)
    }

    fn remove(&mut self, ids: &[Uuid]) -> usize {
        let mut doomed = HashSet::with_capacity(ids.len());
        for id in ids {
            let Some(slot) = self.chunk_to_slot.remove(id) else { continue };
            self.slot_to_chunk.remove(&slot);
            if let Some(chunk) = self.chunks.remove(id) {
                self.unlink(&chunk);
            }
            doomed.insert(slot);
        }
        if doomed.is_empty() {
            return 0;
        }

        let removed = self.index.remove_ids(&doomed);
        if self.chunks.is_empty() {
            self.index.reset();
            self.slot_to_chunk.clear();
            self.chunk_to_slot.clear();
            self.by_partition.clear();
            self.by_document.clear();
            self.next_slot = 0;
        }
        removed
    }

    /// Check that slots, chunk records, the vector index and the secondary indexes agree.
    fn verify(&self) -> Result<()> {
        let corrupt = |msg: String| Err(RagError::CorruptIndexError(msg));

        if self.index.len() != self.slot_to_chunk.len() {
            return corrupt(format!(
                "{} points in the vector index but {} mapped slots",
                self.index.len(),
                self.slot_to_chunk.len()
            ));
        }
        if let Some(slot) = self.index.slots().iter().find(|s| !self.slot_to_chunk.contains_key(*s)) {
            return corrupt(format!("orphan slot {slot} has no chunk"));
        }
        if self.chunks.len() != self.slot_to_chunk.len()
            || self.chunk_to_slot.len() != self.slot_to_chunk.len()
        {
            return corrupt(format!(
                "{} chunk records for {} slots",
                self.chunks.len(),
                self.slot_to_chunk.len()
            ));
        }
        for (slot, id) in &self.slot_to_chunk {
            if self.chunk_to_slot.get(id) != Some(slot) {
                return corrupt(format!("slot {slot} and chunk {id} disagree"));
            }
            let Some(chunk) = self.chunks.get(id) else {
                return corrupt(format!("slot {slot} points to missing chunk {id}"));
            };
            let in_partition =
                self.by_partition.get(&chunk.partition_key).is_some_and(|s| s.contains(id));
            let in_document = self.by_document.get(&chunk.doc_id).is_some_and(|s| s.contains(id));
            if !in_partition || !in_document {
                return corrupt(format!("chunk {id} missing from the partition or document index"));
            }
            if *slot >= self.next_slot {
                return corrupt(format!("slot {slot} is not below next slot {}", self.next_slot));
            }
        }
        let linked: usize = self.by_partition.values().map(BTreeSet::len).sum();
        if linked != self.chunks.len() {
            return corrupt(format!(
                "partition index lists {linked} chunks, store holds {}",
                self.chunks.len()
            ));
        }
        Ok(())
    }
}

/// A single vector index shared by all chats, partitioned by chat.
///
/// Construct one at process start with [`VectorIndexStore::load`] (or
/// [`VectorIndexStore::in_memory`] for tests) and share it behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::VectorIndexStore;
///
/// let store = VectorIndexStore::load("db/mvp_rag_database", embedder).await?;
/// let slots = store.add(chunks).await?;
/// let hits = store.search("what is a slot?", 10, "chat_1").await?;
/// store.persist().await?;
/// ```
pub struct VectorIndexStore {
    embedder: Arc<dyn EmbeddingProvider>,
    path: Option<PathBuf>,
    state: RwLock<IndexState>,
}

impl VectorIndexStore {
    /// Open the index persisted at `path`, or seed and persist a fresh one if
    /// nothing is there.
    ///
    /// A fresh store always holds one placeholder chunk in [`SEED_PARTITION`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptIndexError`] if the persisted files are
    /// inconsistent, [`RagError::ConfigError`] if they were built for another
    /// embedding dimensionality, and [`RagError::EmbeddingError`] if seeding
    /// needs the provider and it fails.
    pub async fn load(path: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let path = path.into();
        match snapshot::read(&path)? {
            Some((vectors, docstore)) => {
                let state = IndexState::from_files(vectors, docstore).map_err(|e| {
                    error!(path = %path.display(), error = %e, "index failed consistency check");
                    e
                })?;
                if state.index.dimensions() != embedder.dimensions() {
                    return Err(RagError::ConfigError(format!(
                        "index at {} holds {}-dimensional vectors, embedding provider produces {}",
                        path.display(),
                        state.index.dimensions(),
                        embedder.dimensions()
                    )));
                }
                info!(path = %path.display(), slots = state.index.len(), "loaded index");
                Ok(Self { embedder, path: Some(path), state: RwLock::new(state) })
            }
            None => {
                let state = Self::seed(embedder.as_ref()).await?;
                let (vectors, docstore) = state.to_files();
                snapshot::write(&path, &vectors, &docstore)?;
                info!(path = %path.display(), "created new index");
                Ok(Self { embedder, path: Some(path), state: RwLock::new(state) })
            }
        }
    }

    /// Create a seeded store that is never written to disk.
    pub async fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let state = Self::seed(embedder.as_ref()).await?;
        Ok(Self { embedder, path: None, state: RwLock::new(state) })
    }

    async fn seed(embedder: &dyn EmbeddingProvider) -> Result<IndexState> {
        let vector = embedder.embed(SEED_TEXT).await?;
        check_dimensions(embedder.dimensions(), std::slice::from_ref(&vector))?;

        let meta = DocumentMeta {
            partition_key: SEED_PARTITION.to_string(),
            doc_id: SEED_PARTITION.to_string(),
            doc_name: SEED_PARTITION.to_string(),
            doc_size: 0,
            doc_date: Utc::now().date_naive(),
        };
        let mut state = IndexState::new(embedder.dimensions());
        state.insert(vec![Chunk::new(&meta, SEED_TEXT, 0, 0)], vec![vector])?;
        Ok(state)
    }

    /// The directory this store persists to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The embedding provider used for chunks and queries.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Embed chunks that carry no embedding yet. Does not touch the index.
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let pending: Vec<&str> =
            chunks.iter().filter(|c| !c.is_embedded()).map(|c| c.text.as_str()).collect();
        let mut computed = if pending.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed_batch(&pending).await?
        };
        if computed.len() != pending.len() {
            return Err(RagError::EmbeddingError {
                provider: "batch".into(),
                message: format!("{} embeddings returned for {} texts", computed.len(), pending.len()),
            });
        }

        computed.reverse();
        let vectors: Vec<Vec<f32>> = chunks
            .iter()
            .map(|c| if c.is_embedded() { c.embedding.clone() } else { computed.pop().unwrap_or_default() })
            .collect();
        check_dimensions(self.embedder.dimensions(), &vectors)?;
        Ok(vectors)
    }

    /// Run `mutation` under the write lock, verify the result, optionally
    /// persist, and restore the previous state if any step fails.
    async fn transact<T>(
        &self,
        persist: bool,
        mutation: impl FnOnce(&mut IndexState) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.write().await;
        let before = state.clone();

        let outcome = mutation(&mut *state).and_then(|value| {
            state.verify()?;
            if persist {
                self.write_snapshot(&*state)?;
            }
            Ok(value)
        });
        if let Err(e) = &outcome {
            error!(error = %e, "index mutation rolled back");
            *state = before;
        }
        outcome
    }

    fn write_snapshot(&self, state: &IndexState) -> Result<()> {
        match &self.path {
            Some(path) => {
                let (vectors, docstore) = state.to_files();
                snapshot::write(path, &vectors, &docstore)
            }
            None => {
                debug!("in-memory index, skipping persist");
                Ok(())
            }
        }
    }

    fn reject_reserved(chunks: &[Chunk]) -> Result<()> {
        match chunks.iter().find(|c| c.partition_key == SEED_PARTITION) {
            Some(c) => Err(RagError::ConfigError(format!(
                "chunk {} uses the reserved partition key '{SEED_PARTITION}'",
                c.id
            ))),
            None => Ok(()),
        }
    }

    /// Embed (where needed) and insert chunks, returning their new slot ids.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the provider fails; the index
    /// is left untouched in that case.
    pub async fn add(&self, chunks: Vec<Chunk>) -> Result<Vec<u64>> {
        self.add_inner(chunks, false).await
    }

    /// Like [`add`](Self::add), then persist, as one step: if persisting
    /// fails the chunks are removed again.
    pub async fn add_and_persist(&self, chunks: Vec<Chunk>) -> Result<Vec<u64>> {
        self.add_inner(chunks, true).await
    }

    async fn add_inner(&self, chunks: Vec<Chunk>, persist: bool) -> Result<Vec<u64>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        Self::reject_reserved(&chunks)?;
        let vectors = self.embed_chunks(&chunks).await?;
        let count = chunks.len();
        let slots = self.transact(persist, |state| state.insert(chunks, vectors)).await?;
        info!(chunk_count = count, persisted = persist, "added chunks to index");
        Ok(slots)
    }

    /// Return up to `k` chunks of `partition_key` closest to `query`, closest first.
    ///
    /// Unknown or empty partitions yield an empty list, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the query cannot be embedded.
    pub async fn search(&self, query: &str, k: usize, partition_key: &str) -> Result<Vec<SearchResult>> {
        if k == 0 || partition_key == SEED_PARTITION || !self.has_partition(partition_key).await {
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed(query).await?;
        check_dimensions(self.embedder.dimensions(), std::slice::from_ref(&embedding))?;

        let state = self.state.read().await;
        let Some(allowed) = state.by_partition.get(partition_key) else {
            return Ok(Vec::new());
        };
        let hits = state.index.search(&embedding, k, |slot| {
            state.slot_to_chunk.get(&slot).is_some_and(|id| allowed.contains(id))
        });

        let results: Vec<SearchResult> = hits
            .into_iter()
            .filter_map(|hit| {
                let id = state.slot_to_chunk.get(&hit.slot)?;
                let mut chunk = state.chunks.get(id)?.clone();
                chunk.embedding = state.index.vector(hit.slot)?.to_vec();
                Some(SearchResult { chunk, distance: hit.distance })
            })
            .collect();
        debug!(partition_key, k, result_count = results.len(), "similarity search");
        Ok(results)
    }

    /// Remove chunks by id in one batch. Unknown ids are ignored.
    ///
    /// Returns the number of chunks removed. When no chunk is left the
    /// nearest-neighbor structure is reset.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptIndexError`] if the index is inconsistent
    /// afterwards; the deletion is rolled back.
    pub async fn delete(&self, ids: &[Uuid]) -> Result<usize> {
        self.delete_inner(ids, false).await
    }

    /// Like [`delete`](Self::delete), then persist, as one step: if
    /// persisting fails nothing is removed.
    pub async fn delete_and_persist(&self, ids: &[Uuid]) -> Result<usize> {
        self.delete_inner(ids, true).await
    }

    async fn delete_inner(&self, ids: &[Uuid], persist: bool) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self.transact(persist, |state| Ok(state.remove(ids))).await?;
        info!(requested = ids.len(), removed, persisted = persist, "deleted chunks from index");
        Ok(removed)
    }

    /// Write the whole store to its directory.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] for an in-memory store.
    pub async fn persist(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| RagError::ConfigError("in-memory index has no persistence path".into()))?;
        self.persist_to(path).await
    }

    /// Write the whole store to `dir`.
    pub async fn persist_to(&self, dir: &Path) -> Result<()> {
        let state = self.state.read().await;
        let (vectors, docstore) = state.to_files();
        snapshot::write(dir, &vectors, &docstore)
    }

    async fn has_partition(&self, partition_key: &str) -> bool {
        self.state.read().await.by_partition.contains_key(partition_key)
    }

    /// Every chunk stored under `partition_key`, ordered by document then chunk index.
    pub async fn partition_chunks(&self, partition_key: &str) -> Vec<Chunk> {
        if partition_key == SEED_PARTITION {
            return Vec::new();
        }
        let state = self.state.read().await;
        let mut chunks: Vec<Chunk> = state
            .by_partition
            .get(partition_key)
            .into_iter()
            .flatten()
            .filter_map(|id| state.chunks.get(id).cloned())
            .collect();
        chunks.sort_by(|a, b| a.doc_id.cmp(&b.doc_id).then(a.chunk_index.cmp(&b.chunk_index)));
        chunks
    }

    /// Ids of every chunk of `doc_id` that lives in `partition_key`.
    pub async fn document_chunk_ids(&self, doc_id: &str, partition_key: &str) -> Vec<Uuid> {
        if partition_key == SEED_PARTITION {
            return Vec::new();
        }
        let state = self.state.read().await;
        state
            .by_document
            .get(doc_id)
            .into_iter()
            .flatten()
            .filter(|id| state.chunks.get(id).is_some_and(|c| c.partition_key == partition_key))
            .copied()
            .collect()
    }

    /// Ids of every chunk in `partition_key`.
    pub async fn partition_chunk_ids(&self, partition_key: &str) -> Vec<Uuid> {
        if partition_key == SEED_PARTITION {
            return Vec::new();
        }
        let state = self.state.read().await;
        state.by_partition.get(partition_key).into_iter().flatten().copied().collect()
    }

    /// Current index counters.
    pub async fn stats(&self) -> IndexStats {
        let state = self.state.read().await;
        IndexStats {
            dimensions: state.index.dimensions(),
            slots: state.index.len(),
            chunks: state.chunks.len(),
            partitions: state.by_partition.len(),
            documents: state.by_document.len(),
        }
    }

    /// Slot ids in the nearest-neighbor structure and in the slot map, in that order.
    pub async fn slot_sets(&self) -> (BTreeSet<u64>, BTreeSet<u64>) {
        let state = self.state.read().await;
        (
            state.index.slots().iter().copied().collect(),
            state.slot_to_chunk.keys().copied().collect(),
        )
    }

    /// Run the full consistency check.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptIndexError`] describing the first violation.
    pub async fn verify(&self) -> Result<()> {
        self.state.read().await.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    /// Embeds text as (length, vowel count, 1.0).
    struct ShapeEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ShapeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count();
            Ok(vec![text.len() as f32, vowels as f32, 1.0])
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn chunk(pk: &str, doc: &str, text: &str) -> Chunk {
        let meta = DocumentMeta {
            partition_key: pk.into(),
            doc_id: doc.into(),
            doc_name: format!("{doc}.txt"),
            doc_size: 10,
            doc_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        Chunk::new(&meta, text, 0, 0)
    }

    async fn store() -> VectorIndexStore {
        VectorIndexStore::in_memory(Arc::new(ShapeEmbedder)).await.unwrap()
    }

    #[tokio::test]
    async fn fresh_store_holds_only_the_seed() {
        let store = store().await;
        let stats = store.stats().await;
        assert_eq!(stats.slots, 1);
        assert_eq!(stats.chunks, 1);
        assert!(store.search("anything", 10, SEED_PARTITION).await.unwrap().is_empty());
        assert!(store.search("anything", 10, "c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_reserved_partition() {
        let store = store().await;
        let err = store.add(vec![chunk(SEED_PARTITION, "d", "x")]).await.unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }

    #[tokio::test]
    async fn pre_embedded_chunks_keep_their_vectors() {
        let store = store().await;
        let mut c = chunk("c1", "d", "ignored text");
        c.embedding = vec![100.0, 100.0, 100.0];
        let id = c.id;
        store.add(vec![c]).await.unwrap();

        let hits = store.search("zz", 1, "c1").await.unwrap();
        assert_eq!(hits[0].chunk.id, id);
        assert_eq!(hits[0].chunk.embedding, vec![100.0, 100.0, 100.0]);
    }

    #[tokio::test]
    async fn wrong_dimensions_leave_index_untouched() {
        let store = store().await;
        let mut c = chunk("c1", "d", "x");
        c.embedding = vec![1.0];
        assert!(matches!(store.add(vec![c]).await, Err(RagError::EmbeddingError { .. })));
        assert_eq!(store.stats().await.slots, 1);
    }

    #[tokio::test]
    async fn deleting_everything_resets_the_structure() {
        let store = store().await;
        store.add(vec![chunk("c1", "d", "abc")]).await.unwrap();
        let mut all: Vec<Uuid> = store.partition_chunk_ids("c1").await;
        all.extend(store.state.read().await.by_partition[SEED_PARTITION].iter().copied());

        assert_eq!(store.delete(&all).await.unwrap(), 2);
        let stats = store.stats().await;
        assert_eq!((stats.slots, stats.chunks, stats.partitions), (0, 0, 0));
        assert_eq!(store.state.read().await.next_slot, 0);
        assert!(store.search("abc", 5, "c1").await.unwrap().is_empty());
        store.verify().await.unwrap();
    }

    #[tokio::test]
    async fn verify_detects_orphan_slot() {
        let store = store().await;
        store.add(vec![chunk("c1", "d", "abc")]).await.unwrap();
        {
            let mut state = store.state.write().await;
            let slot = *state.slot_to_chunk.keys().next_back().unwrap();
            state.slot_to_chunk.remove(&slot);
        }
        assert!(matches!(store.verify().await, Err(RagError::CorruptIndexError(_))));
    }

    #[tokio::test]
    async fn persist_requires_a_path() {
        let store = store().await;
        assert!(matches!(store.persist().await, Err(RagError::ConfigError(_))));
    }
}
