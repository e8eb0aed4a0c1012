//! Shared fixtures for docchat-rag integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use docchat_rag::{EmbeddingProvider, RagError, Result, VectorIndexStore};

pub const DIM: usize = 32;

/// Deterministic bag-of-words embedder: every lowercase word adds one to a
/// bucket picked by its FNV-1a hash.
pub struct BagOfWordsEmbedder;

fn bucket(word: &str) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash % DIM as u64) as usize
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; DIM];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            vector[bucket(&word.to_lowercase())] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// A [`BagOfWordsEmbedder`] that can be taken offline.
#[derive(Default)]
pub struct SwitchableEmbedder {
    pub down: AtomicBool,
}

#[async_trait]
impl EmbeddingProvider for SwitchableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.down.load(Ordering::SeqCst) {
            return Err(RagError::EmbeddingError {
                provider: "test".into(),
                message: "connection refused".into(),
            });
        }
        BagOfWordsEmbedder.embed(text).await
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

pub async fn memory_store() -> Arc<VectorIndexStore> {
    Arc::new(VectorIndexStore::in_memory(Arc::new(BagOfWordsEmbedder)).await.unwrap())
}

/// `len` characters cycling through the alphabet, with no separators.
pub fn unbroken_text(len: usize) -> String {
    (0..len).map(|i| char::from(b'a' + (i % 26) as u8)).collect()
}
