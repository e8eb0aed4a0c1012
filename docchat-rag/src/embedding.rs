//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations must be deterministic for a given model and input and
/// always return vectors of [`dimensions`](EmbeddingProvider::dimensions)
/// length. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Verify that every vector has `expected` components.
///
/// # Errors
///
/// Returns [`RagError::EmbeddingError`] naming the first offending vector.
pub fn check_dimensions(expected: usize, vectors: &[Vec<f32>]) -> Result<()> {
    match vectors.iter().position(|v| v.len() != expected) {
        Some(i) => Err(RagError::EmbeddingError {
            provider: "dimension check".into(),
            message: format!(
                "embedding {i} has {} dimensions, expected {expected}",
                vectors[i].len()
            ),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_is_an_embedding_error() {
        assert!(check_dimensions(3, &[vec![0.0; 3], vec![1.0; 3]]).is_ok());
        let err = check_dimensions(3, &[vec![0.0; 3], vec![1.0; 2]]).unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
        assert!(err.to_string().contains("embedding 1 has 2 dimensions"));
    }
}
