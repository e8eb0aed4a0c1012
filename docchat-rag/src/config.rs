//! Configuration for chunking and retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the document index and retrieval strategies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Maximum number of characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks each similarity search returns at most.
    pub top_k: usize,
    /// Relevance-validated retrieval keeps chunks scoring strictly above this percentage.
    pub relevance_threshold: u8,
    /// Number of alternative queries requested for query-expansion retrieval.
    pub expansion_queries: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 600,
            top_k: 10,
            relevance_threshold: 70,
            expansion_queries: 3,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks a similarity search returns at most.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the relevance percentage a chunk must exceed to survive validation.
    pub fn relevance_threshold(mut self, threshold: u8) -> Self {
        self.config.relevance_threshold = threshold;
        self
    }

    /// Set how many alternative queries query-expansion retrieval asks for.
    pub fn expansion_queries(mut self, count: usize) -> Self {
        self.config.expansion_queries = count;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `relevance_threshold > 100`
    /// - `expansion_queries == 0`
    pub fn build(self) -> Result<RagConfig> {
        let c = &self.config;
        if c.chunk_overlap >= c.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if c.relevance_threshold > 100 {
            return Err(RagError::ConfigError(format!(
                "relevance_threshold ({}) is a percentage and must not exceed 100",
                c.relevance_threshold
            )));
        }
        if c.expansion_queries == 0 {
            return Err(RagError::ConfigError(
                "expansion_queries must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
