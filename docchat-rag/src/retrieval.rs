//! Retrieval strategies over the shared index.
//!
//! | strategy | behaviour |
//! |---|---|
//! | [`Plain`](RetrievalStrategy::Plain) | one similarity search for the question |
//! | [`QueryExpansion`](RetrievalStrategy::QueryExpansion) | the model rewrites the question into alternatives; every query is searched and the results are unioned |
//! | [`RelevanceValidated`](RetrievalStrategy::RelevanceValidated) | a plain search whose results are scored by the model against a theme |
//!
//! Every search is scoped to one partition key.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use docchat_model::{LanguageModel, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::store::VectorIndexStore;
use crate::validation::RelevanceValidator;

/// How chunks are retrieved for a question. Chosen per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// Top-k similarity search (strategy 1).
    #[default]
    Plain,
    /// Model-generated alternative queries, unioned (strategy 2).
    QueryExpansion,
    /// Similarity search filtered by model-scored relevance (strategy 3).
    RelevanceValidated,
}

impl RetrievalStrategy {
    /// The numeric selector used by callers (1, 2 or 3).
    pub fn number(self) -> u8 {
        match self {
            Self::Plain => 1,
            Self::QueryExpansion => 2,
            Self::RelevanceValidated => 3,
        }
    }
}

impl TryFrom<u8> for RetrievalStrategy {
    type Error = RagError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Plain),
            2 => Ok(Self::QueryExpansion),
            3 => Ok(Self::RelevanceValidated),
            other => Err(RagError::ConfigError(format!(
                "unknown retrieval strategy {other}, expected 1, 2 or 3"
            ))),
        }
    }
}

impl FromStr for RetrievalStrategy {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "plain" => Ok(Self::Plain),
            "2" | "query_expansion" | "expansion" => Ok(Self::QueryExpansion),
            "3" | "relevance_validated" | "validated" => Ok(Self::RelevanceValidated),
            other => Err(RagError::ConfigError(format!("unknown retrieval strategy '{other}'"))),
        }
    }
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plain => "plain",
            Self::QueryExpansion => "query_expansion",
            Self::RelevanceValidated => "relevance_validated",
        })
    }
}

/// Build the prompt asking the model for `count` rewordings of `question`.
pub fn expansion_prompt(question: &str, count: usize) -> Vec<Message> {
    vec![
        Message::system(format!(
            "You are an AI language model assistant. Your task is to generate {count} different \
             versions of the given user question to retrieve relevant documents from a vector \
             database. By generating multiple perspectives on the user question, your goal is to \
             help the user overcome some of the limitations of distance-based similarity search. \
             Provide these alternative questions separated by newlines."
        )),
        Message::user(format!("Original question: {question}")),
    ]
}

/// Split an expansion reply into queries, dropping list markers and blank lines.
pub fn parse_expansion(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit())
                .trim_start_matches(['.', ')', '-', '*', '•'])
                .trim()
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs a [`RetrievalStrategy`] against the shared store.
pub struct Retriever {
    store: Arc<VectorIndexStore>,
    model: Arc<dyn LanguageModel>,
    config: RagConfig,
}

impl Retriever {
    /// Create a retriever over `store`, using `model` for expansion and validation.
    pub fn new(store: Arc<VectorIndexStore>, model: Arc<dyn LanguageModel>, config: RagConfig) -> Self {
        Self { store, model, config }
    }

    /// The retrieval configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Retrieve chunks of `partition_key` for `question`.
    ///
    /// `theme` is only used by [`RetrievalStrategy::RelevanceValidated`] and
    /// defaults to the question.
    pub async fn retrieve(
        &self,
        question: &str,
        partition_key: &str,
        strategy: RetrievalStrategy,
        theme: Option<&str>,
    ) -> Result<Vec<SearchResult>> {
        let results = match strategy {
            RetrievalStrategy::Plain => self.plain(question, partition_key).await?,
            RetrievalStrategy::QueryExpansion => self.query_expansion(question, partition_key).await?,
            RetrievalStrategy::RelevanceValidated => {
                self.relevance_validated(question, partition_key, theme.unwrap_or(question)).await?
            }
        };
        info!(partition_key, %strategy, result_count = results.len(), "retrieved chunks");
        Ok(results)
    }

    /// Top-k similarity search.
    pub async fn plain(&self, question: &str, partition_key: &str) -> Result<Vec<SearchResult>> {
        self.store.search(question, self.config.top_k, partition_key).await
    }

    /// Search the question and every model-generated alternative, keeping the
    /// first occurrence of each chunk.
    pub async fn query_expansion(&self, question: &str, partition_key: &str) -> Result<Vec<SearchResult>> {
        let reply = self
            .model
            .complete(&expansion_prompt(question, self.config.expansion_queries))
            .await?;
        let alternatives = parse_expansion(&reply);
        debug!(partition_key, alternatives = alternatives.len(), "expanded question");

        let mut queries = vec![question.to_string()];
        queries.extend(alternatives.into_iter().take(self.config.expansion_queries));

        let mut seen = HashSet::new();
        let mut union = Vec::new();
        for query in &queries {
            for result in self.plain(query, partition_key).await? {
                if seen.insert(result.chunk.id) {
                    union.push(result);
                }
            }
        }
        Ok(union)
    }

    /// Plain search, then keep chunks the model scores strictly above the
    /// configured relevance threshold for `theme`.
    pub async fn relevance_validated(
        &self,
        question: &str,
        partition_key: &str,
        theme: &str,
    ) -> Result<Vec<SearchResult>> {
        let candidates = self.plain(question, partition_key).await?;
        RelevanceValidator::new(Arc::clone(&self.model), self.config.relevance_threshold)
            .filter(theme, candidates)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_selectors() {
        assert_eq!(RetrievalStrategy::try_from(1).unwrap(), RetrievalStrategy::Plain);
        assert_eq!(RetrievalStrategy::try_from(3).unwrap(), RetrievalStrategy::RelevanceValidated);
        assert!(RetrievalStrategy::try_from(4).is_err());
        assert_eq!("2".parse::<RetrievalStrategy>().unwrap(), RetrievalStrategy::QueryExpansion);
        assert_eq!("Plain".parse::<RetrievalStrategy>().unwrap(), RetrievalStrategy::Plain);
        assert_eq!(RetrievalStrategy::RelevanceValidated.to_string(), "relevance_validated");
        assert_eq!(RetrievalStrategy::QueryExpansion.number(), 2);
    }

    #[test]
    fn expansion_reply_drops_markers() {
        let reply = "1. What is a slot?\n\n2) How are slots freed?\n- slot reuse\n";
        assert_eq!(
            parse_expansion(reply),
            ["What is a slot?", "How are slots freed?", "slot reuse"]
        );
    }
}
