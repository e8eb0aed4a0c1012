//! LLM-based relevance validation of retrieved chunks.
//!
//! The scoring model is instructed to answer with a bare integer
//! percentage. Replies that follow that contract (`"85"`, `"85%"`) are read
//! directly; anything else falls back to the first digit run in the text.

use std::sync::{Arc, LazyLock};

use docchat_model::{LanguageModel, Message};
use regex::Regex;
use tracing::{debug, warn};

use crate::document::SearchResult;
use crate::error::{RagError, Result};

const SCORING_INSTRUCTIONS: &str = "You are a content validation assistant. \
Rate how closely the passage matches the topic of the request, as a percentage from 0 to 100. \
Reply with the integer only, for example: 85";

static STRICT_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,3})\s*%?\s*\.?\s*$").expect("literal pattern"));
static FIRST_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("literal pattern"));

/// Build the scoring prompt for one passage.
pub fn relevance_prompt(theme: &str, passage: &str) -> Vec<Message> {
    vec![
        Message::system(SCORING_INSTRUCTIONS),
        Message::user(format!("Request topic: {theme}\nPassage: {passage}")),
    ]
}

/// Parse a relevance percentage out of a model reply. Numbers above 100 are
/// clamped to 100.
///
/// # Errors
///
/// Returns [`RagError::ValidationParseError`] when the reply holds no digits.
pub fn parse_relevance_score(response: &str) -> Result<u8> {
    let digits = STRICT_SCORE
        .captures(response)
        .and_then(|c| c.get(1))
        .or_else(|| FIRST_DIGITS.find(response))
        .map(|m| m.as_str())
        .ok_or_else(|| RagError::ValidationParseError { response: response.to_string() })?;

    // digit runs too long for u8 are above 100 anyway
    Ok(digits.parse::<u8>().map_or(100, |score| score.min(100)))
}

/// Scores chunks against a theme with a language model and keeps the relevant ones.
pub struct RelevanceValidator {
    model: Arc<dyn LanguageModel>,
    threshold: u8,
}

impl RelevanceValidator {
    /// Create a validator keeping chunks that score strictly above `threshold`.
    pub fn new(model: Arc<dyn LanguageModel>, threshold: u8) -> Self {
        Self { model, threshold }
    }

    /// The score a chunk has to exceed.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Ask the model how relevant `passage` is to `theme`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ModelError`] if the model call fails and
    /// [`RagError::ValidationParseError`] if the reply carries no score.
    pub async fn score(&self, theme: &str, passage: &str) -> Result<u8> {
        let reply = self.model.complete(&relevance_prompt(theme, passage)).await?;
        parse_relevance_score(&reply)
    }

    /// Keep the results scoring strictly above the threshold, in their original order.
    ///
    /// A chunk whose score cannot be parsed is dropped with a warning; the
    /// rest of the batch is still validated.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ModelError`] if a model call fails.
    pub async fn filter(&self, theme: &str, results: Vec<SearchResult>) -> Result<Vec<SearchResult>> {
        let total = results.len();
        let mut kept = Vec::with_capacity(total);
        for result in results {
            match self.score(theme, &result.chunk.text).await {
                Ok(score) if score > self.threshold => kept.push(result),
                Ok(score) => {
                    debug!(chunk.id = %result.chunk.id, score, "chunk below relevance threshold");
                }
                Err(e @ RagError::ValidationParseError { .. }) => {
                    warn!(chunk.id = %result.chunk.id, error = %e, "dropping chunk with unreadable score");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(total, kept = kept.len(), threshold = self.threshold, "relevance validation");
        Ok(kept)
    }
}
