//! OpenAI chat completion client.
//!
//! This module is only available when the `openai` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{ModelError, Result};
use crate::message::Message;
use crate::model::LanguageModel;

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// The default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

const PROVIDER: &str = "OpenAI";

/// Delay before the first retry; doubled for every further attempt.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Configuration for [`OpenAIChatModel`].
///
/// No max-token cap is sent: completions are as long as the model decides.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAIChatConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Model identifier, e.g. `gpt-4o`.
    pub model: String,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// How many times a transient failure is retried.
    pub max_retries: u32,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Optional proxy URL applied to all requests.
    pub proxy: Option<String>,
}

impl OpenAIChatConfig {
    /// Create a config for the given key and model with default settings.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_API_BASE.to_string(),
            temperature: 0.0,
            max_retries: 2,
            timeout: None,
            proxy: None,
        }
    }

    /// Point the client at an OpenAI-compatible API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set how many times a transient failure is retried.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Route requests through a proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// A [`LanguageModel`] backed by the `/chat/completions` endpoint.
///
/// Uses `reqwest` directly. Transient failures (network errors, HTTP 429 and
/// 5xx) are retried up to `max_retries` times with exponential backoff.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_model::{OpenAIChatConfig, OpenAIChatModel};
///
/// let model = OpenAIChatModel::new(OpenAIChatConfig::new("sk-...", "gpt-4o"))?;
/// ```
pub struct OpenAIChatModel {
    client: reqwest::Client,
    config: OpenAIChatConfig,
}

impl OpenAIChatModel {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the API key is empty, the proxy URL is
    /// invalid, or the HTTP client cannot be built.
    pub fn new(config: OpenAIChatConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::Config("API key must not be empty".into()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ModelError::Config(format!("invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client =
            builder.build().map_err(|e| ModelError::Config(format!("HTTP client error: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a client using `OPENAI_API_KEY` and, when set, `OPENAI_PROXY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::Config("OPENAI_API_KEY environment variable not set".into()))?;
        let mut config = OpenAIChatConfig::new(api_key, model);
        if let Ok(proxy) = std::env::var("OPENAI_PROXY") {
            if !proxy.is_empty() {
                config = config.with_proxy(proxy);
            }
        }
        Self::new(config)
    }

    /// Return the active configuration.
    pub fn config(&self) -> &OpenAIChatConfig {
        &self.config
    }

    async fn send_once(&self, request: &ChatRequest<'_>) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ModelError::Request { provider: PROVIDER.into(), message: e.to_string() })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ModelError::Api {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                message: detail,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ModelError::InvalidResponse { provider: PROVIDER.into(), message: e.to_string() }
        })?;

        parsed.choices.into_iter().next().and_then(|c| c.message.content).ok_or_else(|| {
            ModelError::InvalidResponse {
                provider: PROVIDER.into(),
                message: "response contained no completion".into(),
            }
        })
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<&'a Message>,
    temperature: f32,
}

/// Messages a chat completion API accepts; entries with other roles are dropped.
fn model_turns(messages: &[Message]) -> Vec<&Message> {
    messages.iter().filter(|m| m.role.is_model_role()).collect()
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── LanguageModel implementation ───────────────────────────────────

#[async_trait]
impl LanguageModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: model_turns(messages),
            temperature: self.config.temperature,
        };

        let mut attempt = 0;
        loop {
            debug!(provider = PROVIDER, model = %self.config.model, attempt, message_count = request.messages.len(), "chat completion");
            match self.send_once(&request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = INITIAL_BACKOFF * 2u32.pow(attempt);
                    warn!(provider = PROVIDER, attempt, error = %e, ?delay, "retrying chat completion");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(provider = PROVIDER, attempt, error = %e, "chat completion failed");
                    return Err(e);
                }
            }
        }
    }
}
