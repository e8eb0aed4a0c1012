//! Startup configuration, read from flags, the environment and `.env`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use docchat_model::{OpenAIChatConfig, OpenAIChatModel};
use docchat_rag::RagConfig;
use docchat_rag::openai::{DEFAULT_EMBEDDING_MODEL, OpenAIEmbeddingProvider};

use crate::error::{AssistantError, Result};

/// Paths and provider settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Directory of the shared document index
    #[arg(long, env = "DOCCHAT_INDEX_PATH", default_value = "db/mvp_rag_database", global = true)]
    pub index_path: PathBuf,

    /// JSON file holding the chat list
    #[arg(long, env = "DOCCHAT_CHATS_PATH", default_value = "db/chats/chats.json", global = true)]
    pub chats_path: PathBuf,

    /// API key for the chat and embedding endpoints
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Proxy URL for all provider requests
    #[arg(long, env = "OPENAI_PROXY", global = true)]
    pub proxy: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Chat completion model
    #[arg(long, env = "DOCCHAT_CHAT_MODEL", default_value = "gpt-4o", global = true)]
    pub chat_model: String,

    /// Embedding model
    #[arg(long, env = "DOCCHAT_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL, global = true)]
    pub embedding_model: String,

    /// Retries for transient chat completion failures
    #[arg(long, env = "DOCCHAT_MAX_RETRIES", default_value_t = 2, global = true)]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, env = "DOCCHAT_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Chunks returned by each similarity search
    #[arg(long, env = "DOCCHAT_TOP_K", default_value_t = 10, global = true)]
    pub top_k: usize,
}

impl AppConfig {
    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AssistantError::Config("OPENAI_API_KEY is not set".into()))
    }

    fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Retrieval settings: defaults with the configured `top_k`.
    pub fn rag_config(&self) -> Result<RagConfig> {
        Ok(RagConfig::builder().top_k(self.top_k).build()?)
    }

    /// Settings for the chat completion client.
    pub fn chat_config(&self) -> Result<OpenAIChatConfig> {
        let mut config = OpenAIChatConfig::new(self.api_key()?, &self.chat_model)
            .with_max_retries(self.max_retries);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(proxy) = self.proxy() {
            config = config.with_proxy(proxy);
        }
        Ok(config)
    }

    /// Build the chat completion client.
    pub fn chat_model(&self) -> Result<OpenAIChatModel> {
        Ok(OpenAIChatModel::new(self.chat_config()?)?)
    }

    /// Build the embedding provider.
    pub fn embedding_provider(&self) -> Result<OpenAIEmbeddingProvider> {
        let mut provider =
            OpenAIEmbeddingProvider::new(self.api_key()?)?.with_model(&self.embedding_model);
        if let Some(base_url) = &self.base_url {
            provider = provider.with_base_url(base_url);
        }
        if let Some(secs) = self.timeout_secs {
            provider = provider.with_timeout(Duration::from_secs(secs))?;
        }
        if let Some(proxy) = self.proxy() {
            provider = provider.with_proxy(proxy)?;
        }
        Ok(provider)
    }
}
