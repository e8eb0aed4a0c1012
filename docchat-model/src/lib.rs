//! # docchat-model
//!
//! Language model integrations for docchat.
//!
//! ## Overview
//!
//! The rest of the workspace talks to a language model only through the
//! [`LanguageModel`] trait: a list of [`Message`]s goes in, the completion
//! text comes out. This crate provides:
//!
//! - [`OpenAIChatModel`] - OpenAI and OpenAI-compatible chat completion APIs
//!   (feature `openai`, enabled by default), with retries, timeout and proxy
//! - [`MockModel`] - scripted responses for tests and offline runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docchat_model::{LanguageModel, Message, OpenAIChatConfig, OpenAIChatModel};
//!
//! let model = OpenAIChatModel::new(
//!     OpenAIChatConfig::new(std::env::var("OPENAI_API_KEY")?, "gpt-4o")
//!         .with_max_retries(2)
//!         .with_proxy("http://127.0.0.1:3128"),
//! )?;
//! let answer = model.complete(&[Message::user("Hello!")]).await?;
//! ```

pub mod error;
pub mod message;
pub mod mock;
pub mod model;
#[cfg(feature = "openai")]
pub mod openai;

pub use error::{ModelError, Result};
pub use message::{Message, Role};
pub use mock::MockModel;
pub use model::LanguageModel;
#[cfg(feature = "openai")]
pub use openai::{OpenAIChatConfig, OpenAIChatModel};
