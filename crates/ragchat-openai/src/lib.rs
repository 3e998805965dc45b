//! OpenAI integration for ragchat
//!
//! This crate provides the OpenAI implementation of the `LLMProvider` and
//! `Embedder` traits.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::OpenAiClient;
pub use config::{DEFAULT_API_URL, OpenAiConfig};

// Re-export core types for convenience
pub use ragchat_core::{
    ChatMessage, Embedder, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};
