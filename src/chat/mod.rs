//! Conversational text-model integration
//!
//! Wraps an OpenAI-compatible chat completion API behind the [`ChatApi`]
//! trait and layers an ordered message history on top via [`ChatSession`].

pub mod client;
pub mod mock;
pub mod session;

pub use client::ModelScopeChatClient;
pub use mock::MockChatApi;
pub use session::ChatSession;

use crate::models::Message;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// One-shot completion over the full message history.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Streaming completion; partial chunks are accumulated into the final
    /// assistant text before returning.
    async fn complete_stream(&self, messages: &[Message]) -> Result<String>;
}
