//! Chat-provider abstraction for SousChef
//!
//! This module defines the `ChatProvider` trait implemented by the
//! OpenAI and Ollama backends, the `ChatTurn` conversation unit, and
//! the streamed-reply type shared by both.
//!
//! Providers stream assistant text incrementally: callers receive a
//! `ReplyStream` and print chunks as they arrive, so the gated session
//! can race the stream against its expiry deadline.

use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A single turn in a chat conversation
///
/// Turns carry a role (`system`, `user`, or `assistant`) and text
/// content. The first turn of a session is always the fixed system
/// instruction; the provider treats the slice as already ordered.
///
/// # Examples
///
/// ```
/// use souschef::providers::ChatTurn;
///
/// let turn = ChatTurn::user("What can I cook with mushrooms?");
/// assert_eq!(turn.role, "user");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// Who produced this turn: "system", "user", or "assistant"
    pub role: String,

    /// The text of the turn
    pub content: String,
}

impl ChatTurn {
    /// Create the fixed system instruction turn
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user turn
    ///
    /// # Examples
    ///
    /// ```
    /// use souschef::providers::ChatTurn;
    ///
    /// let turn = ChatTurn::user("Hello");
    /// assert_eq!(turn.role, "user");
    /// assert_eq!(turn.content, "Hello");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant turn (a previously streamed reply)
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Incrementally streamed assistant reply
///
/// Each item is a chunk of assistant text in arrival order. An `Err`
/// item ends the stream; the text received before it is a usable
/// partial reply.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for chat-completion providers
///
/// Implementations wrap one upstream API (OpenAI, Ollama) and map its
/// failures onto the `SousChefError` provider variants so the chat
/// loop can offer manual-retry hints for transient classes.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Stream the assistant reply for the given conversation
    ///
    /// # Arguments
    ///
    /// * `turns` - Ordered conversation, system instruction first
    ///
    /// # Errors
    ///
    /// Returns an error when credentials are missing or rejected, the
    /// upstream rate-limits or fails server-side, or the request cannot
    /// be sent. Mid-stream failures surface as `Err` items instead.
    async fn stream_reply(&self, turns: &[ChatTurn]) -> Result<ReplyStream>;

    /// Cheap credential and connectivity check
    ///
    /// Sends a minimal completion request and validates the response
    /// shape without streaming.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials`, `ProviderAuth`, `RateLimited`,
    /// `ProviderServer`, or `MalformedResponse` depending on what the
    /// upstream rejects.
    async fn verify(&self) -> Result<()>;

    /// Short provider name used in logs and error messages
    fn name(&self) -> &'static str;

    /// The model completions are requested from
    fn model(&self) -> String;
}

/// Drain a reply stream into the full assistant message
///
/// Used by tests and non-interactive callers; the chat loop consumes
/// the stream chunk by chunk instead.
///
/// # Errors
///
/// Returns the first `Err` item of the stream, discarding any text
/// already received.
pub async fn collect_reply(mut stream: ReplyStream) -> Result<String> {
    use futures::StreamExt;

    let mut reply = String::new();
    while let Some(chunk) = stream.next().await {
        reply.push_str(&chunk?);
    }
    Ok(reply)
}
