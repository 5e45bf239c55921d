//! OpenAI provider implementation for SousChef
//!
//! Streams chat completions from the OpenAI API over SSE (`data:` lines
//! ending with a `[DONE]` marker) and maps API failures onto the
//! provider error variants. The API base is overridable through
//! configuration so tests can point the provider at a mock server.

use crate::config::OpenAiConfig;
use crate::error::{Result, SousChefError};
use crate::providers::{ChatProvider, ChatTurn, ReplyStream};

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Default API base when no override is configured
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Stream terminator sent as the final SSE data value
const DONE_MARKER: &str = "[DONE]";

/// OpenAI chat-completion provider
///
/// Credentials come from `provider.openai.api_key` or the
/// `OPENAI_API_KEY` environment variable, resolved per request so a
/// missing key surfaces as `MissingCredentials` instead of failing
/// construction.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

/// Request body for the chat-completions endpoint
///
/// `ChatTurn` serializes to the wire `{role, content}` shape directly.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Non-streaming completion response (used by `verify`)
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[allow(dead_code)]
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    #[allow(dead_code)]
    content: Option<String>,
}

/// One decoded SSE chunk of a streaming completion
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - OpenAI configuration (model, key, optional base URL)
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OpenAiConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("souschef/0.2.0")
            .build()
            .map_err(|e| SousChefError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized OpenAI provider: model={}, api_base={}",
            config.model,
            config.api_base.as_deref().unwrap_or(OPENAI_API_BASE)
        );

        Ok(Self { client, config })
    }

    /// Resolve the API key from config, then the environment
    fn api_key(&self) -> Result<String> {
        if let Some(key) = self.config.api_key.as_deref() {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(SousChefError::MissingCredentials("openai".to_string()).into()),
        }
    }

    /// The chat-completions endpoint, honoring the api_base override
    fn completions_url(&self) -> String {
        let base = self.config.api_base.as_deref().unwrap_or(OPENAI_API_BASE);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    async fn post_completion(&self, request: &ChatCompletionRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key()?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request failed: {}", e);
                SousChefError::Provider(format!("OpenAI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI returned error {}: {}", status, body);
            return Err(map_api_error(status, &body).into());
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn stream_reply(&self, turns: &[ChatTurn]) -> Result<ReplyStream> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: turns,
            stream: true,
            max_tokens: None,
        };

        tracing::debug!(
            "Sending OpenAI chat request: model={}, {} turns",
            self.config.model,
            turns.len()
        );

        let response = self.post_completion(&request).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            forward_sse_deltas(byte_stream, tx).await;
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn verify(&self) -> Result<()> {
        let probe = [ChatTurn::user("Hello")];
        let request = ChatCompletionRequest {
            model: &self.config.verify_model,
            messages: &probe,
            stream: false,
            max_tokens: Some(5),
        };

        tracing::debug!(
            "Verifying OpenAI credentials against model {}",
            self.config.verify_model
        );

        let response = self.post_completion(&request).await?;

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI completion: {}", e);
            SousChefError::MalformedResponse(format!("Failed to parse completion: {}", e))
        })?;

        if completion.choices.is_empty() {
            return Err(
                SousChefError::MalformedResponse("no choices in completion".to_string()).into(),
            );
        }

        tracing::info!("OpenAI credentials verified");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}

/// Map a non-success API status onto the provider error variants
///
/// 401 means the configured key was rejected, 429 is the rate limiter,
/// and 5xx is an upstream fault; the latter two are retryable by hand.
/// Anything else lands in the residual `Provider` variant with the raw
/// body preserved.
fn map_api_error(status: reqwest::StatusCode, body: &str) -> SousChefError {
    let detail =
        extract_error_message(body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    if status == reqwest::StatusCode::UNAUTHORIZED {
        SousChefError::ProviderAuth("Invalid OpenAI API key".to_string())
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        SousChefError::RateLimited(detail)
    } else if status.is_server_error() {
        SousChefError::ProviderServer(detail)
    } else {
        SousChefError::Provider(format!("OpenAI returned error {}: {}", status, body))
    }
}

/// Pull the human-readable message out of an OpenAI error body
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

/// Parse the SSE byte stream and forward assistant text deltas
///
/// Events are separated by blank lines; each carries one `data:` value
/// holding a JSON chunk, until the `[DONE]` marker closes the stream. A
/// transport error or an unparseable chunk is forwarded as an `Err`
/// item and ends the stream.
async fn forward_sse_deltas(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>>,
    tx: mpsc::UnboundedSender<Result<String>>,
) {
    use futures::StreamExt;

    let mut buffer = String::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(Err(SousChefError::Http(e).into()));
                return;
            }
        };

        match std::str::from_utf8(&chunk) {
            Ok(text) => buffer.push_str(text),
            Err(_) => continue,
        }

        while let Some(pos) = buffer.find("\n\n") {
            let event_block = buffer[..pos].to_string();
            buffer = buffer[pos + 2..].to_string();
            if forward_sse_event(&event_block, &tx).is_break() {
                return;
            }
        }
    }

    // Trailing partial event when the server closed without a blank line.
    if !buffer.is_empty() {
        let _ = forward_sse_event(&buffer, &tx);
    }
}

/// Forward the text delta of one SSE event block
///
/// Returns `Break` when the stream should stop: the `[DONE]` marker,
/// a malformed chunk, or a dropped receiver.
fn forward_sse_event(
    event_block: &str,
    tx: &mpsc::UnboundedSender<Result<String>>,
) -> std::ops::ControlFlow<()> {
    use std::ops::ControlFlow;

    for line in event_block.lines() {
        let data = match line.strip_prefix("data:") {
            Some(value) => value.trim(),
            None => continue,
        };

        if data == DONE_MARKER {
            return ControlFlow::Break(());
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                let text = chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta.content);
                if let Some(text) = text {
                    if !text.is_empty() && tx.send(Ok(text)).is_err() {
                        return ControlFlow::Break(());
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(Err(SousChefError::MalformedResponse(format!(
                    "invalid stream chunk: {}",
                    e
                ))
                .into()));
                return ControlFlow::Break(());
            }
        }
    }

    ControlFlow::Continue(())
}
