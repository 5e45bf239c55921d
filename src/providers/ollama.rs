//! Ollama provider implementation for SousChef
//!
//! Connects to a local or remote Ollama server and streams chat replies
//! from `/api/chat`. Ollama streams newline-delimited JSON objects, one
//! per delta, with `"done": true` on the final object.

use crate::config::OllamaConfig;
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

/// Ollama chat provider
///
/// Requires no credentials; a server that is not running surfaces as a
/// connection error with the configured host in the message.
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request body for `/api/chat`
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
}

/// One NDJSON object from a streaming chat response
///
/// Non-streaming responses use the same shape with `done: true`.
#[derive(Debug, Deserialize)]
struct OllamaChatChunk {
    #[serde(default)]
    message: OllamaChatMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct OllamaChatMessage {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - Ollama configuration (host and model)
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OllamaConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("souschef/0.2.0")
            .build()
            .map_err(|e| SousChefError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.host.trim_end_matches('/'))
    }

    async fn post_chat(&self, request: &OllamaChatRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.chat_url())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request to {} failed: {}", self.config.host, e);
                SousChefError::Provider(format!("Failed to connect to Ollama server: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, body);
            return Err(map_api_error(status, &body).into());
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    async fn stream_reply(&self, turns: &[ChatTurn]) -> Result<ReplyStream> {
        let request = OllamaChatRequest {
            model: &self.config.model,
            messages: turns,
            stream: true,
        };

        tracing::debug!(
            "Sending Ollama chat request: model={}, {} turns",
            self.config.model,
            turns.len()
        );

        let response = self.post_chat(&request).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            forward_chat_lines(byte_stream, tx).await;
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn verify(&self) -> Result<()> {
        let probe = [ChatTurn::user("Hello")];
        let request = OllamaChatRequest {
            model: &self.config.model,
            messages: &probe,
            stream: false,
        };

        tracing::debug!(
            "Verifying Ollama server at {} with model {}",
            self.config.host,
            self.config.model
        );

        let response = self.post_chat(&request).await?;

        let chunk: OllamaChatChunk = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            SousChefError::MalformedResponse(format!("Failed to parse chat response: {}", e))
        })?;

        if let Some(error) = chunk.error {
            return Err(SousChefError::Provider(format!("Ollama error: {}", error)).into());
        }

        tracing::info!("Ollama server verified");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}

/// Map a non-success Ollama status onto the provider error variants
fn map_api_error(status: reqwest::StatusCode, body: &str) -> SousChefError {
    let detail = extract_error_message(body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        SousChefError::RateLimited(detail)
    } else if status.is_server_error() {
        SousChefError::ProviderServer(detail)
    } else {
        SousChefError::Provider(format!("Ollama returned error {}: {}", status, detail))
    }
}

/// Pull the message out of an Ollama `{"error": "..."}` body
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(|s| s.to_string())
}

/// Parse the NDJSON byte stream and forward assistant text deltas
///
/// Each line is one JSON object; the object with `done: true` closes
/// the stream. A transport error, an in-band `error` value, or an
/// unparseable line is forwarded as an `Err` item and ends the stream.
async fn forward_chat_lines(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>>,
    tx: mpsc::UnboundedSender<Result<String>>,
) {
    use futures::StreamExt;
    use std::ops::ControlFlow;

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

        while let Some(pos) = buffer.find('\n') {
            let line = buffer[..pos].trim().to_string();
            buffer = buffer[pos + 1..].to_string();
            if let ControlFlow::Break(()) = forward_chat_line(&line, &tx) {
                return;
            }
        }
    }

    // Trailing line when the server closed without a final newline.
    let line = buffer.trim().to_string();
    if !line.is_empty() {
        let _ = forward_chat_line(&line, &tx);
    }
}

/// Forward the text delta of one NDJSON line
///
/// Returns `Break` when the stream should stop: the `done` marker, an
/// in-band error, a malformed line, or a dropped receiver.
fn forward_chat_line(
    line: &str,
    tx: &mpsc::UnboundedSender<Result<String>>,
) -> std::ops::ControlFlow<()> {
    use std::ops::ControlFlow;

    if line.is_empty() {
        return ControlFlow::Continue(());
    }

    match serde_json::from_str::<OllamaChatChunk>(line) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                let _ = tx.send(Err(
                    SousChefError::Provider(format!("Ollama error: {}", error)).into()
                ));
                return ControlFlow::Break(());
            }
            if !chunk.message.content.is_empty() && tx.send(Ok(chunk.message.content)).is_err() {
                return ControlFlow::Break(());
            }
            if chunk.done {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        }
        Err(e) => {
            let _ = tx.send(Err(SousChefError::MalformedResponse(format!(
                "invalid stream line: {}",
                e
            ))
            .into()));
            ControlFlow::Break(())
        }
    }
}
