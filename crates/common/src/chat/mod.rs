//! Chat upstream client
//!
//! Forwards a user question plus trimmed conversation history to the hosted
//! language-model API and normalizes the reply shape. Stateless: the caller
//! supplies the API key per request and nothing is persisted or retried.

use crate::config::ChatConfig;
use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Only the most recent history entries are forwarded upstream
pub const HISTORY_WINDOW: usize = 10;

const SYSTEM_PROMPT: &str = "You are an academic literature assistant focused on \
helping users with questions about AI trustworthiness, software supply chain \
security, and zero-trust architectures. Answer in a professional and friendly tone.";

const FALLBACK_REPLY: &str = "Sorry, I cannot answer that question right now.";

/// One turn of the conversation as the presentation layer sends it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct UpstreamRequest<'a> {
    model: &'a str,
    messages: Vec<UpstreamMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct UpstreamMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpstreamReply {
    #[serde(default)]
    error: Option<UpstreamErrorBody>,
    #[serde(default)]
    choices: Option<Vec<UpstreamChoice>>,
    #[serde(default)]
    output: Option<Vec<UpstreamOutput>>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamChoice {
    #[serde(default)]
    message: Option<UpstreamChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamOutput {
    #[serde(default)]
    text: Option<String>,
}

/// Client for the hosted language-model API
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    /// Create a new chat client with a bounded request timeout
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build chat HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Send the user message plus trimmed history and return the assistant
    /// reply.
    ///
    /// An upstream error payload surfaces its message; network, timeout, and
    /// parse failures are logged and reported generically.
    pub async fn complete(
        &self,
        api_key: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String> {
        let window = trimmed(history);

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(UpstreamMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        });
        for turn in window {
            messages.push(UpstreamMessage {
                role: &turn.role,
                content: &turn.content,
            });
        }
        messages.push(UpstreamMessage {
            role: "user",
            content: message,
        });

        let request = UpstreamRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Chat upstream request failed");
                AppError::Internal {
                    message: "server error, please retry later".to_string(),
                }
            })?;

        let reply: UpstreamReply = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Chat upstream response unreadable");
            AppError::Internal {
                message: "server error, please retry later".to_string(),
            }
        })?;

        if let Some(err) = reply.error {
            return Err(AppError::Upstream {
                message: err
                    .message
                    .unwrap_or_else(|| "upstream API error".to_string()),
            });
        }

        Ok(extract_reply(&reply).unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}

/// Keep only the last HISTORY_WINDOW entries
fn trimmed(history: &[ChatTurn]) -> &[ChatTurn] {
    &history[history.len().saturating_sub(HISTORY_WINDOW)..]
}

/// Fallback chain over the known upstream reply shapes:
/// chat-completion content, then completion text, then generic output.
fn extract_reply(reply: &UpstreamReply) -> Option<String> {
    if let Some(first) = reply.choices.as_deref().and_then(|c| c.first()) {
        if let Some(content) = first.message.as_ref().and_then(|m| m.content.as_deref()) {
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
        if let Some(text) = first.text.as_deref() {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    if let Some(text) = reply
        .output
        .as_deref()
        .and_then(|o| o.first())
        .and_then(|o| o.text.as_deref())
    {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    None
}
