//! Chat proxy handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use litshelf_common::{
    chat::ChatTurn,
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub role: &'static str,
}

/// Forward a question plus trimmed history to the language-model API.
///
/// The caller supplies its own API key per request; it is used as the bearer
/// credential for the upstream call and never stored.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let api_key = require_field(request.api_key, "apiKey")?;
    let message = require_field(request.message, "message")?;

    let reply = state
        .chat
        .complete(&api_key, &message, &request.history)
        .await?;

    Ok(Json(ChatResponse {
        message: reply,
        role: "assistant",
    }))
}

fn require_field(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::MissingField {
            field: field.to_string(),
        })
}
