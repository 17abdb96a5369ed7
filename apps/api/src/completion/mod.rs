/// Completion Client — the single point of entry for all model calls in Conclave.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All completions MUST go through `dyn CompletionClient`; one implementation
/// per backend, exactly one active per process (selected by `AI_SERVICE`).
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod azure;
pub mod gemini;
pub mod local;
pub mod openai;

/// Timeout applied to every outbound completion request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;

/// Chat role in the provider-neutral message sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name shared by every OpenAI-dialect backend.
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A provider-neutral completion request. Callers pick the model per call so
/// the orchestrator model and the agent model can differ on one backend.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_output_tokens: u32,
    pub temperature: Option<f32>,
}

/// A successful completion, reduced to the text the caller asked for.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
}

/// Failure taxonomy for backend calls. `Transient` and `RateLimited` are
/// retryable; `Auth` and `Malformed` fail the current operation immediately.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("transient backend failure: {0}")]
    Transient(String),

    #[error("backend rejected credentials: {0}")]
    Auth(String),

    #[error("backend rate limited: {0}")]
    RateLimited(String),

    #[error("malformed backend response: {0}")]
    Malformed(String),
}

impl BackendError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::Transient(_) | BackendError::RateLimited(_)
        )
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Malformed(err.to_string())
        } else {
            // Timeouts, connect failures and other transport errors are retryable.
            BackendError::Transient(err.to_string())
        }
    }
}

/// Maps a non-success HTTP status onto the error taxonomy.
pub(crate) fn classify_status(status: reqwest::StatusCode, body: String) -> BackendError {
    match status.as_u16() {
        401 | 403 => BackendError::Auth(format!("status {status}: {body}")),
        429 => BackendError::RateLimited(format!("status {status}: {body}")),
        s if s >= 500 => BackendError::Transient(format!("status {status}: {body}")),
        _ => BackendError::Malformed(format!("status {status}: {body}")),
    }
}

/// The backend seam. Implementations wrap one provider API and normalize its
/// request/response shapes and failures.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError>;
}

/// Calls the backend with bounded retry on retryable failures.
/// Retries on transient and rate-limit errors with exponential backoff
/// (1s, 2s); auth and malformed-response errors fail fast.
pub async fn complete_with_retry(
    client: &dyn CompletionClient,
    request: &CompletionRequest,
) -> Result<Completion, BackendError> {
    let mut last_error: Option<BackendError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "Completion attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        match client.complete(request).await {
            Ok(completion) => return Ok(completion),
            Err(err) if err.is_retryable() => {
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_error
        .unwrap_or_else(|| BackendError::Transient(format!("{MAX_RETRIES} attempts exhausted"))))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
