//! Gemini backend.
//!
//! `generateContent` takes a single content block here, so the role-tagged
//! message sequence is flattened into one text part before sending. Role
//! information is lost on this backend; prompts are written to survive that.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    classify_status, BackendError, ChatMessage, Completion, CompletionClient, CompletionRequest,
    REQUEST_TIMEOUT,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateContentBody<'a> {
    contents: Vec<ContentBlock<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentBlock<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Joins all message bodies into the single text block Gemini accepts.
fn flatten_messages(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Empty candidates usually mean the content was blocked; surfaced as
/// `Malformed` since retrying the identical request cannot help.
fn extract_text(response: GenerateContentResponse) -> Result<Completion, BackendError> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        BackendError::Malformed("response contained no candidates".to_string())
    })?;

    let content: String = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();

    if content.is_empty() {
        return Err(BackendError::Malformed(
            "candidate contained no text parts".to_string(),
        ));
    }

    Ok(Completion { content })
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", request.model);
        let flattened = flatten_messages(&request.messages);

        let body = GenerateContentBody {
            contents: vec![ContentBlock {
                parts: vec![RequestPart { text: &flattened }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, text));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        debug!("Gemini completion succeeded (model: {})", request.model);
        extract_text(parsed)
    }
}
