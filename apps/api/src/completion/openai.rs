//! OpenAI chat-completions backend.
//!
//! Also owns the chat/completions wire dialect. The Azure and local backends
//! speak the same shape and reuse these types; only URL and auth differ.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    classify_status, BackendError, Completion, CompletionClient, CompletionRequest,
    REQUEST_TIMEOUT,
};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionsBody<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    // Streaming is never used; serialized unconditionally so local servers
    // that default to streaming stay in one-shot mode.
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionsResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    pub content: Option<String>,
}

/// Builds the request body for any chat/completions-shaped backend.
pub(crate) fn chat_body(request: &CompletionRequest) -> ChatCompletionsBody<'_> {
    ChatCompletionsBody {
        model: &request.model,
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
        max_tokens: request.max_output_tokens,
        temperature: request.temperature,
        stream: false,
    }
}

impl ChatCompletionsResponse {
    /// First choice content, or `Malformed` when the response carries none.
    pub(crate) fn into_completion(self) -> Result<Completion, BackendError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                BackendError::Malformed("response contained no message content".to_string())
            })?;
        Ok(Completion { content })
    }
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
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
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&chat_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: ChatCompletionsResponse = response.json().await?;
        debug!("OpenAI completion succeeded (model: {})", request.model);
        parsed.into_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::ChatMessage;

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage::system("You are a reviewer."),
                ChatMessage::user("Review this resume."),
            ],
            max_output_tokens: 1000,
            temperature: Some(0.7),
        }
    }

    #[test]
    fn test_chat_body_serialization() {
        let request = sample_request();
        let json = serde_json::to_value(chat_body(&request)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Review this resume.");
    }

    #[test]
    fn test_chat_body_omits_unset_temperature() {
        let mut request = sample_request();
        request.temperature = None;
        let json = serde_json::to_value(chat_body(&request)).unwrap();

        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_extracts_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"Looks strong."}}]}"#;
        let parsed: ChatCompletionsResponse = serde_json::from_str(raw).unwrap();

        let completion = parsed.into_completion().unwrap();
        assert_eq!(completion.content, "Looks strong.");
    }

    #[test]
    fn test_response_without_choices_is_malformed() {
        let raw = r#"{"choices":[]}"#;
        let parsed: ChatCompletionsResponse = serde_json::from_str(raw).unwrap();

        assert!(matches!(
            parsed.into_completion(),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn test_response_with_null_content_is_malformed() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ChatCompletionsResponse = serde_json::from_str(raw).unwrap();

        assert!(matches!(
            parsed.into_completion(),
            Err(BackendError::Malformed(_))
        ));
    }
}
