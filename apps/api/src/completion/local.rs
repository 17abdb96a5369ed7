//! Local inference server backend (LM Studio, llama.cpp server, and friends).
//!
//! Speaks the OpenAI chat/completions dialect against a configurable base URL
//! with no auth. Connection failures map to transient errors so the retry
//! path covers a server that is still loading a model.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::openai::{chat_body, ChatCompletionsResponse};
use super::{
    classify_status, BackendError, Completion, CompletionClient, CompletionRequest,
    REQUEST_TIMEOUT,
};

pub struct LocalLlmClient {
    client: Client,
    base_url: String,
}

impl LocalLlmClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for LocalLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        let response = self
            .client
            .post(self.completions_url())
            .json(&chat_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BackendError::Transient(format!(
                        "could not reach local inference server at {}: {e}",
                        self.base_url
                    ))
                } else {
                    BackendError::from(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: ChatCompletionsResponse = response.json().await?;
        debug!(
            "Local completion succeeded (model: {}, server: {})",
            request.model, self.base_url
        );
        parsed.into_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_appends_path() {
        let client = LocalLlmClient::new("http://localhost:1234/v1".to_string());
        assert_eq!(
            client.completions_url(),
            "http://localhost:1234/v1/chat/completions"
        );
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let client = LocalLlmClient::new("http://localhost:1234/v1/".to_string());
        assert_eq!(
            client.completions_url(),
            "http://localhost:1234/v1/chat/completions"
        );
    }
}
