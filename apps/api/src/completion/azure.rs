//! Azure OpenAI backend. Same wire dialect as OpenAI; differs in the URL
//! shape (deployment path plus api-version query) and the auth header.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::openai::{chat_body, ChatCompletionsResponse};
use super::{
    classify_status, BackendError, Completion, CompletionClient, CompletionRequest,
    REQUEST_TIMEOUT,
};

pub struct AzureOpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl AzureOpenAiClient {
    pub fn new(endpoint: String, api_key: String, api_version: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
            api_key,
            api_version,
        }
    }
}

/// Azure routes by deployment name, which doubles as the model name here.
fn deployment_url(endpoint: &str, deployment: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions",
        endpoint.trim_end_matches('/'),
        deployment
    )
}

#[async_trait]
impl CompletionClient for AzureOpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
        let url = deployment_url(&self.endpoint, &request.model);

        let response = self
            .client
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&chat_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: ChatCompletionsResponse = response.json().await?;
        debug!(
            "Azure OpenAI completion succeeded (deployment: {})",
            request.model
        );
        parsed.into_completion()
    }
}
