// OpenAI-compatible chat completions provider
//
// Works against api.openai.com or any server exposing the same
// /v1/chat/completions endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::{with_retry, RetryPolicy};
use super::types::{ChatMessage, CompletionRequest};
use super::{ApiError, CompletionClient};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn to_openai_request<'a>(&self, request: &'a CompletionRequest) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
        }
    }

    /// Send a single request (no retry)
    async fn complete_once(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(
            "Sending {} messages to {} ({})",
            request.messages.len(),
            url,
            request.model
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&self.to_openai_request(request))
            .send()
            .await
            .context("Failed to send request to completion API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::new(status.as_u16(), body).into());
        }

        let parsed: OpenAIResponse = response
            .json()
            .await
            .context("Failed to parse completion API response")?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .context("Completion API returned no choices")?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl CompletionClient for OpenAIProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        with_retry(self.retry, || self.complete_once(request)).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
