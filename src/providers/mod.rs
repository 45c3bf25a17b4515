// Completion providers
//
// Every turn is one stateless completion call. Agents only see the
// CompletionClient trait so sessions can run against a real API or a
// scripted stand-in.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

pub mod openai;
pub mod retry;
pub mod types;

pub use openai::OpenAIProvider;
pub use retry::{with_retry, RetryPolicy};
pub use types::{ChatMessage, CompletionRequest};

/// Anything that can turn a request into response text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Non-success HTTP status returned by a provider.
#[derive(Error, Debug)]
#[error("API request failed with status {status}: {body}")]
pub struct ApiError {
    pub status: u16,
    pub body: String,
}

impl ApiError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.status == 429 || self.status >= 500
    }
}
