//! Minimal OpenAI chat-completions client.
//!
//! Supports one call: schema-constrained structured output. There is no
//! domain logic here.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, StructuredOutput, StructuredRequest};
//!
//! let client = OpenAIClient::new(api_key).with_timeout(Duration::from_secs(30));
//! let request = StructuredRequest::new(
//!     "gpt-4o",
//!     "You judge things.",
//!     "Is Rust fun?",
//!     "answer",
//!     Answer::openai_schema(),
//! );
//! let json = client.structured_output(request).await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{OpenAIError, Result};
pub use schema::StructuredOutput;
pub use types::*;

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, warn};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: build_http_client(DEFAULT_TIMEOUT),
            api_key: api_key.into(),
        }
    }

    /// Per-request timeout, covering connect through body read.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_client = build_http_client(timeout);
        self
    }

    /// Structured output with a `json_schema` response format.
    ///
    /// Returns the raw JSON string; callers deserialize and validate it.
    pub async fn structured_output(&self, request: StructuredRequest) -> Result<String> {
        let start = Instant::now();
        let raw = self.post_chat(&request).await?;
        let content = first_content(raw)?;

        debug!(
            model = %request.model,
            schema = %request.response_format.json_schema.name,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI structured output"
        );

        Ok(content)
    }

    async fn post_chat(&self, body: &StructuredRequest) -> Result<types::ChatResponseRaw> {
        let response = self
            .http_client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                OpenAIError::from_reqwest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(OpenAIError::Api(format!("{}: {}", status, error_text)));
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                OpenAIError::Timeout(e.to_string())
            } else {
                OpenAIError::Parse(e.to_string())
            }
        })
    }
}

fn build_http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn first_content(raw: types::ChatResponseRaw) -> Result<String> {
    let message = raw
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| OpenAIError::Api("No choices in response".into()))?;

    if let Some(refusal) = message.refusal {
        return Err(OpenAIError::Api(format!("Model refused: {}", refusal)));
    }

    message
        .content
        .ok_or_else(|| OpenAIError::Parse("Response message had no content".into()))
}
