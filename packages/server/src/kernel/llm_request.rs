// OpenAI-backed implementation of BaseAI
//
// For structured JSON output the caller supplies the schema (usually from
// `StructuredOutput::openai_schema()`); this adapter only moves bytes.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{OpenAIClient, StructuredRequest};

use super::BaseAI;

/// Default chat model for affinity pairing
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Wrapper around OpenAIClient that implements the BaseAI trait
#[derive(Clone)]
pub struct OpenAiAdapter {
    client: OpenAIClient,
    model: String,
}

impl OpenAiAdapter {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl BaseAI for OpenAiAdapter {
    async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<String> {
        let request =
            StructuredRequest::new(&self.model, system_prompt, user_prompt, schema_name, schema)
                .temperature(0.7);
        Ok(self.client.structured_output(request).await?)
    }
}
