use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::BaseNotifier;
use crate::common::ParticipantId;

const SLACK_API_BASE: &str = "https://slack.com/api";

/// Slack Web API client for direct messages
///
/// Posting to a user id as `channel` opens (or reuses) the bot's DM with
/// that user, so no separate `conversations.open` call is needed.
#[derive(Clone)]
pub struct SlackNotifier {
    client: Client,
    bot_token: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackNotifier {
    pub fn new(bot_token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            bot_token: bot_token.into(),
            base_url: SLACK_API_BASE.to_string(),
        }
    }

    /// Point at a different API host (tests, proxies)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Post a message to a channel or user id
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(&self.bot_token)
            .json(&PostMessage { channel, text })
            .send()
            .await
            .context("Slack request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Slack API HTTP error");
            anyhow::bail!("Slack API HTTP error {}: {}", status, body);
        }

        // Slack reports most failures as 200 with ok=false
        let body: SlackResponse = response
            .json()
            .await
            .context("Failed to parse Slack response")?;
        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown_error".to_string());
            anyhow::bail!("Slack API error: {}", reason);
        }

        debug!(channel, "Slack message posted");
        Ok(())
    }
}

#[async_trait]
impl BaseNotifier for SlackNotifier {
    async fn send(&self, recipient: &ParticipantId, text: &str) -> Result<()> {
        self.post_message(recipient.as_str(), text).await
    }
}
