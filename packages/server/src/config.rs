use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::matching::oracle::DEFAULT_ORACLE_TIMEOUT;
use crate::kernel::llm_request::DEFAULT_MODEL;
use crate::kernel::scheduled_tasks::DEFAULT_MATCHING_SCHEDULE;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub slack_bot_token: String,
    /// Absent means the affinity oracle is unconfigured and every run pairs randomly
    pub openai_api_key: Option<String>,
    pub oracle_model: String,
    pub oracle_timeout: Duration,
    /// Six-field cron expression (seconds first)
    pub matching_schedule: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let oracle_timeout = match lookup("ORACLE_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse()
                    .context("ORACLE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => DEFAULT_ORACLE_TIMEOUT,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            slack_bot_token: lookup("SLACK_BOT_TOKEN").context("SLACK_BOT_TOKEN must be set")?,
            openai_api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
            oracle_model: lookup("ORACLE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            oracle_timeout,
            matching_schedule: lookup("MATCHING_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_MATCHING_SCHEDULE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/coffee_chat"),
        ("SLACK_BOT_TOKEN", "xoxb-test"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.oracle_model, "gpt-4o");
        assert_eq!(config.oracle_timeout, Duration::from_secs(30));
        assert_eq!(config.matching_schedule, "0 0 10 * * Mon,Thu");
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PORT", "3000"),
            ("OPENAI_API_KEY", "sk-test"),
            ("ORACLE_MODEL", "gpt-4o-mini"),
            ("ORACLE_TIMEOUT_SECS", "5"),
            ("MATCHING_SCHEDULE", "0 30 9 * * Mon"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.oracle_model, "gpt-4o-mini");
        assert_eq!(config.oracle_timeout, Duration::from_secs(5));
        assert_eq!(config.matching_schedule, "0 30 9 * * Mon");
    }

    #[test]
    fn test_blank_openai_key_leaves_oracle_unconfigured() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("OPENAI_API_KEY", "  "));

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.openai_api_key, None);
    }

    #[test]
    fn test_missing_slack_token_is_an_error() {
        let err = Config::from_lookup(lookup(&REQUIRED[..1])).unwrap_err();

        assert!(err.to_string().contains("SLACK_BOT_TOKEN"));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));

        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
