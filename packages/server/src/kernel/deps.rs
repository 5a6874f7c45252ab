//! Server dependencies (using traits for testability)
//!
//! Central container handed to HTTP handlers and the scheduler. Every
//! external service sits behind a Base* trait so tests can swap in the
//! doubles from `test_dependencies`.

use openai_client::OpenAIClient;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::domains::matching::{AffinityOracle, MatchingEngine};
use crate::domains::participant::PostgresParticipantStore;
use crate::kernel::{
    BaseNotifier, BaseParticipantStore, MatchingTrigger, OpenAiAdapter, SlackNotifier,
};

#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseParticipantStore>,
    pub notifier: Arc<dyn BaseNotifier>,
    /// Guarded entrypoint to the matching engine (cron and manual runs)
    pub trigger: MatchingTrigger,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseParticipantStore>,
        notifier: Arc<dyn BaseNotifier>,
        oracle: AffinityOracle,
    ) -> Self {
        let engine = MatchingEngine::new(store.clone(), oracle, notifier.clone());
        Self {
            store,
            notifier,
            trigger: MatchingTrigger::new(Arc::new(engine)),
        }
    }

    /// Wire production services from configuration
    pub fn from_config(config: &Config, pool: PgPool) -> Self {
        let store = Arc::new(PostgresParticipantStore::new(pool));
        let notifier = Arc::new(SlackNotifier::new(&config.slack_bot_token));

        Self::new(store, notifier, build_oracle(config))
    }

    pub fn engine(&self) -> &MatchingEngine {
        self.trigger.engine()
    }
}

fn build_oracle(config: &Config) -> AffinityOracle {
    let Some(api_key) = config.openai_api_key.as_deref() else {
        tracing::warn!("OPENAI_API_KEY not set; matching runs will use random pairing");
        return AffinityOracle::unconfigured();
    };

    // Client timeout sits slightly above the oracle's own so the oracle
    // reports the timeout rather than the transport.
    let client = OpenAIClient::new(api_key)
        .with_timeout(config.oracle_timeout + std::time::Duration::from_secs(5));
    let adapter = OpenAiAdapter::new(client, &config.oracle_model);

    tracing::info!(model = %config.oracle_model, "Affinity oracle configured");
    AffinityOracle::new(Arc::new(adapter)).with_timeout(config.oracle_timeout)
}
