//! In-memory fixtures for driving the matching engine and HTTP router
//! without Postgres, OpenAI or Slack.

use std::collections::BTreeSet;
use std::sync::Arc;

use coffee_chat::common::ParticipantId;
use coffee_chat::domains::matching::{AffinityOracle, MatchingEngine};
use coffee_chat::kernel::{InMemoryParticipantStore, MockAI, MockNotifier, ServerDeps};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Route engine and handler logs to the test writer (RUST_LOG respected)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Collaborators for one test, kept as concrete doubles for assertions
pub struct TestDeps {
    pub store: Arc<InMemoryParticipantStore>,
    pub notifier: Arc<MockNotifier>,
    pub ai: Option<Arc<MockAI>>,
}

impl TestDeps {
    /// Eligible participants with no oracle configured
    pub fn new(eligible: &[&str]) -> Self {
        init_tracing();
        Self {
            store: Arc::new(InMemoryParticipantStore::new().with_eligible(eligible)),
            notifier: Arc::new(MockNotifier::new()),
            ai: None,
        }
    }

    pub fn with_store(mut self, store: InMemoryParticipantStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn with_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn with_ai(mut self, ai: MockAI) -> Self {
        self.ai = Some(Arc::new(ai));
        self
    }

    pub fn oracle(&self) -> AffinityOracle {
        match &self.ai {
            Some(ai) => AffinityOracle::new(ai.clone()),
            None => AffinityOracle::unconfigured(),
        }
    }

    /// Engine with a seeded fallback RNG
    pub fn engine(&self, seed: u64) -> MatchingEngine {
        MatchingEngine::new(self.store.clone(), self.oracle(), self.notifier.clone())
            .with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(self.store.clone(), self.notifier.clone(), self.oracle())
    }

    pub fn ai_calls(&self) -> usize {
        self.ai.as_ref().map(|ai| ai.call_count()).unwrap_or(0)
    }
}

pub fn id_set<'a>(ids: impl IntoIterator<Item = &'a ParticipantId>) -> BTreeSet<String> {
    ids.into_iter().map(|id| id.to_string()).collect()
}

pub fn names(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
