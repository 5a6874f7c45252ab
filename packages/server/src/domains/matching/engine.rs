//! Matching engine - orchestrates one matching run
//!
//! Pipeline:
//! 1. Loading: snapshot of eligible participants (empty = no-op)
//! 2. Pairing: affinity oracle if configured, random fallback otherwise or on any failure
//! 3. Dispatching: one message per participant, best effort per recipient
//! 4. Resetting: clear eligibility for exactly the loaded ids, after all dispatch attempts
//!
//! Store failures abort the run before reset, so nobody loses their place:
//! they stay eligible and the next trigger picks them up.

use std::sync::{Arc, Mutex, PoisonError};

use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::common::ParticipantId;
use crate::domains::matching::models::PairingResult;
use crate::domains::matching::oracle::AffinityOracle;
use crate::domains::matching::{fallback, messages};
use crate::domains::participant::Participant;
use crate::kernel::{BaseNotifier, BaseParticipantStore};

/// Upper bound on in-flight notification requests
const MAX_CONCURRENT_DELIVERIES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Loading,
    Pairing,
    Dispatching,
    Resetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingSource {
    Oracle,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub participants: usize,
    pub pairs: usize,
    pub singletons: usize,
    pub source: PairingSource,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    /// Rows whose eligibility was cleared
    pub reset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nobody opted in; nothing was sent or written
    NoParticipants,
    Completed(RunSummary),
    /// A store operation failed; eligibility was left as it was
    Aborted { stage: RunState, error: String },
}

impl RunOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

#[derive(Debug, Default)]
struct DispatchReport {
    sent: usize,
    failed: usize,
}

pub struct MatchingEngine {
    store: Arc<dyn BaseParticipantStore>,
    oracle: AffinityOracle,
    notifier: Arc<dyn BaseNotifier>,
    rng: Mutex<StdRng>,
    state: Mutex<RunState>,
}

impl MatchingEngine {
    pub fn new(
        store: Arc<dyn BaseParticipantStore>,
        oracle: AffinityOracle,
        notifier: Arc<dyn BaseNotifier>,
    ) -> Self {
        Self {
            store,
            oracle,
            notifier,
            rng: Mutex::new(StdRng::from_entropy()),
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Replace the fallback RNG (seeded RNGs make tests reproducible)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn oracle(&self) -> &AffinityOracle {
        &self.oracle
    }

    /// Execute one full run. Never panics on collaborator failure; the
    /// outcome says how far it got.
    #[instrument(skip(self), name = "matching_run", fields(run_id = %Uuid::new_v4()))]
    pub async fn run(&self) -> RunOutcome {
        let tracker = StateTracker::new(&self.state);

        tracker.enter(RunState::Loading);
        let participants = match self.store.list_eligible().await {
            Ok(participants) => participants,
            Err(e) => {
                error!(error = %e, "Failed to load eligible participants, aborting run");
                return RunOutcome::Aborted {
                    stage: RunState::Loading,
                    error: e.to_string(),
                };
            }
        };

        if participants.is_empty() {
            info!("No eligible participants, nothing to match");
            return RunOutcome::NoParticipants;
        }

        let ids: Vec<ParticipantId> = participants.iter().map(|p| p.id.clone()).collect();
        info!(participants = ids.len(), "Loaded eligible participants");

        tracker.enter(RunState::Pairing);
        let (pairing, source) = self.pair(&participants, &ids).await;

        tracker.enter(RunState::Dispatching);
        let report = self.dispatch(&pairing).await;

        tracker.enter(RunState::Resetting);
        let reset = match self.store.reset_eligibility(&ids).await {
            Ok(reset) => reset,
            Err(e) => {
                error!(
                    error = %e,
                    participants = ids.len(),
                    "Failed to reset eligibility; participants stay eligible for the next run"
                );
                return RunOutcome::Aborted {
                    stage: RunState::Resetting,
                    error: e.to_string(),
                };
            }
        };

        if reset != ids.len() as u64 {
            warn!(
                expected = ids.len(),
                reset, "Eligibility reset touched a different number of rows than were loaded"
            );
        }

        let summary = RunSummary {
            participants: ids.len(),
            pairs: pairing.pair_count(),
            singletons: pairing.singleton_count(),
            source,
            notifications_sent: report.sent,
            notifications_failed: report.failed,
            reset,
        };

        info!(
            participants = summary.participants,
            pairs = summary.pairs,
            singletons = summary.singletons,
            source = ?summary.source,
            sent = summary.notifications_sent,
            failed = summary.notifications_failed,
            "Matching run complete"
        );

        RunOutcome::Completed(summary)
    }

    async fn pair(
        &self,
        participants: &[Participant],
        ids: &[ParticipantId],
    ) -> (PairingResult, PairingSource) {
        if self.oracle.is_configured() {
            match self.oracle.propose(participants).await {
                Ok(pairing) => match pairing.validate_against(ids) {
                    Ok(()) => return (pairing, PairingSource::Oracle),
                    Err(violation) => warn!(
                        error = %violation,
                        "Oracle pairing failed validation, falling back to random pairing"
                    ),
                },
                Err(e) => warn!(error = %e, "Affinity oracle failed, falling back to random pairing"),
            }
        } else {
            debug!("Affinity oracle not configured, using random pairing");
        }

        let pairing = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            fallback::pair(ids, &mut *rng)
        };
        (pairing, PairingSource::Fallback)
    }

    async fn dispatch(&self, pairing: &PairingResult) -> DispatchReport {
        let deliveries: Vec<(ParticipantId, String)> = pairing
            .groups()
            .iter()
            .flat_map(messages::for_group)
            .collect();

        let outcomes: Vec<bool> = stream::iter(deliveries)
            .map(|(recipient, text)| async move {
                match self.notifier.send(&recipient, &text).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(recipient = %recipient, error = %e, "Failed to deliver matching message");
                        false
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DELIVERIES)
            .collect()
            .await;

        let sent = outcomes.iter().filter(|delivered| **delivered).count();
        DispatchReport {
            sent,
            failed: outcomes.len() - sent,
        }
    }
}

/// Publishes the current stage and drops back to Idle however the run ends
struct StateTracker<'a> {
    state: &'a Mutex<RunState>,
}

impl<'a> StateTracker<'a> {
    fn new(state: &'a Mutex<RunState>) -> Self {
        Self { state }
    }

    fn enter(&self, stage: RunState) {
        debug!(stage = ?stage, "Matching run stage");
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = stage;
    }
}

impl Drop for StateTracker<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = RunState::Idle;
    }
}
