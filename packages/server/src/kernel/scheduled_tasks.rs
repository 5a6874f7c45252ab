//! Scheduled matching runs using tokio-cron-scheduler.
//!
//! # Architecture
//!
//! The scheduler owns no matching logic. Each cron tick fires a
//! [`MatchingTrigger`], which starts a run only if none is in progress.
//!
//! ```text
//! Scheduler (MATCHING_SCHEDULE, e.g. Mon/Thu 10:00 UTC)
//!     │
//!     └─► MatchingTrigger::fire()
//!             ├─► run in progress → trigger dropped
//!             └─► MatchingEngine::run()
//! ```
//!
//! Overlapping triggers are dropped, not queued: a queued run would start
//! from a snapshot taken before the previous run's reset landed.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::matching::{MatchingEngine, RunOutcome};

/// Twice a week, Monday and Thursday at 10:00 UTC
pub const DEFAULT_MATCHING_SCHEDULE: &str = "0 0 10 * * Mon,Thu";

/// Single entrypoint for starting a matching run
///
/// Shared by the cron job and the manual HTTP trigger so both respect the
/// same one-run-at-a-time rule.
#[derive(Clone)]
pub struct MatchingTrigger {
    engine: Arc<MatchingEngine>,
    in_flight: Arc<Mutex<()>>,
}

impl MatchingTrigger {
    pub fn new(engine: Arc<MatchingEngine>) -> Self {
        Self {
            engine,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Run the engine unless a run is already in progress
    ///
    /// Returns None when the trigger was dropped.
    pub async fn fire(&self) -> Option<RunOutcome> {
        let Ok(_running) = self.in_flight.try_lock() else {
            tracing::warn!("Matching run already in progress, dropping trigger");
            return None;
        };

        Some(self.engine.run().await)
    }
}

/// Start the recurring matching job
pub async fn start_scheduler(trigger: MatchingTrigger, schedule: &str) -> Result<JobScheduler> {
    let matching_job = Job::new_async(schedule, move |_uuid, _lock| {
        let trigger = trigger.clone();
        Box::pin(async move {
            tracing::info!("Scheduled matching run triggered");
            if let Some(RunOutcome::Aborted { stage, error }) = trigger.fire().await {
                tracing::error!(
                    stage = ?stage,
                    error = %error,
                    "Scheduled matching run aborted; eligible participants carry over"
                );
            }
        })
    })
    .with_context(|| format!("Invalid matching schedule: {}", schedule))?;

    let scheduler = JobScheduler::new().await?;
    scheduler.add(matching_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = %schedule, "Scheduled tasks started (matching runs)");
    Ok(scheduler)
}
