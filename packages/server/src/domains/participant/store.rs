//! Postgres-backed participant store.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::common::ParticipantId;
use crate::domains::participant::{Participant, ParticipantError};
use crate::kernel::BaseParticipantStore;

/// Wrapper around a Postgres pool that implements BaseParticipantStore
#[derive(Clone)]
pub struct PostgresParticipantStore {
    pool: PgPool,
}

impl PostgresParticipantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseParticipantStore for PostgresParticipantStore {
    async fn upsert(
        &self,
        id: &ParticipantId,
        traits: Option<&str>,
        bio: Option<&str>,
    ) -> Result<Participant, ParticipantError> {
        let participant = Participant::upsert(id, traits, bio, &self.pool).await?;
        debug!(participant_id = %id, "Participant profile saved");
        Ok(participant)
    }

    async fn mark_eligible(&self, id: &ParticipantId) -> Result<Participant, ParticipantError> {
        Participant::mark_eligible(id, &self.pool)
            .await?
            .ok_or_else(|| ParticipantError::NotRegistered(id.clone()))
    }

    async fn list_eligible(&self) -> Result<Vec<Participant>, ParticipantError> {
        Ok(Participant::find_eligible(&self.pool).await?)
    }

    async fn reset_eligibility(&self, ids: &[ParticipantId]) -> Result<u64, ParticipantError> {
        Ok(Participant::reset_eligibility(ids, &self.pool).await?)
    }

    async fn find(&self, id: &ParticipantId) -> Result<Option<Participant>, ParticipantError> {
        Ok(Participant::find_by_id(id, &self.pool).await?)
    }

    async fn health_check(&self) -> Result<(), ParticipantError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
