// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (pairing, dispatch ordering) lives in the matching domain and uses these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::ParticipantId;
use crate::domains::participant::{Participant, ParticipantError};

// =============================================================================
// AI Trait (Infrastructure - schema-constrained LLM output)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Generate structured output constrained by a JSON schema
    /// Returns the raw JSON string; parse with serde_json in calling code
    async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<String>;
}

// =============================================================================
// Notification Trait (Infrastructure - direct messages)
// =============================================================================

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Send a direct message to a participant
    async fn send(&self, recipient: &ParticipantId, text: &str) -> Result<()>;
}

// =============================================================================
// Participant Store Trait (Infrastructure - persistence)
// =============================================================================

#[async_trait]
pub trait BaseParticipantStore: Send + Sync {
    /// Create the profile or overwrite the supplied fields; never touches eligibility
    async fn upsert(
        &self,
        id: &ParticipantId,
        traits: Option<&str>,
        bio: Option<&str>,
    ) -> Result<Participant, ParticipantError>;

    /// Opt into the next round; `NotRegistered` if no profile exists
    async fn mark_eligible(&self, id: &ParticipantId) -> Result<Participant, ParticipantError>;

    /// Snapshot of everyone currently opted in
    async fn list_eligible(&self) -> Result<Vec<Participant>, ParticipantError>;

    /// Clear eligibility for exactly `ids`, atomically. Idempotent.
    async fn reset_eligibility(&self, ids: &[ParticipantId]) -> Result<u64, ParticipantError>;

    async fn find(&self, id: &ParticipantId) -> Result<Option<Participant>, ParticipantError>;

    /// Cheap liveness probe for the health endpoint
    async fn health_check(&self) -> Result<(), ParticipantError> {
        Ok(())
    }
}
