use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::common::ParticipantId;

/// Participant model - SQL persistence layer
///
/// `traits` is a short categorical tag (usually an MBTI code) and `bio` a
/// free-text self-introduction; both are optional and shown to the affinity
/// oracle verbatim. `eligible` means "opted into the next round" and is
/// cleared by every completed matching run.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub traits: Option<String>,
    pub bio: Option<String>,
    pub eligible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// Build a fresh, not-yet-eligible record (used by in-memory stores and tests)
    pub fn new(id: impl Into<ParticipantId>, traits: Option<String>, bio: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            traits,
            bio,
            eligible: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Find participant by ID
    pub async fn find_by_id(id: &ParticipantId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM participants WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find every participant opted into the next round
    ///
    /// Ordered by sign-up time so a single run sees a stable sequence.
    pub async fn find_eligible(pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM participants WHERE eligible = true ORDER BY created_at, id",
        )
        .fetch_all(pool)
        .await
    }

    /// Insert or update a profile
    ///
    /// Only the supplied fields are overwritten; `eligible` is never touched.
    pub async fn upsert(
        id: &ParticipantId,
        traits: Option<&str>,
        bio: Option<&str>,
        pool: &PgPool,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO participants (id, traits, bio)
             VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET
                traits = COALESCE(EXCLUDED.traits, participants.traits),
                bio = COALESCE(EXCLUDED.bio, participants.bio),
                updated_at = NOW()
             RETURNING *",
        )
        .bind(id)
        .bind(traits)
        .bind(bio)
        .fetch_one(pool)
        .await
    }

    /// Opt a registered participant into the next round
    ///
    /// Returns None when no profile exists for `id`.
    pub async fn mark_eligible(id: &ParticipantId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE participants SET eligible = true, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Clear eligibility for exactly the given ids in one statement
    pub async fn reset_eligibility(ids: &[ParticipantId], pool: &PgPool) -> sqlx::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let raw_ids: Vec<&str> = ids.iter().map(ParticipantId::as_str).collect();
        let result = sqlx::query(
            "UPDATE participants SET eligible = false, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(raw_ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
