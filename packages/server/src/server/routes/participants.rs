use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::common::ParticipantId;
use crate::domains::matching::messages;
use crate::domains::participant::Participant;
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;

/// Profile fields; omitted fields keep their stored value
#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
    pub traits: Option<String>,
    pub bio: Option<String>,
}

fn parse_id(raw: String) -> Result<ParticipantId, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("Participant id must not be empty".to_string()));
    }
    Ok(ParticipantId::new(trimmed))
}

/// GET /participants/:id
pub async fn get_participant_handler(
    Extension(deps): Extension<ServerDeps>,
    Path(id): Path<String>,
) -> Result<Json<Participant>, ApiError> {
    let id = parse_id(id)?;

    deps.store
        .find(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// PUT /participants/:id
///
/// Creates or updates a profile. Eligibility is never touched here.
pub async fn upsert_participant_handler(
    Extension(deps): Extension<ServerDeps>,
    Path(id): Path<String>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Participant>, ApiError> {
    let id = parse_id(id)?;

    let participant = deps
        .store
        .upsert(&id, input.traits.as_deref(), input.bio.as_deref())
        .await?;
    info!(participant = %participant.id, "Profile saved");

    if let Err(e) = deps
        .notifier
        .send(&participant.id, &messages::profile_saved())
        .await
    {
        warn!(participant = %participant.id, error = %e, "Failed to confirm profile save");
    }

    Ok(Json(participant))
}

/// POST /participants/:id/opt-in
///
/// Marks the participant eligible for the next run. 404 without a profile.
pub async fn opt_in_handler(
    Extension(deps): Extension<ServerDeps>,
    Path(id): Path<String>,
) -> Result<Json<Participant>, ApiError> {
    let id = parse_id(id)?;

    let participant = deps.store.mark_eligible(&id).await?;
    info!(participant = %participant.id, "Participant opted in for the next round");

    if let Err(e) = deps
        .notifier
        .send(&participant.id, &messages::opted_in())
        .await
    {
        warn!(participant = %participant.id, error = %e, "Failed to confirm opt-in");
    }

    Ok(Json(participant))
}
