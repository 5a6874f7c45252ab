use axum::{extract::Extension, http::StatusCode, Json};

use crate::domains::matching::RunOutcome;
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;

/// POST /matching/run
///
/// Manual trigger behind the same non-overlap guard as the scheduler. The
/// run is spawned so a disconnecting client cannot cancel it halfway.
pub async fn run_matching_handler(
    Extension(deps): Extension<ServerDeps>,
) -> Result<(StatusCode, Json<RunOutcome>), ApiError> {
    let trigger = deps.trigger.clone();
    let outcome = tokio::spawn(async move { trigger.fire().await })
        .await
        .map_err(|e| ApiError::Internal(format!("Matching run task failed: {}", e)))?
        .ok_or(ApiError::RunInProgress)?;

    let status = if outcome.is_aborted() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    Ok((status, Json(outcome)))
}
