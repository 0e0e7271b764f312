//! Participant registration endpoint
//!
//! Participants are owned by the enrollment system; this surface only
//! registers the biobank id so specimen upserts can validate against it.

use axum::{extract::State, Json};
use biosync_common::time;

use crate::api::ApiResult;
use crate::payload::{ParticipantPayload, ParticipantResponse};
use crate::AppState;

/// POST /api/participants
///
/// Idempotent: re-registering an existing biobank id returns the existing
/// participant.
pub async fn post_participant(
    State(state): State<AppState>,
    Json(payload): Json<ParticipantPayload>,
) -> ApiResult<Json<ParticipantResponse>> {
    sqlx::query("INSERT OR IGNORE INTO participants (biobank_id, created_at) VALUES (?, ?)")
        .bind(&payload.biobank_id)
        .bind(time::now().timestamp())
        .execute(&state.db)
        .await
        .map_err(biosync_common::Error::from)?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM participants WHERE biobank_id = ?")
        .bind(&payload.biobank_id)
        .fetch_one(&state.db)
        .await
        .map_err(biosync_common::Error::from)?;

    Ok(Json(ParticipantResponse {
        id,
        biobank_id: payload.biobank_id,
    }))
}
