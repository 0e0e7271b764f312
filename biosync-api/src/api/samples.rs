//! Status and disposal point-update endpoints
//!
//! Keyed by a bare rlims_id that may name a specimen or an aliquot; the
//! service resolves which.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::ApiResult;
use crate::payload::{DisposalStatusPayload, StatusPayload};
use crate::service::upsert;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    status: String,
}

fn updated() -> Json<UpdateResponse> {
    Json(UpdateResponse {
        status: "updated".to_string(),
    })
}

/// PUT /api/samples/:rlims_id/status
pub async fn put_status(
    State(state): State<AppState>,
    Path(rlims_id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> ApiResult<Json<UpdateResponse>> {
    upsert::apply_status(&state.db, &rlims_id, &payload).await?;
    Ok(updated())
}

/// PUT /api/samples/:rlims_id/disposal-status
pub async fn put_disposal_status(
    State(state): State<AppState>,
    Path(rlims_id): Path<String>,
    Json(payload): Json<DisposalStatusPayload>,
) -> ApiResult<Json<UpdateResponse>> {
    upsert::apply_disposal(&state.db, &rlims_id, &payload).await?;
    Ok(updated())
}
