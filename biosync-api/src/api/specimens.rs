//! Specimen upsert and retrieval endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::{ApiError, ApiResult};
use crate::payload::{SpecimenPayload, UpsertSpecimenRequest};
use crate::service::{fetch, upsert};
use crate::AppState;

/// POST /api/specimens
///
/// Accepts one nested specimen object or an array of them. A single object
/// responds with the persisted tree; an array responds with a per-element
/// summary and never fails as a whole for element-level errors.
pub async fn upsert_specimens(
    State(state): State<AppState>,
    Json(request): Json<UpsertSpecimenRequest>,
) -> Result<Response, ApiError> {
    match request {
        UpsertSpecimenRequest::Single(payload) => {
            let specimen = upsert::upsert_specimen(&state.db, &payload).await?;
            let tree = fetch::fetch_specimen_tree(&state.db, &specimen.rlims_id).await?;
            Ok(Json(tree).into_response())
        }
        UpsertSpecimenRequest::Batch(payloads) => {
            let response = upsert::upsert_specimen_batch(&state.db, &payloads).await;
            Ok(Json(response).into_response())
        }
    }
}

/// GET /api/specimens/:rlims_id
pub async fn get_specimen(
    State(state): State<AppState>,
    Path(rlims_id): Path<String>,
) -> ApiResult<Json<SpecimenPayload>> {
    let tree = fetch::fetch_specimen_tree(&state.db, &rlims_id).await?;
    Ok(Json(tree))
}
