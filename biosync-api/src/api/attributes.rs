//! Specimen attribute point-update endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::ApiResult;
use crate::payload::AttributeValuePayload;
use crate::service::upsert;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AttributeResponse {
    status: String,
}

/// PUT /api/specimens/:rlims_id/attributes/:name
pub async fn put_attribute(
    State(state): State<AppState>,
    Path((rlims_id, name)): Path<(String, String)>,
    Json(payload): Json<AttributeValuePayload>,
) -> ApiResult<Json<AttributeResponse>> {
    upsert::upsert_attribute(&state.db, &rlims_id, &name, payload.value.as_deref()).await?;
    Ok(Json(AttributeResponse {
        status: "updated".to_string(),
    }))
}

/// DELETE /api/specimens/:rlims_id/attributes/:name
pub async fn delete_attribute(
    State(state): State<AppState>,
    Path((rlims_id, name)): Path<(String, String)>,
) -> ApiResult<Json<AttributeResponse>> {
    upsert::delete_attribute(&state.db, &rlims_id, &name).await?;
    Ok(Json(AttributeResponse {
        status: "deleted".to_string(),
    }))
}
