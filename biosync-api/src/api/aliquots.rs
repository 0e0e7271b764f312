//! Aliquot point-update endpoint

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::ApiResult;
use crate::payload::AliquotPayload;
use crate::service::upsert;
use crate::AppState;

/// PUT /api/specimens/:parent_rlims_id/aliquots/:rlims_id
///
/// The parent may be the specimen itself or any aliquot in its tree.
pub async fn put_aliquot(
    State(state): State<AppState>,
    Path((parent_rlims_id, rlims_id)): Path<(String, String)>,
    Json(payload): Json<AliquotPayload>,
) -> ApiResult<Json<AliquotPayload>> {
    let aliquot = upsert::upsert_aliquot(&state.db, &parent_rlims_id, &rlims_id, &payload).await?;

    // Return the node as persisted, from the freshly fetched tree
    let tree =
        crate::service::fetch::fetch_specimen_tree(&state.db, &aliquot.root_specimen_rlims_id)
            .await?;
    let node = find_aliquot(tree.aliquots.as_deref().unwrap_or_default(), &rlims_id);

    Ok(Json(node.unwrap_or(AliquotPayload {
        rlims_id: Some(rlims_id),
        ..Default::default()
    })))
}

fn find_aliquot(aliquots: &[AliquotPayload], rlims_id: &str) -> Option<AliquotPayload> {
    for aliquot in aliquots {
        if aliquot.rlims_id.as_deref() == Some(rlims_id) {
            return Some(aliquot.clone());
        }
        if let Some(found) = find_aliquot(aliquots_of(aliquot), rlims_id) {
            return Some(found);
        }
    }
    None
}

fn aliquots_of(aliquot: &AliquotPayload) -> &[AliquotPayload] {
    aliquot.aliquots.as_deref().unwrap_or_default()
}
