//! Specimen upsert service
//!
//! Two distinct operation kinds share this module and the transition rules:
//!
//! - the nested-upsert path (`upsert_specimen`), which reconciles a whole
//!   payload tree against persisted state in one transaction with
//!   full-replace semantics for child collections, and
//! - the point-update paths (`apply_status`, `apply_disposal`,
//!   `upsert_attribute`, `upsert_aliquot`), which mutate in place and only
//!   touch supplied fields.
//!
//! Batch upserts process each element in its own transaction; one malformed
//! record never aborts its siblings.

use biosync_common::db::models::{Aliquot, Specimen, StatusBlock};
use biosync_common::{time, Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info};

use crate::payload::{
    AliquotPayload, AttributePayload, BatchError, BatchSummary, BatchUpsertResponse,
    DatasetPayload, DisposalStatusPayload, SpecimenPayload, StatusPayload,
};
use crate::service::lookup::{self, SampleRef};
use crate::service::preloader::{DatasetItemKey, Preloader};
use crate::service::transition;

/// Where a written aliquot hangs: directly off the specimen or off another
/// aliquot
#[derive(Debug, Clone, Copy)]
enum AliquotParent {
    Specimen(i64),
    Aliquot(i64),
}

/// How child collections of an aliquot are treated during a write
#[derive(Debug, Clone, Copy, PartialEq)]
enum ReplaceMode {
    /// Nested-upsert path: the payload defines the whole collection
    Full,
    /// Point path: collections are only replaced when supplied
    Point,
}

/// Create or update a specimen tree from a nested payload, in one
/// transaction. Collections in the payload replace the persisted set.
pub async fn upsert_specimen(pool: &SqlitePool, payload: &SpecimenPayload) -> Result<Specimen> {
    validate_required(payload)?;

    let rlims_id = payload.rlims_id.as_deref().unwrap_or_default();
    let biobank_id = payload.participant_id.as_deref().unwrap_or_default();

    let participant_id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM participants WHERE biobank_id = ?")
            .bind(biobank_id)
            .fetch_optional(pool)
            .await?;
    let participant_id = participant_id
        .ok_or_else(|| Error::InvalidInput(format!("Biobank id {biobank_id} does not exist")))?;

    let mut tx = pool.begin().await?;

    // Remove aliquots absent from the payload first, so hydration sees the
    // post-delete state and reattached subtrees insert cleanly.
    let payload_aliquots = payload.aliquots.as_deref().unwrap_or_default();
    delete_absent_aliquots(&mut tx, rlims_id, payload_aliquots).await?;

    let mut preloader = Preloader::new();
    preloader.request_specimen(rlims_id);
    for aliquot in payload_aliquots {
        register_aliquot_keys(&mut preloader, aliquot);
    }
    preloader.hydrate(&mut tx).await?;

    let specimen_id =
        write_specimen_row(&mut tx, payload, participant_id, preloader.specimen(rlims_id))
            .await?;

    replace_attributes(&mut tx, specimen_id, payload.attributes.as_deref()).await?;

    for aliquot in payload_aliquots {
        write_aliquot_subtree(
            &mut tx,
            &preloader,
            rlims_id,
            AliquotParent::Specimen(specimen_id),
            aliquot,
            ReplaceMode::Full,
        )
        .await?;
    }

    let specimen = sqlx::query_as::<_, Specimen>("SELECT * FROM specimens WHERE id = ?")
        .bind(specimen_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Upserted specimen {}", rlims_id);
    Ok(specimen)
}

/// Process a batch of independent specimen payloads.
///
/// Each element runs in its own transaction; failures are collected into
/// the response instead of propagating.
pub async fn upsert_specimen_batch(
    pool: &SqlitePool,
    payloads: &[SpecimenPayload],
) -> BatchUpsertResponse {
    let total_received = payloads.len();
    let mut success_count = 0;
    let mut errors = Vec::new();

    for payload in payloads {
        match upsert_specimen(pool, payload).await {
            Ok(_) => success_count += 1,
            Err(e) => errors.push(BatchError {
                rlims_id: payload.rlims_id.clone().unwrap_or_default(),
                error: batch_error_message(e),
            }),
        }
    }

    info!(
        "Batch upsert: {}/{} succeeded, {} failed",
        success_count,
        total_received,
        errors.len()
    );

    BatchUpsertResponse {
        summary: BatchSummary {
            total_received,
            success_count,
        },
        errors,
    }
}

/// Validation and not-found failures carry their message; anything else is
/// reported generically so a surprise inside one element stays contained
fn batch_error_message(error: Error) -> String {
    match error {
        Error::InvalidInput(msg) | Error::NotFound(msg) => msg,
        other => {
            error!("Batch element failed unexpectedly: {other}");
            "Unknown error".to_string()
        }
    }
}

/// Partial status update on a specimen or aliquot resolved by rlims_id
pub async fn apply_status(pool: &SqlitePool, rlims_id: &str, payload: &StatusPayload) -> Result<()> {
    match lookup::resolve_sample(pool, rlims_id).await? {
        SampleRef::Specimen(specimen) => {
            let mut block = specimen.status_block();
            transition::apply_status_update(&mut block, payload);
            update_specimen_block(pool, specimen.id, &block).await
        }
        SampleRef::Aliquot(aliquot) => {
            let mut block = aliquot.status_block();
            transition::apply_status_update(&mut block, payload);
            update_aliquot_block(pool, aliquot.id, &block).await
        }
    }
}

/// Partial disposal update on a specimen or aliquot resolved by rlims_id
pub async fn apply_disposal(
    pool: &SqlitePool,
    rlims_id: &str,
    payload: &DisposalStatusPayload,
) -> Result<()> {
    if payload.reason.is_none() && payload.disposal_date.is_none() {
        return Err(Error::missing_fields(&["disposalDate"]));
    }

    match lookup::resolve_sample(pool, rlims_id).await? {
        SampleRef::Specimen(specimen) => {
            let mut block = specimen.status_block();
            transition::apply_disposal_update(&mut block, payload);
            update_specimen_block(pool, specimen.id, &block).await
        }
        SampleRef::Aliquot(aliquot) => {
            let mut block = aliquot.status_block();
            transition::apply_disposal_update(&mut block, payload);
            update_aliquot_block(pool, aliquot.id, &block).await
        }
    }
}

/// Point upsert of one attribute, outside the full-replace path
pub async fn upsert_attribute(
    pool: &SqlitePool,
    specimen_rlims_id: &str,
    name: &str,
    value: Option<&str>,
) -> Result<()> {
    let specimen = lookup::require_specimen(pool, specimen_rlims_id).await?;

    sqlx::query(
        "INSERT INTO specimen_attributes (specimen_id, name, value) VALUES (?, ?, ?) \
         ON CONFLICT(specimen_id, name) DO UPDATE SET value = excluded.value",
    )
    .bind(specimen.id)
    .bind(name)
    .bind(value.unwrap_or_default())
    .execute(pool)
    .await?;

    Ok(())
}

/// Point delete of one attribute; deleting a name that was never set is a
/// no-op, only a missing specimen is an error
pub async fn delete_attribute(pool: &SqlitePool, specimen_rlims_id: &str, name: &str) -> Result<()> {
    let specimen = lookup::require_specimen(pool, specimen_rlims_id).await?;

    sqlx::query("DELETE FROM specimen_attributes WHERE specimen_id = ? AND name = ?")
        .bind(specimen.id)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Attach or update one aliquot under a parent resolved dynamically as
/// Specimen-or-Aliquot. Nested datasets/children are upserted when supplied
/// and left alone when not.
pub async fn upsert_aliquot(
    pool: &SqlitePool,
    parent_rlims_id: &str,
    rlims_id: &str,
    payload: &AliquotPayload,
) -> Result<Aliquot> {
    let parent_sample = lookup::resolve_sample(pool, parent_rlims_id).await?;
    let root_rlims_id = parent_sample.root_specimen_rlims_id().to_string();
    let parent = match &parent_sample {
        SampleRef::Specimen(s) => AliquotParent::Specimen(s.id),
        SampleRef::Aliquot(a) => AliquotParent::Aliquot(a.id),
    };

    let mut payload = payload.clone();
    payload.rlims_id = Some(rlims_id.to_string());

    let mut tx = pool.begin().await?;

    let mut preloader = Preloader::new();
    register_aliquot_keys(&mut preloader, &payload);
    preloader.hydrate(&mut tx).await?;

    let aliquot_id = write_aliquot_subtree(
        &mut tx,
        &preloader,
        &root_rlims_id,
        parent,
        &payload,
        ReplaceMode::Point,
    )
    .await?;

    let aliquot = sqlx::query_as::<_, Aliquot>("SELECT * FROM aliquots WHERE id = ?")
        .bind(aliquot_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(aliquot)
}

/// Required fields on the nested-upsert path, reported together in one
/// message in client field naming
fn validate_required(payload: &SpecimenPayload) -> Result<()> {
    let mut missing = Vec::new();
    if payload.rlims_id.as_deref().unwrap_or("").is_empty() {
        missing.push("rlimsID");
    }
    if payload.order_id.as_deref().unwrap_or("").is_empty() {
        missing.push("orderID");
    }
    if payload.participant_id.as_deref().unwrap_or("").is_empty() {
        missing.push("participantID");
    }
    if payload.test_code.as_deref().unwrap_or("").is_empty() {
        missing.push("testcode");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::missing_fields(&missing))
    }
}

/// Register every natural key in an aliquot subtree for hydration
fn register_aliquot_keys(preloader: &mut Preloader, payload: &AliquotPayload) {
    if let Some(rlims_id) = payload.rlims_id.as_deref() {
        preloader.request_aliquot(rlims_id);
    }
    for dataset in payload.datasets.as_deref().unwrap_or_default() {
        if let Some(ds_rlims_id) = dataset.rlims_id.as_deref() {
            preloader.request_dataset(ds_rlims_id);
            for item in dataset.items.as_deref().unwrap_or_default() {
                if let Some(param_id) = item.param_id.as_deref() {
                    preloader.request_dataset_item(DatasetItemKey {
                        dataset_rlims_id: ds_rlims_id.to_string(),
                        param_id: param_id.to_string(),
                    });
                }
            }
        }
    }
    for child in payload.aliquots.as_deref().unwrap_or_default() {
        register_aliquot_keys(preloader, child);
    }
}

/// Collect every aliquot rlims_id present in the payload tree
fn collect_aliquot_ids(aliquots: &[AliquotPayload], out: &mut Vec<String>) {
    for aliquot in aliquots {
        if let Some(rlims_id) = &aliquot.rlims_id {
            out.push(rlims_id.clone());
        }
        collect_aliquot_ids(aliquots_of(aliquot), out);
    }
}

fn aliquots_of(aliquot: &AliquotPayload) -> &[AliquotPayload] {
    aliquot.aliquots.as_deref().unwrap_or_default()
}

/// Delete the specimen's aliquots that are absent from the payload tree.
/// Cascades take datasets and items with them.
async fn delete_absent_aliquots(
    conn: &mut SqliteConnection,
    root_rlims_id: &str,
    payload_aliquots: &[AliquotPayload],
) -> Result<()> {
    let mut keep = Vec::new();
    collect_aliquot_ids(payload_aliquots, &mut keep);

    if keep.is_empty() {
        sqlx::query("DELETE FROM aliquots WHERE root_specimen_rlims_id = ?")
            .bind(root_rlims_id)
            .execute(&mut *conn)
            .await?;
    } else {
        let placeholders = vec!["?"; keep.len()].join(", ");
        let sql = format!(
            "DELETE FROM aliquots WHERE root_specimen_rlims_id = ? AND rlims_id NOT IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql).bind(root_rlims_id);
        for rlims_id in &keep {
            query = query.bind(rlims_id);
        }
        query.execute(&mut *conn).await?;
    }

    Ok(())
}

/// Insert or update the specimen row itself, applying the status/disposal
/// blocks through the shared transition rules
async fn write_specimen_row(
    conn: &mut SqliteConnection,
    payload: &SpecimenPayload,
    participant_id: i64,
    existing: Option<&Specimen>,
) -> Result<i64> {
    let mut block = existing.map(Specimen::status_block).unwrap_or_default();
    if let Some(status) = &payload.status {
        transition::replace_status_block(&mut block, status);
    }
    if let Some(disposal) = &payload.disposal_status {
        transition::replace_disposal_block(&mut block, disposal);
    }

    let now = time::now().timestamp();

    if let Some(existing) = existing {
        sqlx::query(
            r#"
            UPDATE specimens SET
                participant_id = ?, order_id = ?, test_code = ?,
                repository_id = ?, study_id = ?, cohort_id = ?,
                collection_date = ?, confirmed_date = ?,
                status = ?, freeze_thaw_count = ?, location = ?,
                quantity = ?, quantity_units = ?, processing_complete_date = ?, deviations = ?,
                disposal_reason = ?, disposal_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(participant_id)
        .bind(payload.order_id.as_deref().unwrap_or_default())
        .bind(payload.test_code.as_deref().unwrap_or_default())
        .bind(&payload.repository_id)
        .bind(&payload.study_id)
        .bind(&payload.cohort_id)
        .bind(&payload.collection_date)
        .bind(&payload.confirmed_date)
        .bind(&block.status)
        .bind(block.freeze_thaw_count)
        .bind(&block.location)
        .bind(block.quantity)
        .bind(&block.quantity_units)
        .bind(&block.processing_complete_date)
        .bind(&block.deviations)
        .bind(&block.disposal_reason)
        .bind(&block.disposal_date)
        .bind(now)
        .bind(existing.id)
        .execute(&mut *conn)
        .await?;

        Ok(existing.id)
    } else {
        let result = sqlx::query(
            r#"
            INSERT INTO specimens (
                rlims_id, participant_id, order_id, test_code,
                repository_id, study_id, cohort_id,
                collection_date, confirmed_date,
                status, freeze_thaw_count, location,
                quantity, quantity_units, processing_complete_date, deviations,
                disposal_reason, disposal_date, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payload.rlims_id.as_deref().unwrap_or_default())
        .bind(participant_id)
        .bind(payload.order_id.as_deref().unwrap_or_default())
        .bind(payload.test_code.as_deref().unwrap_or_default())
        .bind(&payload.repository_id)
        .bind(&payload.study_id)
        .bind(&payload.cohort_id)
        .bind(&payload.collection_date)
        .bind(&payload.confirmed_date)
        .bind(&block.status)
        .bind(block.freeze_thaw_count)
        .bind(&block.location)
        .bind(block.quantity)
        .bind(&block.quantity_units)
        .bind(&block.processing_complete_date)
        .bind(&block.deviations)
        .bind(&block.disposal_reason)
        .bind(&block.disposal_date)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

/// Full-replace of the specimen's attribute set. Plain inserts after the
/// delete: a payload with duplicate names hits the unique constraint and
/// the element fails as a whole.
async fn replace_attributes(
    conn: &mut SqliteConnection,
    specimen_id: i64,
    attributes: Option<&[AttributePayload]>,
) -> Result<()> {
    sqlx::query("DELETE FROM specimen_attributes WHERE specimen_id = ?")
        .bind(specimen_id)
        .execute(&mut *conn)
        .await?;

    for attribute in attributes.unwrap_or_default() {
        sqlx::query("INSERT INTO specimen_attributes (specimen_id, name, value) VALUES (?, ?, ?)")
            .bind(specimen_id)
            .bind(&attribute.name)
            .bind(attribute.value.as_deref().unwrap_or_default())
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Insert or update one aliquot and recurse into its datasets and children
async fn write_aliquot_subtree(
    conn: &mut SqliteConnection,
    preloader: &Preloader,
    root_rlims_id: &str,
    parent: AliquotParent,
    payload: &AliquotPayload,
    mode: ReplaceMode,
) -> Result<i64> {
    let rlims_id = payload
        .rlims_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            Error::InvalidInput("Aliquot missing required field: rlimsID".to_string())
        })?;

    let existing = preloader.aliquot(rlims_id);
    let mut block = existing.map(Aliquot::status_block).unwrap_or_default();
    if let Some(status) = &payload.status {
        transition::replace_status_block(&mut block, status);
    }
    if let Some(disposal) = &payload.disposal_status {
        transition::replace_disposal_block(&mut block, disposal);
    }

    let (specimen_id, parent_aliquot_id) = match parent {
        AliquotParent::Specimen(id) => (Some(id), None),
        AliquotParent::Aliquot(id) => (None, Some(id)),
    };
    let now = time::now().timestamp();

    let aliquot_id = if let Some(existing) = existing {
        sqlx::query(
            r#"
            UPDATE aliquots SET
                specimen_id = ?, parent_aliquot_id = ?, root_specimen_rlims_id = ?,
                sample_type = ?, child_plan_service = ?, initial_treatment = ?, container_type = ?,
                status = ?, freeze_thaw_count = ?, location = ?,
                quantity = ?, quantity_units = ?, processing_complete_date = ?, deviations = ?,
                disposal_reason = ?, disposal_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(specimen_id)
        .bind(parent_aliquot_id)
        .bind(root_rlims_id)
        .bind(&payload.sample_type)
        .bind(&payload.child_plan_service)
        .bind(&payload.initial_treatment)
        .bind(&payload.container_type)
        .bind(&block.status)
        .bind(block.freeze_thaw_count)
        .bind(&block.location)
        .bind(block.quantity)
        .bind(&block.quantity_units)
        .bind(&block.processing_complete_date)
        .bind(&block.deviations)
        .bind(&block.disposal_reason)
        .bind(&block.disposal_date)
        .bind(now)
        .bind(existing.id)
        .execute(&mut *conn)
        .await?;

        existing.id
    } else {
        let result = sqlx::query(
            r#"
            INSERT INTO aliquots (
                rlims_id, specimen_id, parent_aliquot_id, root_specimen_rlims_id,
                sample_type, child_plan_service, initial_treatment, container_type,
                status, freeze_thaw_count, location,
                quantity, quantity_units, processing_complete_date, deviations,
                disposal_reason, disposal_date, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rlims_id)
        .bind(specimen_id)
        .bind(parent_aliquot_id)
        .bind(root_rlims_id)
        .bind(&payload.sample_type)
        .bind(&payload.child_plan_service)
        .bind(&payload.initial_treatment)
        .bind(&payload.container_type)
        .bind(&block.status)
        .bind(block.freeze_thaw_count)
        .bind(&block.location)
        .bind(block.quantity)
        .bind(&block.quantity_units)
        .bind(&block.processing_complete_date)
        .bind(&block.deviations)
        .bind(&block.disposal_reason)
        .bind(&block.disposal_date)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        result.last_insert_rowid()
    };

    let replace_datasets = mode == ReplaceMode::Full || payload.datasets.is_some();
    if replace_datasets {
        let datasets = payload.datasets.as_deref().unwrap_or_default();
        delete_absent_datasets(conn, aliquot_id, datasets).await?;
        for dataset in datasets {
            write_dataset(conn, preloader, aliquot_id, dataset, mode).await?;
        }
    }

    for child in payload.aliquots.as_deref().unwrap_or_default() {
        Box::pin(write_aliquot_subtree(
            conn,
            preloader,
            root_rlims_id,
            AliquotParent::Aliquot(aliquot_id),
            child,
            mode,
        ))
        .await?;
    }

    Ok(aliquot_id)
}

async fn delete_absent_datasets(
    conn: &mut SqliteConnection,
    aliquot_id: i64,
    datasets: &[DatasetPayload],
) -> Result<()> {
    let keep: Vec<&str> = datasets
        .iter()
        .filter_map(|d| d.rlims_id.as_deref())
        .collect();

    if keep.is_empty() {
        sqlx::query("DELETE FROM datasets WHERE aliquot_id = ?")
            .bind(aliquot_id)
            .execute(&mut *conn)
            .await?;
    } else {
        let placeholders = vec!["?"; keep.len()].join(", ");
        let sql =
            format!("DELETE FROM datasets WHERE aliquot_id = ? AND rlims_id NOT IN ({placeholders})");
        let mut query = sqlx::query(&sql).bind(aliquot_id);
        for rlims_id in &keep {
            query = query.bind(rlims_id);
        }
        query.execute(&mut *conn).await?;
    }

    Ok(())
}

async fn write_dataset(
    conn: &mut SqliteConnection,
    preloader: &Preloader,
    aliquot_id: i64,
    payload: &DatasetPayload,
    mode: ReplaceMode,
) -> Result<()> {
    let rlims_id = payload
        .rlims_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            Error::InvalidInput("Dataset missing required field: rlimsID".to_string())
        })?;

    let dataset_id = if let Some(existing) = preloader.dataset(rlims_id) {
        sqlx::query("UPDATE datasets SET aliquot_id = ?, name = ?, status = ? WHERE id = ?")
            .bind(aliquot_id)
            .bind(payload.name.as_deref().unwrap_or_default())
            .bind(payload.status.as_deref().unwrap_or_default())
            .bind(existing.id)
            .execute(&mut *conn)
            .await?;
        existing.id
    } else {
        let result =
            sqlx::query("INSERT INTO datasets (rlims_id, aliquot_id, name, status) VALUES (?, ?, ?, ?)")
                .bind(rlims_id)
                .bind(aliquot_id)
                .bind(payload.name.as_deref().unwrap_or_default())
                .bind(payload.status.as_deref().unwrap_or_default())
                .execute(&mut *conn)
                .await?;
        result.last_insert_rowid()
    };

    let replace_items = mode == ReplaceMode::Full || payload.items.is_some();
    if replace_items {
        let items = payload.items.as_deref().unwrap_or_default();

        let keep: Vec<&str> = items.iter().filter_map(|i| i.param_id.as_deref()).collect();
        if keep.is_empty() {
            sqlx::query("DELETE FROM dataset_items WHERE dataset_id = ?")
                .bind(dataset_id)
                .execute(&mut *conn)
                .await?;
        } else {
            let placeholders = vec!["?"; keep.len()].join(", ");
            let sql = format!(
                "DELETE FROM dataset_items WHERE dataset_id = ? AND param_id NOT IN ({placeholders})"
            );
            let mut query = sqlx::query(&sql).bind(dataset_id);
            for param_id in &keep {
                query = query.bind(param_id);
            }
            query.execute(&mut *conn).await?;
        }

        for item in items {
            let param_id = item
                .param_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    Error::InvalidInput("Dataset item missing required field: paramID".to_string())
                })?;

            let key = DatasetItemKey {
                dataset_rlims_id: rlims_id.to_string(),
                param_id: param_id.to_string(),
            };
            if let Some(existing) = preloader.dataset_item(&key) {
                sqlx::query(
                    "UPDATE dataset_items SET dataset_id = ?, display_value = ?, display_units = ? WHERE id = ?",
                )
                .bind(dataset_id)
                .bind(&item.display_value)
                .bind(&item.display_units)
                .bind(existing.id)
                .execute(&mut *conn)
                .await?;
            } else {
                sqlx::query(
                    "INSERT INTO dataset_items (dataset_id, param_id, display_value, display_units) \
                     VALUES (?, ?, ?, ?) \
                     ON CONFLICT(dataset_id, param_id) DO UPDATE SET \
                     display_value = excluded.display_value, display_units = excluded.display_units",
                )
                .bind(dataset_id)
                .bind(param_id)
                .bind(&item.display_value)
                .bind(&item.display_units)
                .execute(&mut *conn)
                .await?;
            }
        }
    }

    Ok(())
}

async fn update_specimen_block(pool: &SqlitePool, id: i64, block: &StatusBlock) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE specimens SET
            status = ?, freeze_thaw_count = ?, location = ?,
            quantity = ?, quantity_units = ?, processing_complete_date = ?, deviations = ?,
            disposal_reason = ?, disposal_date = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&block.status)
    .bind(block.freeze_thaw_count)
    .bind(&block.location)
    .bind(block.quantity)
    .bind(&block.quantity_units)
    .bind(&block.processing_complete_date)
    .bind(&block.deviations)
    .bind(&block.disposal_reason)
    .bind(&block.disposal_date)
    .bind(time::now().timestamp())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn update_aliquot_block(pool: &SqlitePool, id: i64, block: &StatusBlock) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE aliquots SET
            status = ?, freeze_thaw_count = ?, location = ?,
            quantity = ?, quantity_units = ?, processing_complete_date = ?, deviations = ?,
            disposal_reason = ?, disposal_date = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&block.status)
    .bind(block.freeze_thaw_count)
    .bind(&block.location)
    .bind(block.quantity)
    .bind(&block.quantity_units)
    .bind(&block.processing_complete_date)
    .bind(&block.deviations)
    .bind(&block.disposal_reason)
    .bind(&block.disposal_date)
    .bind(time::now().timestamp())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
