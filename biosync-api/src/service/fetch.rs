//! Specimen tree retrieval in client JSON shape
//!
//! Loads the whole aggregate with one query per entity type and assembles
//! the nested payload in memory. Empty child collections come back as
//! `None` so they serialize as null.

use std::collections::HashMap;

use biosync_common::db::models::{
    Aliquot, Dataset, DatasetItem, Specimen, SpecimenAttribute, StatusBlock,
};
use biosync_common::Result;
use sqlx::SqlitePool;

use crate::payload::{
    AliquotPayload, AttributePayload, DatasetItemPayload, DatasetPayload, DisposalStatusPayload,
    SpecimenPayload, StatusPayload,
};
use crate::service::lookup;

/// Fetch a specimen and its full aliquot/dataset tree as client JSON
pub async fn fetch_specimen_tree(pool: &SqlitePool, rlims_id: &str) -> Result<SpecimenPayload> {
    let specimen = lookup::require_specimen(pool, rlims_id).await?;

    let biobank_id: String = sqlx::query_scalar("SELECT biobank_id FROM participants WHERE id = ?")
        .bind(specimen.participant_id)
        .fetch_one(pool)
        .await?;

    let attributes = sqlx::query_as::<_, SpecimenAttribute>(
        "SELECT * FROM specimen_attributes WHERE specimen_id = ? ORDER BY name",
    )
    .bind(specimen.id)
    .fetch_all(pool)
    .await?;

    let aliquots = sqlx::query_as::<_, Aliquot>(
        "SELECT * FROM aliquots WHERE root_specimen_rlims_id = ? ORDER BY id",
    )
    .bind(&specimen.rlims_id)
    .fetch_all(pool)
    .await?;

    let aliquot_ids: Vec<i64> = aliquots.iter().map(|a| a.id).collect();
    let datasets = fetch_datasets(pool, &aliquot_ids).await?;
    let dataset_ids: Vec<i64> = datasets.iter().map(|d| d.id).collect();
    let items = fetch_dataset_items(pool, &dataset_ids).await?;

    Ok(assemble_tree(
        &specimen, &biobank_id, &attributes, &aliquots, &datasets, &items,
    ))
}

async fn fetch_datasets(pool: &SqlitePool, aliquot_ids: &[i64]) -> Result<Vec<Dataset>> {
    if aliquot_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; aliquot_ids.len()].join(", ");
    let sql = format!("SELECT * FROM datasets WHERE aliquot_id IN ({placeholders}) ORDER BY id");
    let mut query = sqlx::query_as::<_, Dataset>(&sql);
    for id in aliquot_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

async fn fetch_dataset_items(pool: &SqlitePool, dataset_ids: &[i64]) -> Result<Vec<DatasetItem>> {
    if dataset_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; dataset_ids.len()].join(", ");
    let sql =
        format!("SELECT * FROM dataset_items WHERE dataset_id IN ({placeholders}) ORDER BY id");
    let mut query = sqlx::query_as::<_, DatasetItem>(&sql);
    for id in dataset_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

fn assemble_tree(
    specimen: &Specimen,
    biobank_id: &str,
    attributes: &[SpecimenAttribute],
    aliquots: &[Aliquot],
    datasets: &[Dataset],
    items: &[DatasetItem],
) -> SpecimenPayload {
    let mut items_by_dataset: HashMap<i64, Vec<&DatasetItem>> = HashMap::new();
    for item in items {
        items_by_dataset.entry(item.dataset_id).or_default().push(item);
    }

    let mut datasets_by_aliquot: HashMap<i64, Vec<&Dataset>> = HashMap::new();
    for dataset in datasets {
        datasets_by_aliquot.entry(dataset.aliquot_id).or_default().push(dataset);
    }

    let mut children_by_parent: HashMap<i64, Vec<&Aliquot>> = HashMap::new();
    let mut top_level: Vec<&Aliquot> = Vec::new();
    let rlims_by_id: HashMap<i64, &str> =
        aliquots.iter().map(|a| (a.id, a.rlims_id.as_str())).collect();
    for aliquot in aliquots {
        match aliquot.parent_aliquot_id {
            Some(parent_id) => children_by_parent.entry(parent_id).or_default().push(aliquot),
            None => top_level.push(aliquot),
        }
    }

    let aliquot_payloads: Vec<AliquotPayload> = top_level
        .iter()
        .map(|a| {
            aliquot_to_payload(
                a,
                &children_by_parent,
                &datasets_by_aliquot,
                &items_by_dataset,
                &rlims_by_id,
            )
        })
        .collect();

    let attribute_payloads: Vec<AttributePayload> = attributes
        .iter()
        .map(|a| AttributePayload {
            name: a.name.clone(),
            value: Some(a.value.clone()),
        })
        .collect();

    SpecimenPayload {
        rlims_id: Some(specimen.rlims_id.clone()),
        order_id: Some(specimen.order_id.clone()),
        participant_id: Some(biobank_id.to_string()),
        test_code: Some(specimen.test_code.clone()),
        repository_id: specimen.repository_id.clone(),
        study_id: specimen.study_id.clone(),
        cohort_id: specimen.cohort_id.clone(),
        collection_date: specimen.collection_date.clone(),
        confirmed_date: specimen.confirmed_date.clone(),
        status: status_to_payload(&specimen.status_block()),
        disposal_status: disposal_to_payload(&specimen.status_block()),
        attributes: non_empty(attribute_payloads),
        aliquots: non_empty(aliquot_payloads),
    }
}

fn aliquot_to_payload(
    aliquot: &Aliquot,
    children_by_parent: &HashMap<i64, Vec<&Aliquot>>,
    datasets_by_aliquot: &HashMap<i64, Vec<&Dataset>>,
    items_by_dataset: &HashMap<i64, Vec<&DatasetItem>>,
    rlims_by_id: &HashMap<i64, &str>,
) -> AliquotPayload {
    let children: Vec<AliquotPayload> = children_by_parent
        .get(&aliquot.id)
        .map(|kids| {
            kids.iter()
                .map(|child| {
                    aliquot_to_payload(
                        child,
                        children_by_parent,
                        datasets_by_aliquot,
                        items_by_dataset,
                        rlims_by_id,
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let datasets: Vec<DatasetPayload> = datasets_by_aliquot
        .get(&aliquot.id)
        .map(|sets| {
            sets.iter()
                .map(|dataset| DatasetPayload {
                    rlims_id: Some(dataset.rlims_id.clone()),
                    name: Some(dataset.name.clone()),
                    status: Some(dataset.status.clone()),
                    items: non_empty(
                        items_by_dataset
                            .get(&dataset.id)
                            .map(|list| {
                                list.iter()
                                    .map(|item| DatasetItemPayload {
                                        param_id: Some(item.param_id.clone()),
                                        display_value: item.display_value.clone(),
                                        display_units: item.display_units.clone(),
                                    })
                                    .collect()
                            })
                            .unwrap_or_default(),
                    ),
                })
                .collect()
        })
        .unwrap_or_default();

    let block = aliquot.status_block();

    AliquotPayload {
        rlims_id: Some(aliquot.rlims_id.clone()),
        sample_type: aliquot.sample_type.clone(),
        child_plan_service: aliquot.child_plan_service.clone(),
        initial_treatment: aliquot.initial_treatment.clone(),
        container_type: aliquot.container_type.clone(),
        status: status_to_payload(&block),
        disposal_status: disposal_to_payload(&block),
        datasets: non_empty(datasets),
        aliquots: non_empty(children),
        parent_aliquot_id: aliquot
            .parent_aliquot_id
            .and_then(|id| rlims_by_id.get(&id).map(|s| s.to_string())),
        specimen_rlims_id: Some(aliquot.root_specimen_rlims_id.clone()),
    }
}

/// The status block serializes as null when nothing in it has been set
fn status_to_payload(block: &StatusBlock) -> Option<StatusPayload> {
    let empty = block.status.is_empty()
        && block.freeze_thaw_count.is_none()
        && block.location.is_none()
        && block.quantity.is_none()
        && block.quantity_units.is_none()
        && block.processing_complete_date.is_none()
        && block.deviations.is_none();
    if empty {
        return None;
    }
    Some(StatusPayload {
        status: Some(block.status.clone()),
        freeze_thaw_count: block.freeze_thaw_count,
        location: block.location.clone(),
        quantity: block.quantity,
        quantity_units: block.quantity_units.clone(),
        processing_complete_date: block.processing_complete_date.clone(),
        deviations: block.deviations.clone(),
    })
}

fn disposal_to_payload(block: &StatusBlock) -> Option<DisposalStatusPayload> {
    if block.disposal_reason.is_empty() && block.disposal_date.is_none() {
        return None;
    }
    Some(DisposalStatusPayload {
        reason: Some(block.disposal_reason.clone()),
        disposal_date: block.disposal_date.clone(),
    })
}

fn non_empty<T>(list: Vec<T>) -> Option<Vec<T>> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}
