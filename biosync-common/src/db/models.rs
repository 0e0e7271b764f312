//! Database row models
//!
//! The specimen aggregate (Specimen → Aliquot → Dataset → DatasetItem plus
//! free-form attributes) is the only persisted shape the registry owns.
//! StoredSample is the lab inventory report's independent record of the same
//! physical object, with its own identifier space and status vocabulary.

use serde::{Deserialize, Serialize};

/// API status string that marks a sample as disposed
pub const STATUS_DISPOSED: &str = "Disposed";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Participant {
    pub id: i64,
    pub biobank_id: String,
    pub created_at: i64,
}

/// One physical biological sample as known to the API ingestion path.
///
/// rlims_id is the lab-assigned natural key, immutable once assigned;
/// id is the internal surrogate.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Specimen {
    pub id: i64,
    pub rlims_id: String,
    pub participant_id: i64,
    pub order_id: String,
    pub test_code: String,
    pub repository_id: Option<String>,
    pub study_id: Option<String>,
    pub cohort_id: Option<String>,
    pub collection_date: Option<String>,
    pub confirmed_date: Option<String>,
    pub status: String,
    pub freeze_thaw_count: Option<i64>,
    pub location: Option<String>,
    pub quantity: Option<f64>,
    pub quantity_units: Option<String>,
    pub processing_complete_date: Option<String>,
    pub deviations: Option<String>,
    pub disposal_reason: String,
    pub disposal_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpecimenAttribute {
    pub id: i64,
    pub specimen_id: i64,
    pub name: String,
    pub value: String,
}

/// A derivative sample split from a Specimen or from another Aliquot.
///
/// Exactly one of specimen_id / parent_aliquot_id is set. The root
/// specimen's rlims_id is stored regardless of nesting depth.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Aliquot {
    pub id: i64,
    pub rlims_id: String,
    pub specimen_id: Option<i64>,
    pub parent_aliquot_id: Option<i64>,
    pub root_specimen_rlims_id: String,
    pub sample_type: Option<String>,
    pub child_plan_service: Option<String>,
    pub initial_treatment: Option<String>,
    pub container_type: Option<String>,
    pub status: String,
    pub freeze_thaw_count: Option<i64>,
    pub location: Option<String>,
    pub quantity: Option<f64>,
    pub quantity_units: Option<String>,
    pub processing_complete_date: Option<String>,
    pub deviations: Option<String>,
    pub disposal_reason: String,
    pub disposal_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dataset {
    pub id: i64,
    pub rlims_id: String,
    pub aliquot_id: i64,
    pub name: String,
    /// Lab-defined vocabulary, not normalized
    pub status: String,
}

/// One parameter/value measurement; param_id is unique only within its dataset
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DatasetItem {
    pub id: i64,
    pub dataset_id: i64,
    pub param_id: String,
    pub display_value: Option<String>,
    pub display_units: Option<String>,
}

/// The lab inventory report's record of a physical sample.
///
/// sample_id lives in a different identifier space than rlims_id, though in
/// well-formed data they denote the same physical object and are compared as
/// equal strings at reconciliation pairing time. Timestamps are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredSample {
    pub id: i64,
    pub sample_id: String,
    pub biobank_id: String,
    pub test_code: String,
    pub order_id: String,
    pub status: String,
    pub confirmed_at: Option<i64>,
    pub created_at: i64,
    pub disposed_at: Option<i64>,
}

/// The mutable status block shared by Specimen and Aliquot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusBlock {
    pub status: String,
    pub freeze_thaw_count: Option<i64>,
    pub location: Option<String>,
    pub quantity: Option<f64>,
    pub quantity_units: Option<String>,
    pub processing_complete_date: Option<String>,
    pub deviations: Option<String>,
    pub disposal_reason: String,
    pub disposal_date: Option<String>,
}

impl Specimen {
    pub fn status_block(&self) -> StatusBlock {
        StatusBlock {
            status: self.status.clone(),
            freeze_thaw_count: self.freeze_thaw_count,
            location: self.location.clone(),
            quantity: self.quantity,
            quantity_units: self.quantity_units.clone(),
            processing_complete_date: self.processing_complete_date.clone(),
            deviations: self.deviations.clone(),
            disposal_reason: self.disposal_reason.clone(),
            disposal_date: self.disposal_date.clone(),
        }
    }
}

impl Aliquot {
    pub fn status_block(&self) -> StatusBlock {
        StatusBlock {
            status: self.status.clone(),
            freeze_thaw_count: self.freeze_thaw_count,
            location: self.location.clone(),
            quantity: self.quantity,
            quantity_units: self.quantity_units.clone(),
            processing_complete_date: self.processing_complete_date.clone(),
            deviations: self.deviations.clone(),
            disposal_reason: self.disposal_reason.clone(),
            disposal_date: self.disposal_date.clone(),
        }
    }
}
