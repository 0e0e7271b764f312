//! Client JSON shapes for the specimen API
//!
//! Field names follow the external contract (camelCase with `ID` suffixes,
//! `testcode` lowercase); internal snake_case names map through serde
//! renames. Absent child collections serialize as `null`, never `[]`.

use serde::{Deserialize, Serialize};

/// Nested specimen payload, used for both upsert input and retrieval output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecimenPayload {
    #[serde(rename = "rlimsID")]
    pub rlims_id: Option<String>,
    #[serde(rename = "orderID")]
    pub order_id: Option<String>,
    #[serde(rename = "participantID")]
    pub participant_id: Option<String>,
    #[serde(rename = "testcode")]
    pub test_code: Option<String>,
    #[serde(rename = "repositoryID")]
    pub repository_id: Option<String>,
    #[serde(rename = "studyID")]
    pub study_id: Option<String>,
    #[serde(rename = "cohortID")]
    pub cohort_id: Option<String>,
    #[serde(rename = "collectionDate")]
    pub collection_date: Option<String>,
    #[serde(rename = "confirmedDate")]
    pub confirmed_date: Option<String>,
    pub status: Option<StatusPayload>,
    #[serde(rename = "disposalStatus")]
    pub disposal_status: Option<DisposalStatusPayload>,
    pub attributes: Option<Vec<AttributePayload>>,
    pub aliquots: Option<Vec<AliquotPayload>>,
}

/// Status block: every field optional so point-updates can supply a subset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: Option<String>,
    #[serde(rename = "freezeThawCount")]
    pub freeze_thaw_count: Option<i64>,
    pub location: Option<String>,
    pub quantity: Option<f64>,
    #[serde(rename = "quantityUnits")]
    pub quantity_units: Option<String>,
    #[serde(rename = "processingCompleteDate")]
    pub processing_complete_date: Option<String>,
    pub deviations: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisposalStatusPayload {
    pub reason: Option<String>,
    #[serde(rename = "disposalDate")]
    pub disposal_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributePayload {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliquotPayload {
    #[serde(rename = "rlimsID")]
    pub rlims_id: Option<String>,
    #[serde(rename = "sampleType")]
    pub sample_type: Option<String>,
    #[serde(rename = "childPlanService")]
    pub child_plan_service: Option<String>,
    #[serde(rename = "initialTreatment")]
    pub initial_treatment: Option<String>,
    #[serde(rename = "containerType")]
    pub container_type: Option<String>,
    pub status: Option<StatusPayload>,
    #[serde(rename = "disposalStatus")]
    pub disposal_status: Option<DisposalStatusPayload>,
    pub datasets: Option<Vec<DatasetPayload>>,
    pub aliquots: Option<Vec<AliquotPayload>>,
    /// Parent linkage, populated on retrieval only
    #[serde(rename = "parentAliquotID")]
    pub parent_aliquot_id: Option<String>,
    /// Root specimen back-reference, populated on retrieval only
    #[serde(rename = "specimenRlimsID")]
    pub specimen_rlims_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetPayload {
    #[serde(rename = "rlimsID")]
    pub rlims_id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub items: Option<Vec<DatasetItemPayload>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetItemPayload {
    #[serde(rename = "paramID")]
    pub param_id: Option<String>,
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
    #[serde(rename = "displayUnits")]
    pub display_units: Option<String>,
}

/// Upsert request body: one specimen or an independent batch of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UpsertSpecimenRequest {
    Batch(Vec<SpecimenPayload>),
    Single(SpecimenPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_received: usize,
    pub success_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    #[serde(rename = "rlimsID")]
    pub rlims_id: String,
    pub error: String,
}

/// Batch response: element failures are reported inline, never as a
/// transport-level failure for the whole batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchUpsertResponse {
    pub summary: BatchSummary,
    pub errors: Vec<BatchError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantPayload {
    #[serde(rename = "biobankID")]
    pub biobank_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResponse {
    pub id: i64,
    #[serde(rename = "biobankID")]
    pub biobank_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeValuePayload {
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_field_renames() {
        let json = r#"{
            "rlimsID": "rl-1",
            "orderID": "ord-1",
            "participantID": "Z1234",
            "testcode": "1ED04",
            "cohortID": "c-9"
        }"#;
        let payload: SpecimenPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.rlims_id.as_deref(), Some("rl-1"));
        assert_eq!(payload.order_id.as_deref(), Some("ord-1"));
        assert_eq!(payload.participant_id.as_deref(), Some("Z1234"));
        assert_eq!(payload.test_code.as_deref(), Some("1ED04"));
        assert_eq!(payload.cohort_id.as_deref(), Some("c-9"));
    }

    #[test]
    fn test_absent_collections_serialize_as_null() {
        let payload = SpecimenPayload {
            rlims_id: Some("rl-1".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("attributes").unwrap().is_null());
        assert!(value.get("aliquots").unwrap().is_null());
    }

    #[test]
    fn test_single_vs_batch_request() {
        let single: UpsertSpecimenRequest =
            serde_json::from_str(r#"{"rlimsID": "a"}"#).unwrap();
        assert!(matches!(single, UpsertSpecimenRequest::Single(_)));

        let batch: UpsertSpecimenRequest =
            serde_json::from_str(r#"[{"rlimsID": "a"}, {"rlimsID": "b"}]"#).unwrap();
        match batch {
            UpsertSpecimenRequest::Batch(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected batch"),
        }
    }
}
