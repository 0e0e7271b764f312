//! Status vocabulary equivalence
//!
//! The inventory report uses a coarse enumerated status taxonomy; the API
//! ingests free-text status and disposal-reason strings from a separate
//! vendor pipeline. This module is the single source of truth for "these
//! two vocabularies describe the same fact". The mapping is an explicit
//! exhaustive table, never substring matching.

use biosync_common::db::models::STATUS_DISPOSED;

/// API status string for samples still in the lab's working inventory
pub const STATUS_IN_CIRCULATION: &str = "In Circulation";

/// Exam-kit test code for which the report legitimately never learns the
/// sample's fate: kits circulate outside the inventory pipeline
pub const EXAM_KIT_TEST_CODE: &str = "1PXR2";

/// Inventory report status vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportStatus {
    Consumed,
    QnsForProcessing,
    Unknown,
    Received,
    QualityIssue,
    AccessioningError,
    LabAccident,
    Disposed,
    SampleNotProcessed,
}

impl ReportStatus {
    /// Parse the report extract's status column.
    ///
    /// "ACCESSINGING_ERROR" is the vendor extract's own spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONSUMED" => Some(Self::Consumed),
            "QNS_FOR_PROCESSING" => Some(Self::QnsForProcessing),
            "UNKNOWN" => Some(Self::Unknown),
            "RECEIVED" => Some(Self::Received),
            "QUALITY_ISSUE" => Some(Self::QualityIssue),
            "ACCESSINGING_ERROR" => Some(Self::AccessioningError),
            "LAB_ACCIDENT" => Some(Self::LabAccident),
            "DISPOSED" => Some(Self::Disposed),
            "SAMPLE_NOT_PROCESSED" => Some(Self::SampleNotProcessed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumed => "CONSUMED",
            Self::QnsForProcessing => "QNS_FOR_PROCESSING",
            Self::Unknown => "UNKNOWN",
            Self::Received => "RECEIVED",
            Self::QualityIssue => "QUALITY_ISSUE",
            Self::AccessioningError => "ACCESSINGING_ERROR",
            Self::LabAccident => "LAB_ACCIDENT",
            Self::Disposed => "DISPOSED",
            Self::SampleNotProcessed => "SAMPLE_NOT_PROCESSED",
        }
    }
}

/// Decide whether a report status and an API (status, disposal reason)
/// pair denote the same real-world state.
///
/// UNKNOWN + "In Circulation" is equivalent only for the exam-kit test
/// code; every other test code with that combination is a mismatch.
pub fn statuses_equivalent(
    report_status: ReportStatus,
    api_status: &str,
    api_disposal_reason: &str,
    test_code: &str,
) -> bool {
    use ReportStatus::*;

    match report_status {
        Consumed => api_status == STATUS_DISPOSED && api_disposal_reason == "Consumed",
        QnsForProcessing => {
            api_status == STATUS_DISPOSED && api_disposal_reason == "QNS for Processing"
        }
        Unknown => {
            let disposed_equivalent = api_status == STATUS_DISPOSED
                && matches!(
                    api_disposal_reason,
                    "Could Not Process" | "Consumed" | "Damaged" | "No Consent" | "Missing"
                );
            let kit_exception =
                api_status == STATUS_IN_CIRCULATION && test_code == EXAM_KIT_TEST_CODE;
            disposed_equivalent || kit_exception
        }
        Received => api_status == STATUS_IN_CIRCULATION,
        QualityIssue => api_status == STATUS_DISPOSED && api_disposal_reason == "Quality Issue",
        AccessioningError => {
            api_status == STATUS_DISPOSED && api_disposal_reason == "Accessioning Error"
        }
        LabAccident => api_status == STATUS_DISPOSED && api_disposal_reason == "Lab Accident",
        Disposed => api_status == STATUS_DISPOSED && api_disposal_reason == "Disposed",
        SampleNotProcessed => {
            api_status == STATUS_DISPOSED && api_disposal_reason == "Sample Not Processed"
        }
    }
}
