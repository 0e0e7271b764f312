//! Difference detection between paired sample records
//!
//! Mismatches are data, not errors: the engine returns typed Difference
//! records and only raises for infrastructure failures. Each field check is
//! independent and produces at most one difference per pair.

use std::fmt;

use biosync_common::config::ReconSettings;
use biosync_common::db::models::{StoredSample, STATUS_DISPOSED};
use chrono::DateTime;
use serde::Serialize;

use crate::status_map::{statuses_equivalent, ReportStatus};

/// The registry API's view of one sample, flattened for comparison.
/// Timestamps are unix seconds, already normalized from the stored text
/// dates.
#[derive(Debug, Clone)]
pub struct ApiSample {
    pub rlims_id: String,
    pub biobank_id: String,
    pub test_code: String,
    pub order_id: String,
    pub status: String,
    pub disposal_reason: String,
    pub confirmed_at: Option<i64>,
    pub disposed_at: Option<i64>,
    pub created_at: i64,
}

/// One physical sample's two records, either of which may be missing
#[derive(Debug, Clone)]
pub struct SamplePair {
    pub report: Option<StoredSample>,
    pub api: Option<ApiSample>,
}

impl SamplePair {
    pub fn sample_id(&self) -> &str {
        match (&self.report, &self.api) {
            (Some(report), _) => &report.sample_id,
            (None, Some(api)) => &api.rlims_id,
            (None, None) => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceKind {
    MissingFromSir,
    MissingFromApiData,
    BiobankId,
    TestCode,
    OrderId,
    ConfirmedDate,
    DisposalDate,
    Status,
}

/// A typed divergence between the two records of one sample
#[derive(Debug, Clone, Serialize)]
pub struct Difference {
    pub sample_id: String,
    pub kind: DifferenceKind,
    pub report_value: Option<String>,
    pub api_value: Option<String>,
}

impl Difference {
    fn new(sample_id: &str, kind: DifferenceKind) -> Self {
        Self {
            sample_id: sample_id.to_string(),
            kind,
            report_value: None,
            api_value: None,
        }
    }

    fn with_values(
        sample_id: &str,
        kind: DifferenceKind,
        report_value: String,
        api_value: String,
    ) -> Self {
        Self {
            sample_id: sample_id.to_string(),
            kind,
            report_value: Some(report_value),
            api_value: Some(api_value),
        }
    }

    pub fn missing_from_sir(sample_id: &str) -> Self {
        Self::new(sample_id, DifferenceKind::MissingFromSir)
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report_value.as_deref().unwrap_or("-");
        let api = self.api_value.as_deref().unwrap_or("-");
        match self.kind {
            DifferenceKind::MissingFromSir => write!(
                f,
                "MISSING_FROM_SIR sample {}: present in API data, absent from inventory report",
                self.sample_id
            ),
            DifferenceKind::MissingFromApiData => write!(
                f,
                "MISSING_FROM_API_DATA sample {}: present in inventory report, absent from API data",
                self.sample_id
            ),
            DifferenceKind::BiobankId => write!(
                f,
                "BIOBANK_ID sample {}: report={report} api={api}",
                self.sample_id
            ),
            DifferenceKind::TestCode => write!(
                f,
                "TEST_CODE sample {}: report={report} api={api}",
                self.sample_id
            ),
            DifferenceKind::OrderId => write!(
                f,
                "ORDER_ID sample {}: report={report} api={api}",
                self.sample_id
            ),
            DifferenceKind::ConfirmedDate => write!(
                f,
                "CONFIRMED_DATE sample {}: report={report} api={api}",
                self.sample_id
            ),
            DifferenceKind::DisposalDate => write!(
                f,
                "DISPOSAL_DATE sample {}: report={report} api={api}",
                self.sample_id
            ),
            DifferenceKind::Status => write!(
                f,
                "STATUS sample {}: report={report} api={api}",
                self.sample_id
            ),
        }
    }
}

/// A report row first observed more than the staleness window before the
/// API-side disposal never receives the disposal update: the reporting
/// pipeline's observation window has passed.
pub fn is_stale_report(report: &StoredSample, api: &ApiSample, settings: &ReconSettings) -> bool {
    match api.disposed_at {
        Some(disposed_at) => {
            disposed_at - report.created_at > settings.staleness_window_days * 86_400
        }
        None => false,
    }
}

/// Pre-filter over the candidate pair set: stale pairs are excluded from
/// the disposal/status comparison block entirely, not tolerated field by
/// field.
pub fn partition_stale(
    pairs: Vec<SamplePair>,
    settings: &ReconSettings,
) -> (Vec<SamplePair>, Vec<SamplePair>) {
    pairs.into_iter().partition(|pair| match (&pair.report, &pair.api) {
        (Some(report), Some(api)) => !is_stale_report(report, api, settings),
        _ => true,
    })
}

/// The one asymmetry treated as expected skew: the report still says
/// RECEIVED while the API has already recorded a disposal the lab hasn't
/// caught up to. The comparator still reports it; callers filter at the
/// printing stage.
pub fn is_expected_disposal_lag(pair: &SamplePair) -> bool {
    match (&pair.report, &pair.api) {
        (Some(report), Some(api)) => {
            ReportStatus::parse(&report.status) == Some(ReportStatus::Received)
                && api.status == STATUS_DISPOSED
        }
        _ => false,
    }
}

/// Full field-by-field comparison of one pair
pub fn find_differences(pair: &SamplePair, settings: &ReconSettings) -> Vec<Difference> {
    let sample_id = pair.sample_id();

    let Some(report) = &pair.report else {
        return vec![Difference::new(sample_id, DifferenceKind::MissingFromSir)];
    };
    let Some(api) = &pair.api else {
        return vec![Difference::new(sample_id, DifferenceKind::MissingFromApiData)];
    };

    let mut differences = find_identity_differences_inner(sample_id, report, api, settings);

    if !within_tolerance(
        report.disposed_at,
        api.disposed_at,
        settings.timestamp_tolerance_secs,
    ) {
        differences.push(Difference::with_values(
            sample_id,
            DifferenceKind::DisposalDate,
            format_timestamp(report.disposed_at),
            format_timestamp(api.disposed_at),
        ));
    }

    let equivalent = ReportStatus::parse(&report.status).is_some_and(|report_status| {
        statuses_equivalent(
            report_status,
            &api.status,
            &api.disposal_reason,
            &api.test_code,
        )
    });
    if !equivalent {
        differences.push(Difference::with_values(
            sample_id,
            DifferenceKind::Status,
            report.status.clone(),
            format!("{}/{}", api.status, api.disposal_reason),
        ));
    }

    differences
}

/// Identity-field comparison only, used for pairs the staleness pre-filter
/// pulled out of disposal/status comparison
pub fn find_identity_differences(pair: &SamplePair, settings: &ReconSettings) -> Vec<Difference> {
    match (&pair.report, &pair.api) {
        (Some(report), Some(api)) => {
            find_identity_differences_inner(pair.sample_id(), report, api, settings)
        }
        _ => find_differences(pair, settings),
    }
}

fn find_identity_differences_inner(
    sample_id: &str,
    report: &StoredSample,
    api: &ApiSample,
    settings: &ReconSettings,
) -> Vec<Difference> {
    let mut differences = Vec::new();

    if report.biobank_id != api.biobank_id {
        differences.push(Difference::with_values(
            sample_id,
            DifferenceKind::BiobankId,
            report.biobank_id.clone(),
            api.biobank_id.clone(),
        ));
    }

    if report.test_code != api.test_code {
        differences.push(Difference::with_values(
            sample_id,
            DifferenceKind::TestCode,
            report.test_code.clone(),
            api.test_code.clone(),
        ));
    }

    if report.order_id != api.order_id {
        differences.push(Difference::with_values(
            sample_id,
            DifferenceKind::OrderId,
            report.order_id.clone(),
            api.order_id.clone(),
        ));
    }

    if !within_tolerance(
        report.confirmed_at,
        api.confirmed_at,
        settings.timestamp_tolerance_secs,
    ) {
        differences.push(Difference::with_values(
            sample_id,
            DifferenceKind::ConfirmedDate,
            format_timestamp(report.confirmed_at),
            format_timestamp(api.confirmed_at),
        ));
    }

    differences
}

/// The two pipelines log the same event at slightly different points;
/// instants within the tolerance window count as equal
fn within_tolerance(report: Option<i64>, api: Option<i64>, tolerance_secs: i64) -> bool {
    match (report, api) {
        (None, None) => true,
        (Some(a), Some(b)) => (a - b).abs() <= tolerance_secs,
        _ => false,
    }
}

fn format_timestamp(ts: Option<i64>) -> String {
    match ts.and_then(|t| DateTime::from_timestamp(t, 0)) {
        Some(dt) => dt.to_rfc3339(),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: &str) -> StoredSample {
        StoredSample {
            id: 1,
            sample_id: "s-1".to_string(),
            biobank_id: "Z1234".to_string(),
            test_code: "1ED04".to_string(),
            order_id: "ord-1".to_string(),
            status: status.to_string(),
            confirmed_at: Some(1_600_000_000),
            created_at: 1_599_990_000,
            disposed_at: None,
        }
    }

    fn api(status: &str, disposal_reason: &str) -> ApiSample {
        ApiSample {
            rlims_id: "s-1".to_string(),
            biobank_id: "Z1234".to_string(),
            test_code: "1ED04".to_string(),
            order_id: "ord-1".to_string(),
            status: status.to_string(),
            disposal_reason: disposal_reason.to_string(),
            confirmed_at: Some(1_600_000_000),
            disposed_at: None,
            created_at: 1_599_990_000,
        }
    }

    fn pair(report: StoredSample, api: ApiSample) -> SamplePair {
        SamplePair {
            report: Some(report),
            api: Some(api),
        }
    }

    #[test]
    fn test_consumed_vs_disposed_consumed_has_no_differences() {
        let differences = find_differences(
            &pair(report("CONSUMED"), api("Disposed", "Consumed")),
            &ReconSettings::default(),
        );
        assert!(differences.is_empty(), "got {differences:?}");
    }

    #[test]
    fn test_unknown_in_circulation_kit_code_exception() {
        let mut report = report("UNKNOWN");
        report.test_code = "1PXR2".to_string();
        let mut api = api("In Circulation", "");
        api.test_code = "1PXR2".to_string();
        let differences = find_differences(&pair(report, api), &ReconSettings::default());
        assert!(differences.is_empty());

        let mut report = self::report("UNKNOWN");
        report.test_code = "9ZZZ".to_string();
        let mut api = self::api("In Circulation", "");
        api.test_code = "9ZZZ".to_string();
        let differences = find_differences(&pair(report, api), &ReconSettings::default());
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].kind, DifferenceKind::Status);
    }

    #[test]
    fn test_confirmed_date_tolerance_window() {
        // Three hours apart: one CONFIRMED_DATE difference
        let mut api_sample = api("In Circulation", "");
        api_sample.confirmed_at = Some(1_600_000_000 + 3 * 3600);
        let differences = find_differences(
            &pair(report("RECEIVED"), api_sample),
            &ReconSettings::default(),
        );
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].kind, DifferenceKind::ConfirmedDate);

        // Three minutes apart: within tolerance
        let mut api_sample = api("In Circulation", "");
        api_sample.confirmed_at = Some(1_600_000_000 + 3 * 60);
        let differences = find_differences(
            &pair(report("RECEIVED"), api_sample),
            &ReconSettings::default(),
        );
        assert!(differences.is_empty());
    }

    #[test]
    fn test_missing_sides_are_terminal() {
        let differences = find_differences(
            &SamplePair {
                report: None,
                api: Some(api("In Circulation", "")),
            },
            &ReconSettings::default(),
        );
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].kind, DifferenceKind::MissingFromSir);

        let differences = find_differences(
            &SamplePair {
                report: Some(report("RECEIVED")),
                api: None,
            },
            &ReconSettings::default(),
        );
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].kind, DifferenceKind::MissingFromApiData);
    }

    #[test]
    fn test_each_identity_field_checked_independently() {
        let mut api_sample = api("In Circulation", "");
        api_sample.biobank_id = "Z9999".to_string();
        api_sample.test_code = "2ED05".to_string();
        api_sample.order_id = "ord-2".to_string();

        let differences = find_differences(
            &pair(report("RECEIVED"), api_sample),
            &ReconSettings::default(),
        );
        let kinds: Vec<DifferenceKind> = differences.iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&DifferenceKind::BiobankId));
        assert!(kinds.contains(&DifferenceKind::TestCode));
        assert!(kinds.contains(&DifferenceKind::OrderId));
        assert_eq!(differences.len(), 3);
    }

    #[test]
    fn test_expected_disposal_lag_detection() {
        let mut api_sample = api("Disposed", "Consumed");
        api_sample.disposed_at = Some(1_600_050_000);
        let lag_pair = pair(report("RECEIVED"), api_sample);
        assert!(is_expected_disposal_lag(&lag_pair));

        // The comparator still reports the differences; suppression is the
        // caller's job
        let differences = find_differences(&lag_pair, &ReconSettings::default());
        let kinds: Vec<DifferenceKind> = differences.iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&DifferenceKind::DisposalDate));
        assert!(kinds.contains(&DifferenceKind::Status));

        let ordinary = pair(report("CONSUMED"), api("Disposed", "Consumed"));
        assert!(!is_expected_disposal_lag(&ordinary));
    }

    #[test]
    fn test_staleness_partition() {
        let settings = ReconSettings::default();

        // Disposal 11 days after the report row was first observed
        let mut api_sample = api("Disposed", "Consumed");
        api_sample.disposed_at = Some(1_599_990_000 + 11 * 86_400);
        let stale_pair = pair(report("RECEIVED"), api_sample);

        // Disposal 2 days after
        let mut api_sample = api("Disposed", "Consumed");
        api_sample.disposed_at = Some(1_599_990_000 + 2 * 86_400);
        let fresh_pair = pair(report("RECEIVED"), api_sample);

        let (fresh, stale) = partition_stale(vec![stale_pair, fresh_pair], &settings);
        assert_eq!(fresh.len(), 1);
        assert_eq!(stale.len(), 1);

        // Stale pairs still get identity comparison
        let mut api_sample = api("Disposed", "Consumed");
        api_sample.disposed_at = Some(1_599_990_000 + 11 * 86_400);
        api_sample.test_code = "2ED05".to_string();
        let stale_pair = pair(report("RECEIVED"), api_sample);
        let differences = find_identity_differences(&stale_pair, &settings);
        let kinds: Vec<DifferenceKind> = differences.iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&DifferenceKind::TestCode));
        assert!(!kinds.contains(&DifferenceKind::Status));
        assert!(!kinds.contains(&DifferenceKind::DisposalDate));
    }

    #[test]
    fn test_unparseable_report_status_is_a_status_difference() {
        let differences = find_differences(
            &pair(report("SHIPPED"), api("In Circulation", "")),
            &ReconSettings::default(),
        );
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].kind, DifferenceKind::Status);
    }
}
