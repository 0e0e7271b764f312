//! Reconciliation queries
//!
//! Two windowed passes over the datastore: inventory report rows created in
//! the window (the driving set), and API specimens created in the window
//! with no inventory counterpart (the outer-join pass).

use std::collections::HashMap;

use biosync_common::db::models::StoredSample;
use biosync_common::{time, Result};
use sqlx::SqlitePool;

use crate::engine::ApiSample;

/// Inventory report rows created within [start_ts, end_ts]
pub async fn stored_samples_in_window(
    pool: &SqlitePool,
    start_ts: i64,
    end_ts: i64,
) -> Result<Vec<StoredSample>> {
    let samples = sqlx::query_as::<_, StoredSample>(
        "SELECT * FROM stored_samples WHERE created_at BETWEEN ? AND ? ORDER BY sample_id",
    )
    .bind(start_ts)
    .bind(end_ts)
    .fetch_all(pool)
    .await?;
    Ok(samples)
}

#[derive(Debug, sqlx::FromRow)]
struct ApiSampleRow {
    rlims_id: String,
    biobank_id: String,
    test_code: String,
    order_id: String,
    status: String,
    disposal_reason: String,
    confirmed_date: Option<String>,
    disposal_date: Option<String>,
    created_at: i64,
}

impl ApiSampleRow {
    fn into_sample(self) -> ApiSample {
        ApiSample {
            rlims_id: self.rlims_id,
            biobank_id: self.biobank_id,
            test_code: self.test_code,
            order_id: self.order_id,
            status: self.status,
            disposal_reason: self.disposal_reason,
            confirmed_at: parse_instant(self.confirmed_date.as_deref()),
            disposed_at: parse_instant(self.disposal_date.as_deref()),
            created_at: self.created_at,
        }
    }
}

fn parse_instant(s: Option<&str>) -> Option<i64> {
    s.and_then(time::parse_flexible).map(|dt| dt.timestamp())
}

const API_SAMPLE_COLUMNS: &str = "s.rlims_id, p.biobank_id, s.test_code, s.order_id, \
     s.status, s.disposal_reason, s.confirmed_date, s.disposal_date, s.created_at";

/// API specimens matching the given lab sample ids, keyed by rlims_id.
/// The two identifier spaces hold the same strings in well-formed data.
pub async fn api_samples_by_ids(
    pool: &SqlitePool,
    sample_ids: &[String],
) -> Result<HashMap<String, ApiSample>> {
    if sample_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; sample_ids.len()].join(", ");
    let sql = format!(
        "SELECT {API_SAMPLE_COLUMNS} \
         FROM specimens s JOIN participants p ON p.id = s.participant_id \
         WHERE s.rlims_id IN ({placeholders})"
    );
    let mut query = sqlx::query_as::<_, ApiSampleRow>(&sql);
    for id in sample_ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.rlims_id.clone(), row.into_sample()))
        .collect())
}

/// API specimens created within the window that have no inventory report
/// counterpart at all
pub async fn api_samples_without_report(
    pool: &SqlitePool,
    start_ts: i64,
    end_ts: i64,
) -> Result<Vec<ApiSample>> {
    let sql = format!(
        "SELECT {API_SAMPLE_COLUMNS} \
         FROM specimens s \
         JOIN participants p ON p.id = s.participant_id \
         LEFT JOIN stored_samples ss ON ss.sample_id = s.rlims_id \
         WHERE ss.id IS NULL AND s.created_at BETWEEN ? AND ? \
         ORDER BY s.rlims_id"
    );
    let rows = sqlx::query_as::<_, ApiSampleRow>(&sql)
        .bind(start_ts)
        .bind(end_ts)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(ApiSampleRow::into_sample).collect())
}
