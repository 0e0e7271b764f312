//! Dynamic specimen-or-aliquot resolution
//!
//! Point updates and aliquot attachment are keyed by a bare rlims_id that
//! may name either a Specimen or an Aliquot. The tagged variant makes the
//! "exactly one of two kinds" outcome explicit instead of spreading
//! null-checks over two optional lookups.

use biosync_common::db::models::{Aliquot, Specimen};
use biosync_common::{Error, Result};
use sqlx::SqlitePool;

/// A resolved sample: the root specimen or a nested aliquot
#[derive(Debug, Clone)]
pub enum SampleRef {
    Specimen(Specimen),
    Aliquot(Aliquot),
}

impl SampleRef {
    pub fn rlims_id(&self) -> &str {
        match self {
            SampleRef::Specimen(s) => &s.rlims_id,
            SampleRef::Aliquot(a) => &a.rlims_id,
        }
    }

    /// The rlims_id of the specimen at the root of this sample's tree
    pub fn root_specimen_rlims_id(&self) -> &str {
        match self {
            SampleRef::Specimen(s) => &s.rlims_id,
            SampleRef::Aliquot(a) => &a.root_specimen_rlims_id,
        }
    }
}

/// Resolve an rlims_id to a Specimen or, failing that, an Aliquot.
///
/// Specimen lookup is attempted first; the two identifier spaces do not
/// overlap in well-formed data, so order only matters for malformed input.
pub async fn resolve_sample(pool: &SqlitePool, rlims_id: &str) -> Result<SampleRef> {
    let specimen = sqlx::query_as::<_, Specimen>("SELECT * FROM specimens WHERE rlims_id = ?")
        .bind(rlims_id)
        .fetch_optional(pool)
        .await?;

    if let Some(specimen) = specimen {
        return Ok(SampleRef::Specimen(specimen));
    }

    let aliquot = sqlx::query_as::<_, Aliquot>("SELECT * FROM aliquots WHERE rlims_id = ?")
        .bind(rlims_id)
        .fetch_optional(pool)
        .await?;

    if let Some(aliquot) = aliquot {
        return Ok(SampleRef::Aliquot(aliquot));
    }

    Err(Error::NotFound(format!(
        "No specimen or aliquot with rlims id {rlims_id}"
    )))
}

/// Fetch a specimen by rlims_id, or NotFound
pub async fn require_specimen(pool: &SqlitePool, rlims_id: &str) -> Result<Specimen> {
    sqlx::query_as::<_, Specimen>("SELECT * FROM specimens WHERE rlims_id = ?")
        .bind(rlims_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No specimen with rlims id {rlims_id}")))
}
