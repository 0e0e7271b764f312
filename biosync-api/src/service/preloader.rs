//! Batch identity resolution for hierarchical upserts
//!
//! A nested specimen payload can reference hundreds of entities. Resolving
//! each one individually costs one query per entity; the preloader instead
//! collects every natural key up front and issues one bulk query per entity
//! type, leaving an in-memory map from natural key to persisted row.
//!
//! A preloader is scoped to one upsert invocation: hydration is single-use,
//! and the loaded maps are read-only afterwards.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use biosync_common::db::models::{Aliquot, Dataset, DatasetItem, Specimen};
use biosync_common::{Error, Result};
use sqlx::SqliteConnection;

/// Composite natural key for dataset items: param_id alone is not unique
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetItemKey {
    pub dataset_rlims_id: String,
    pub param_id: String,
}

/// Requested-key set plus the loaded key→row map for one entity type
#[derive(Debug)]
struct PreloadMap<K, V> {
    requested: HashSet<K>,
    loaded: HashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V> PreloadMap<K, V> {
    fn new() -> Self {
        Self {
            requested: HashSet::new(),
            loaded: HashMap::new(),
        }
    }

    /// Idempotent under re-registration of the same key
    fn request(&mut self, key: K) {
        self.requested.insert(key);
    }

    fn insert_loaded(&mut self, key: K, value: V) {
        self.loaded.insert(key, value);
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.loaded.get(key)
    }

    fn has_requests(&self) -> bool {
        !self.requested.is_empty()
    }
}

/// Batch-hydration cache over the specimen aggregate's entity types
#[derive(Debug)]
pub struct Preloader {
    specimens: PreloadMap<String, Specimen>,
    aliquots: PreloadMap<String, Aliquot>,
    datasets: PreloadMap<String, Dataset>,
    dataset_items: PreloadMap<DatasetItemKey, DatasetItem>,
    hydrated: bool,
}

impl Default for Preloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Preloader {
    pub fn new() -> Self {
        Self {
            specimens: PreloadMap::new(),
            aliquots: PreloadMap::new(),
            datasets: PreloadMap::new(),
            dataset_items: PreloadMap::new(),
            hydrated: false,
        }
    }

    pub fn request_specimen(&mut self, rlims_id: &str) {
        self.specimens.request(rlims_id.to_string());
    }

    pub fn request_aliquot(&mut self, rlims_id: &str) {
        self.aliquots.request(rlims_id.to_string());
    }

    pub fn request_dataset(&mut self, rlims_id: &str) {
        self.datasets.request(rlims_id.to_string());
    }

    pub fn request_dataset_item(&mut self, key: DatasetItemKey) {
        self.dataset_items.request(key);
    }

    /// Resolve every requested key with one query per entity type.
    ///
    /// Single-use: a second call is an error, since the maps would silently
    /// go stale against writes made after the first hydration.
    pub async fn hydrate(&mut self, conn: &mut SqliteConnection) -> Result<()> {
        if self.hydrated {
            return Err(Error::Internal(
                "preloader hydrated twice; construct a fresh preloader per upsert".to_string(),
            ));
        }
        self.hydrated = true;

        if self.specimens.has_requests() {
            let keys: Vec<String> = self.specimens.requested.iter().cloned().collect();
            let sql = format!(
                "SELECT * FROM specimens WHERE rlims_id IN ({})",
                placeholders(keys.len())
            );
            let mut query = sqlx::query_as::<_, Specimen>(&sql);
            for key in &keys {
                query = query.bind(key);
            }
            for row in query.fetch_all(&mut *conn).await? {
                self.specimens.insert_loaded(row.rlims_id.clone(), row);
            }
        }

        if self.aliquots.has_requests() {
            let keys: Vec<String> = self.aliquots.requested.iter().cloned().collect();
            let sql = format!(
                "SELECT * FROM aliquots WHERE rlims_id IN ({})",
                placeholders(keys.len())
            );
            let mut query = sqlx::query_as::<_, Aliquot>(&sql);
            for key in &keys {
                query = query.bind(key);
            }
            for row in query.fetch_all(&mut *conn).await? {
                self.aliquots.insert_loaded(row.rlims_id.clone(), row);
            }
        }

        if self.datasets.has_requests() {
            let keys: Vec<String> = self.datasets.requested.iter().cloned().collect();
            let sql = format!(
                "SELECT * FROM datasets WHERE rlims_id IN ({})",
                placeholders(keys.len())
            );
            let mut query = sqlx::query_as::<_, Dataset>(&sql);
            for key in &keys {
                query = query.bind(key);
            }
            for row in query.fetch_all(&mut *conn).await? {
                self.datasets.insert_loaded(row.rlims_id.clone(), row);
            }
        }

        if self.dataset_items.has_requests() {
            // Composite key: OR-of-AND rather than string concatenation
            let keys: Vec<DatasetItemKey> = self.dataset_items.requested.iter().cloned().collect();
            let clause = keys
                .iter()
                .map(|_| "(d.rlims_id = ? AND di.param_id = ?)")
                .collect::<Vec<_>>()
                .join(" OR ");
            let sql = format!(
                "SELECT di.id, di.dataset_id, di.param_id, di.display_value, di.display_units, \
                 d.rlims_id AS dataset_rlims_id \
                 FROM dataset_items di JOIN datasets d ON d.id = di.dataset_id \
                 WHERE {clause}"
            );
            let mut query = sqlx::query_as::<_, DatasetItemJoinRow>(&sql);
            for key in &keys {
                query = query.bind(&key.dataset_rlims_id).bind(&key.param_id);
            }
            for row in query.fetch_all(&mut *conn).await? {
                let key = DatasetItemKey {
                    dataset_rlims_id: row.dataset_rlims_id.clone(),
                    param_id: row.param_id.clone(),
                };
                self.dataset_items.insert_loaded(
                    key,
                    DatasetItem {
                        id: row.id,
                        dataset_id: row.dataset_id,
                        param_id: row.param_id,
                        display_value: row.display_value,
                        display_units: row.display_units,
                    },
                );
            }
        }

        Ok(())
    }

    /// Look up a persisted specimen; `None` means "insert, not update"
    pub fn specimen(&self, rlims_id: &str) -> Option<&Specimen> {
        self.specimens.get(&rlims_id.to_string())
    }

    pub fn aliquot(&self, rlims_id: &str) -> Option<&Aliquot> {
        self.aliquots.get(&rlims_id.to_string())
    }

    pub fn dataset(&self, rlims_id: &str) -> Option<&Dataset> {
        self.datasets.get(&rlims_id.to_string())
    }

    pub fn dataset_item(&self, key: &DatasetItemKey) -> Option<&DatasetItem> {
        self.dataset_items.get(key)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DatasetItemJoinRow {
    id: i64,
    dataset_id: i64,
    param_id: String,
    display_value: Option<String>,
    display_units: Option<String>,
    dataset_rlims_id: String,
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
