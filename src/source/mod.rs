//! Record sources feeding the dataset loader.
//!
//! Ownership model:
//! - `BugSource` is the loader-facing interface that produces a raw `Dataset`
//!   holding the record columns.
//! - Sources own their connection handling; callers never see a connection.

use std::sync::Arc;

use crate::data::{BugRecord, Dataset};
use crate::errors::PipelineError;
use crate::types::SourceId;

/// SQLite-backed source.
pub mod sqlite;

pub use sqlite::SqliteSource;

/// Loader-facing record source.
///
/// For a fixed data state, `fetch` with the same `limit` must return the same
/// rows in the same order so downstream partitions are reproducible.
pub trait BugSource: Send + Sync {
    /// Stable source identifier used in logs.
    fn id(&self) -> &str;

    /// Fetch up to `limit` raw records (all when `None`) as a dataset with the record columns.
    fn fetch(&self, limit: Option<usize>) -> Result<Dataset, PipelineError>;

    /// Exact number of records the source holds.
    fn reported_record_count(&self) -> Result<u128, PipelineError>;
}

/// Reject `Some(0)`; a limit must be a positive row count.
pub fn validate_limit(limit: Option<usize>) -> Result<(), PipelineError> {
    match limit {
        Some(0) => Err(PipelineError::Configuration(
            "limit must be a positive integer".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Source over an already materialized dataset.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    id: SourceId,
    dataset: Arc<Dataset>,
}

impl InMemorySource {
    /// Create an in-memory source from a prebuilt dataset.
    pub fn new(id: impl Into<SourceId>, dataset: Dataset) -> Self {
        Self {
            id: id.into(),
            dataset: Arc::new(dataset),
        }
    }

    /// Create an in-memory source from typed records.
    pub fn from_records(id: impl Into<SourceId>, records: Vec<BugRecord>) -> Self {
        Self::new(id, Dataset::from_records(records))
    }
}

impl BugSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, limit: Option<usize>) -> Result<Dataset, PipelineError> {
        validate_limit(limit)?;
        let total = self.dataset.n_rows();
        let take = limit.map_or(total, |limit| limit.min(total));
        if take == total {
            return Ok((*self.dataset).clone());
        }
        let indices: Vec<usize> = (0..take).collect();
        self.dataset.select_rows(&indices)
    }

    fn reported_record_count(&self) -> Result<u128, PipelineError> {
        Ok(self.dataset.n_rows() as u128)
    }
}
