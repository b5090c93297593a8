//! Dataset loading: fetch, select target, derive features, split.

use tracing::info;

use crate::config::LoaderConfig;
use crate::data::{Column, Dataset};
use crate::errors::PipelineError;
use crate::source::BugSource;
use crate::splits::{TrainTestSplit, train_test_split};
use crate::target::{Target, select_target_with};

/// Feature matrix and label vector for one target, rows aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledDataset {
    pub target: Target,
    pub features: Dataset,
    pub labels: Column,
}

/// Remove the target column and return it next to the remaining feature columns.
pub fn separate_labels(dataset: Dataset, target: Target) -> Result<LabeledDataset, PipelineError> {
    let (features, labels) = dataset.take_column(target.label_column())?;
    Ok(LabeledDataset {
        target,
        features,
        labels,
    })
}

/// Orchestrates one load per call; holds no state between calls.
pub struct DatasetLoader<'a> {
    source: &'a dyn BugSource,
    config: LoaderConfig,
}

impl<'a> DatasetLoader<'a> {
    /// Create a loader over `source`; the configuration is validated up front.
    pub fn new(source: &'a dyn BugSource, config: LoaderConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Fetch and prepare the labeled dataset without partitioning it.
    pub fn prepare(&self) -> Result<LabeledDataset, PipelineError> {
        let target = self.config.target;
        info!(source = self.source.id(), limit = ?self.config.limit, "loading data");
        let raw = self.source.fetch(self.config.limit)?;
        let prepared = select_target_with(raw, target, &self.config.features)?;
        separate_labels(prepared, target)
    }

    /// Fetch, prepare, and partition into train and test sets.
    pub fn load(&self) -> Result<TrainTestSplit, PipelineError> {
        let labeled = self.prepare()?;
        let split = train_test_split(
            labeled.features,
            labeled.labels,
            self.config.split,
            self.config.seed,
        )?;
        info!(
            target = %self.config.target,
            train = split.y_train.len(),
            test = split.y_test.len(),
            features = split.x_train.n_columns(),
            "split dataset"
        );
        Ok(split)
    }
}

/// Load `target` from `source` with the default 75/25 split and seed.
pub fn load(
    source: &dyn BugSource,
    target: Target,
    limit: Option<usize>,
) -> Result<TrainTestSplit, PipelineError> {
    DatasetLoader::new(source, LoaderConfig::for_target(target, limit))?.load()
}
