use std::fs;
use std::hash::Hash;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::splits::{
    DEFAULT_SEED, DEFAULT_TEST_RATIO, DEFAULT_TRAIN_RATIO, RATIO_EPSILON,
};
use crate::data::{Column, Dataset};
use crate::errors::PipelineError;
use crate::hash::stable_hash_with;
use crate::types::ColumnName;

/// Logical dataset partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitLabel {
    /// Training split.
    Train,
    /// Test split.
    Test,
}

/// Ratio configuration for train/test assignment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    /// Fraction assigned to train.
    pub train: f32,
    /// Fraction assigned to test.
    pub test: f32,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: DEFAULT_TRAIN_RATIO,
            test: DEFAULT_TEST_RATIO,
        }
    }
}

impl SplitRatios {
    /// Validate that ratios sum to `1.0` (within epsilon) and leave both partitions possible.
    pub fn normalized(self) -> Result<Self, PipelineError> {
        let sum = self.train + self.test;
        if (sum - 1.0).abs() > RATIO_EPSILON {
            return Err(PipelineError::Configuration(
                "split ratios must sum to 1.0".to_string(),
            ));
        }
        if !(self.test > 0.0 && self.test < 1.0) {
            return Err(PipelineError::Configuration(
                "test ratio must be strictly between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(self)
    }

    /// Number of test rows for `total` rows: `ceil(test * total)`.
    pub fn test_count(self, total: usize) -> usize {
        let scaled = f64::from(self.test) * total as f64;
        // Absorb f32 representation error (0.2f32 * 10 is slightly above 2).
        let raw = (scaled - scaled * 1e-7).ceil() as usize;
        raw.min(total)
    }
}

/// Feature/label partition produced by [`train_test_split`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    /// Training features.
    pub x_train: Dataset,
    /// Test features.
    pub x_test: Dataset,
    /// Training labels, aligned with `x_train` rows.
    pub y_train: Column,
    /// Test labels, aligned with `x_test` rows.
    pub y_test: Column,
}

impl TrainTestSplit {
    /// Feature columns shared by both partitions.
    pub fn feature_names(&self) -> Vec<ColumnName> {
        self.x_train.column_names().map(str::to_string).collect()
    }

    /// Rows in the given partition.
    pub fn len(&self, label: SplitLabel) -> usize {
        match label {
            SplitLabel::Train => self.y_train.len(),
            SplitLabel::Test => self.y_test.len(),
        }
    }

    pub fn labels(&self, label: SplitLabel) -> &Column {
        match label {
            SplitLabel::Train => &self.y_train,
            SplitLabel::Test => &self.y_test,
        }
    }

    /// Content hash of both partitions, stable for identical input and seed within a build.
    pub fn fingerprint(&self) -> u64 {
        stable_hash_with(|hasher| {
            for (name, column) in self.x_train.iter_columns().chain(self.x_test.iter_columns()) {
                name.hash(hasher);
                hash_cells(column, hasher);
            }
            hash_cells(&self.y_train, hasher);
            hash_cells(&self.y_test, hasher);
        })
    }

    /// Write the split as JSON for downstream training.
    pub fn write_json(&self, path: &Path, target: &str, seed: u64) -> Result<(), PipelineError> {
        let export = SplitExport {
            generated_at: Utc::now(),
            target,
            seed,
            fingerprint: self.fingerprint(),
            split: self,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(&export)?;
        fs::write(path, payload)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SplitExport<'a> {
    generated_at: DateTime<Utc>,
    target: &'a str,
    seed: u64,
    fingerprint: u64,
    split: &'a TrainTestSplit,
}

fn hash_cells<H: std::hash::Hasher>(column: &Column, hasher: &mut H) {
    column.len().hash(hasher);
    for value in column {
        // JSON text is a canonical, hashable rendering of every variant.
        serde_json::to_string(value).unwrap_or_default().hash(hasher);
    }
}

/// Seeded shuffle of `0..total`.
pub fn shuffled_indices(total: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..total).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
}

/// Partition rows of `features` and `labels` into train and test sets.
///
/// Rows are permuted with a seeded shuffle; the first `ceil(test * n)` rows
/// of the permutation form the test set and the rest the training set.
/// The same inputs, ratios and seed always produce the same partition.
pub fn train_test_split(
    features: Dataset,
    labels: Column,
    ratios: SplitRatios,
    seed: u64,
) -> Result<TrainTestSplit, PipelineError> {
    let ratios = ratios.normalized()?;
    if labels.len() != features.n_rows() {
        return Err(PipelineError::LengthMismatch {
            column: "<labels>".to_string(),
            expected: features.n_rows(),
            got: labels.len(),
        });
    }
    let total = labels.len();
    let permutation = shuffled_indices(total, seed);
    let (test_idx, train_idx) = permutation.split_at(ratios.test_count(total));
    let pick = |indices: &[usize]| -> Column {
        indices.iter().map(|&idx| labels[idx].clone()).collect()
    };
    Ok(TrainTestSplit {
        x_train: features.select_rows(train_idx)?,
        x_test: features.select_rows(test_idx)?,
        y_train: pick(train_idx),
        y_test: pick(test_idx),
    })
}

/// [`train_test_split`] with the default 75/25 ratios and seed.
pub fn default_split(features: Dataset, labels: Column) -> Result<TrainTestSplit, PipelineError> {
    train_test_split(features, labels, SplitRatios::default(), DEFAULT_SEED)
}
