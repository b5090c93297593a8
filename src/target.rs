//! Prediction targets and label filtering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::columns::{PRIORITY_FINAL, SEVERITY_FINAL};
use crate::constants::targets::{
    PRIORITY_NAME, PRIORITY_SENTINELS, SEVERITY_NAME, SEVERITY_SENTINELS,
};
use crate::data::Dataset;
use crate::errors::PipelineError;
use crate::features::FeatureConfig;

/// Supervised label a dataset is prepared for.
///
/// Each target owns its label column, the competing label column that is
/// dropped, and the sentinel values that mark a row as unlabeled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Predict `severity_final`.
    #[default]
    #[serde(rename = "severity_final")]
    Severity,
    /// Predict `priority_final`.
    #[serde(rename = "priority_final")]
    Priority,
}

impl Target {
    /// Every supported target.
    pub const ALL: [Target; 2] = [Target::Severity, Target::Priority];

    /// Column holding this target's label.
    pub fn label_column(self) -> &'static str {
        match self {
            Target::Severity => SEVERITY_FINAL,
            Target::Priority => PRIORITY_FINAL,
        }
    }

    /// Competing label column removed for this target.
    pub fn companion_column(self) -> &'static str {
        match self {
            Target::Severity => PRIORITY_FINAL,
            Target::Priority => SEVERITY_FINAL,
        }
    }

    /// Label values treated as "not meaningfully assigned".
    pub fn sentinels(self) -> &'static [&'static str] {
        match self {
            Target::Severity => &SEVERITY_SENTINELS,
            Target::Priority => &PRIORITY_SENTINELS,
        }
    }

    pub fn is_sentinel(self, label: &str) -> bool {
        self.sentinels().iter().any(|sentinel| *sentinel == label)
    }

    pub fn name(self) -> &'static str {
        match self {
            Target::Severity => SEVERITY_NAME,
            Target::Priority => PRIORITY_NAME,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = PipelineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|target| target.name() == raw)
            .ok_or_else(|| PipelineError::InvalidTarget(raw.to_string()))
    }
}

/// Drop the companion label and every row whose label is a sentinel.
///
/// The label column itself is kept unchanged.
pub fn filter_labels(dataset: Dataset, target: Target) -> Result<Dataset, PipelineError> {
    dataset.require_column(target.label_column())?;
    let dataset = dataset.drop_column(target.companion_column())?;
    let mask: Vec<bool> = dataset
        .text_values(target.label_column())?
        .into_iter()
        .map(|label| !target.is_sentinel(label))
        .collect();
    let before = dataset.n_rows();
    let dataset = dataset.retain_rows(&mask)?;
    debug!(
        target = %target,
        kept = dataset.n_rows(),
        dropped = before - dataset.n_rows(),
        "filtered unlabeled rows"
    );
    Ok(dataset)
}

/// Prepare `dataset` for `target` with the default feature derivations.
pub fn select_target(dataset: Dataset, target: Target) -> Result<Dataset, PipelineError> {
    select_target_with(dataset, target, &FeatureConfig::default())
}

/// Prepare `dataset` for `target`: filter labels, then derive features with `features`.
pub fn select_target_with(
    dataset: Dataset,
    target: Target,
    features: &FeatureConfig,
) -> Result<Dataset, PipelineError> {
    info!(target = %target, rows = dataset.n_rows(), "feature engineering");
    let dataset = filter_labels(dataset, target)?;
    features.transform(dataset)
}

/// String-keyed entry point; unknown targets fail with `InvalidTarget`.
pub fn select_target_by_name(dataset: Dataset, target: &str) -> Result<Dataset, PipelineError> {
    select_target(dataset, target.parse()?)
}
