use serde::{Deserialize, Serialize};

use crate::constants::splits::DEFAULT_SEED;
use crate::errors::PipelineError;
use crate::features::FeatureConfig;
use crate::source::validate_limit;
use crate::splits::SplitRatios;
use crate::target::Target;

/// Top-level loader configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Label the dataset is prepared for.
    pub target: Target,
    /// Upper bound on rows read from the source; `None` reads everything.
    pub limit: Option<usize>,
    /// Train/test ratios.
    pub split: SplitRatios,
    /// RNG seed that controls the deterministic partition.
    pub seed: u64,
    /// Vocabularies for the categorical derivations.
    pub features: FeatureConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            limit: None,
            split: SplitRatios::default(),
            seed: DEFAULT_SEED,
            features: FeatureConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Default configuration for `target` with an optional row limit.
    pub fn for_target(target: Target, limit: Option<usize>) -> Self {
        Self {
            target,
            limit,
            ..Self::default()
        }
    }

    /// Check the limit and split ratios.
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_limit(self.limit)?;
        self.split.normalized()?;
        Ok(())
    }
}
