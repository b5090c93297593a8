//! Field-specific feature derivations applied to a filtered dataset.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::columns::{
    ASSIGNED_TO_INIT, BOOL_SUFFIX, CC_INIT, COUNT_SUFFIX, DESC_INIT, PRODUCT_INIT,
    SHORT_DESC_INIT, VERSION_INIT, WORD_COUNT_SUFFIX,
};
use crate::constants::vocabularies::{PRODUCT, VERSION};
use crate::data::{Column, Dataset, Value};
use crate::errors::PipelineError;
use crate::vocabulary::{Vocabulary, encode};

/// Vocabularies used by the categorical derivations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Vocabulary for `product_init`.
    pub product_vocabulary: Vocabulary,
    /// Vocabulary for `version_init`.
    pub version_vocabulary: Vocabulary,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            product_vocabulary: Vocabulary::builtin(&PRODUCT),
            version_vocabulary: Vocabulary::builtin(&VERSION),
        }
    }
}

impl FeatureConfig {
    /// Apply every derivation, consuming each source column exactly once.
    ///
    /// Resulting columns, appended in this order:
    /// `assigned_to_init_bool`, `cc_init_cnt`, `short_desc_init_wordcnt`,
    /// `desc_init_wordcnt`, the `product_init_*` block, the `version_init_*` block.
    pub fn transform(&self, dataset: Dataset) -> Result<Dataset, PipelineError> {
        for column in [
            ASSIGNED_TO_INIT,
            CC_INIT,
            SHORT_DESC_INIT,
            DESC_INIT,
            PRODUCT_INIT,
            VERSION_INIT,
        ] {
            dataset.require_column(column)?;
        }
        let dataset = derive_assigned_flag(dataset)?;
        let dataset = derive_cc_count(dataset)?;
        let dataset = derive_word_count(dataset, SHORT_DESC_INIT)?;
        let dataset = derive_word_count(dataset, DESC_INIT)?;
        let dataset = encode(dataset, PRODUCT_INIT, &self.product_vocabulary)?;
        let dataset = encode(dataset, VERSION_INIT, &self.version_vocabulary)?;
        debug!(
            rows = dataset.n_rows(),
            columns = dataset.n_columns(),
            "features derived"
        );
        Ok(dataset)
    }
}

/// Apply the default derivations.
pub fn transform(dataset: Dataset) -> Result<Dataset, PipelineError> {
    FeatureConfig::default().transform(dataset)
}

/// `assigned_to_init` → `assigned_to_init_bool`: `0` only for the exact empty string.
pub fn derive_assigned_flag(dataset: Dataset) -> Result<Dataset, PipelineError> {
    replace_with(dataset, ASSIGNED_TO_INIT, BOOL_SUFFIX, |value| {
        Value::from(!value.is_empty())
    })
}

/// `cc_init` → `cc_init_cnt`: number of `@` characters.
pub fn derive_cc_count(dataset: Dataset) -> Result<Dataset, PipelineError> {
    replace_with(dataset, CC_INIT, COUNT_SUFFIX, |value| {
        count_value(value.matches('@').count())
    })
}

/// `column` → `column_wordcnt`. The source column is kept.
pub fn derive_word_count(dataset: Dataset, column: &str) -> Result<Dataset, PipelineError> {
    let counts: Column = dataset
        .text_values(column)?
        .into_iter()
        .map(|value| count_value(word_count(value)))
        .collect();
    dataset.with_column(format!("{column}{WORD_COUNT_SUFFIX}"), counts)
}

/// Number of ASCII-whitespace-delimited tokens. No case or punctuation handling.
pub fn word_count(text: &str) -> usize {
    text.split_ascii_whitespace().count()
}

fn replace_with(
    dataset: Dataset,
    column: &str,
    suffix: &str,
    derive: impl Fn(&str) -> Value,
) -> Result<Dataset, PipelineError> {
    let derived: Column = dataset
        .text_values(column)?
        .into_iter()
        .map(derive)
        .collect();
    let (dataset, _) = dataset.take_column(column)?;
    dataset.with_column(format!("{column}{suffix}"), derived)
}

fn count_value(count: usize) -> Value {
    Value::Integer(i64::try_from(count).unwrap_or(i64::MAX))
}
