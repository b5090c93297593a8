//! Closed-vocabulary one-hot encoding for open-set categorical columns.
//!
//! A [`Vocabulary`] always contains the `"other"` catch-all, so every value
//! maps to exactly one generated column and no row is ever encoded as all
//! zeros.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::constants::columns::ONE_HOT_SEPARATOR;
use crate::constants::vocabularies::OTHER;
use crate::data::{Column, Dataset, Value};
use crate::errors::PipelineError;
use crate::types::{CategoryValue, ColumnName};

/// Ordered, duplicate-free set of canonical categories including `"other"`.
///
/// Member order fixes the order of the generated one-hot columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CategoryValue>", into = "Vec<CategoryValue>")]
pub struct Vocabulary {
    members: IndexSet<CategoryValue>,
}

impl Vocabulary {
    /// Build a vocabulary, rejecting empty lists, duplicates, and lists without `"other"`.
    pub fn new<I, S>(members: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<CategoryValue>,
    {
        let mut set = IndexSet::new();
        for member in members {
            let member = member.into();
            if !set.insert(member.clone()) {
                return Err(PipelineError::InvalidVocabulary(format!(
                    "duplicate member '{member}'"
                )));
            }
        }
        if set.is_empty() {
            return Err(PipelineError::InvalidVocabulary(
                "vocabulary must not be empty".to_string(),
            ));
        }
        if !set.contains(OTHER) {
            return Err(PipelineError::InvalidVocabulary(format!(
                "vocabulary must contain the '{OTHER}' member"
            )));
        }
        Ok(Self { members: set })
    }

    /// Vocabulary from a built-in member list known to satisfy the `new` checks.
    pub(crate) fn builtin(members: &[&'static str]) -> Self {
        debug_assert!(members.contains(&OTHER));
        Self {
            members: members.iter().map(|member| member.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false` for a constructed vocabulary; paired with `len`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.members.contains(value)
    }

    /// Canonical member for `value`: itself when known, otherwise `"other"`.
    pub fn resolve<'a>(&'a self, value: &'a str) -> &'a str {
        if self.members.contains(value) {
            value
        } else {
            OTHER
        }
    }

    /// Position of the member `value` resolves to.
    pub fn index_of(&self, value: &str) -> usize {
        self.members
            .get_index_of(self.resolve(value))
            .unwrap_or_default()
    }

    /// Names of the generated columns for `column`, in member order.
    pub fn column_names(&self, column: &str) -> Vec<ColumnName> {
        self.members
            .iter()
            .map(|member| format!("{column}{ONE_HOT_SEPARATOR}{member}"))
            .collect()
    }
}

impl TryFrom<Vec<CategoryValue>> for Vocabulary {
    type Error = PipelineError;

    fn try_from(members: Vec<CategoryValue>) -> Result<Self, Self::Error> {
        Self::new(members)
    }
}

impl From<Vocabulary> for Vec<CategoryValue> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.members.into_iter().collect()
    }
}

/// Replace `column` with one integer column per vocabulary member.
///
/// Generated columns are named `column + "_" + member` and appended after the
/// existing columns. Exactly one of them is `1` on every row.
pub fn encode(
    dataset: Dataset,
    column: &str,
    vocabulary: &Vocabulary,
) -> Result<Dataset, PipelineError> {
    let indices: Vec<usize> = dataset
        .text_values(column)?
        .into_iter()
        .map(|value| vocabulary.index_of(value))
        .collect();
    let (mut dataset, _) = dataset.take_column(column)?;
    for (position, name) in vocabulary.column_names(column).into_iter().enumerate() {
        let cells: Column = indices
            .iter()
            .map(|&idx| Value::Integer(i64::from(idx == position)))
            .collect();
        dataset = dataset.with_column(name, cells)?;
    }
    Ok(dataset)
}
