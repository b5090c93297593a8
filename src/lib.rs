#![doc = include_str!("../README.md")]

/// Command-line runner behind the `bug_dataset` binary.
pub mod cli;
/// Loader configuration types.
pub mod config;
/// Centralized constants for columns, vocabularies, targets, splits, and storage.
pub mod constants;
/// Cell values, typed records, and the column-ordered dataset.
pub mod data;
/// Feature derivation over raw record columns.
pub mod features;
mod hash;
/// Dataset loading orchestration.
pub mod loader;
/// Label distribution helpers.
pub mod metrics;
/// Idempotent table provisioning.
pub mod provision;
/// Record source traits and built-in sources.
pub mod source;
/// Seeded train/test partitioning and split export.
pub mod splits;
/// Target selection and label filtering.
pub mod target;
/// Shared type aliases.
pub mod types;
/// Closed category vocabularies and one-hot encoding.
pub mod vocabulary;

mod errors;

pub use config::LoaderConfig;
pub use data::{BugRecord, Column, Dataset, Value};
pub use errors::PipelineError;
pub use features::{FeatureConfig, transform};
pub use loader::{DatasetLoader, LabeledDataset, load};
pub use metrics::{LabelDistribution, LabelShare, label_distribution};
pub use source::{BugSource, InMemorySource, SqliteSource};
pub use splits::{SplitLabel, SplitRatios, TrainTestSplit, train_test_split};
pub use target::{Target, filter_labels, select_target};
pub use types::{CategoryValue, ColumnName, LabelValue, SourceId, TableName};
pub use vocabulary::{Vocabulary, encode};
