/// Dataset column name.
/// Examples: `cc_init`, `product_init_firefox`, `severity_final`
pub type ColumnName = String;
/// Canonical category string held by a vocabulary.
/// Examples: `other`, `core`, `2.0 branch`
pub type CategoryValue = String;
/// Label value for the selected prediction target.
/// Examples: `critical`, `P1`
pub type LabelValue = String;
/// Identifier for the source that produced a dataset.
/// Examples: `sqlite:bugs.db`, `fixtures`
pub type SourceId = String;
/// Table name used by provisioning.
/// Examples: `reports`, `assigned_to`, `cc`
pub type TableName = String;
