use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::columns::{
    ASSIGNED_TO_INIT, CC_INIT, COMPONENT_INIT, DESC_INIT, OP_SYS_INIT, PRIORITY_FINAL,
    PRODUCT_INIT, REPORTER_BUG_CNT, SEVERITY_FINAL, SHORT_DESC_INIT, VERSION_INIT,
};
use crate::errors::PipelineError;

pub use crate::types::ColumnName;

/// A single typed cell.
///
/// Storage types are preserved so derivations can reject values of the
/// wrong type instead of coercing them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

/// Cells of one column, one per row.
pub type Column = Vec<Value>;

/// One bug report row as stored in the `final` relation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BugRecord {
    /// Assignee at report time; empty when unassigned.
    pub assigned_to_init: String,
    /// Initially CC'd addresses, loosely delimited.
    pub cc_init: String,
    pub product_init: String,
    pub version_init: String,
    pub component_init: String,
    pub op_sys_init: String,
    /// Bugs previously filed by the same reporter.
    pub reporter_bug_cnt: i64,
    pub desc_init: String,
    pub short_desc_init: String,
    pub priority_final: String,
    pub severity_final: String,
}

impl BugRecord {
    fn into_cells(self) -> [(&'static str, Value); 11] {
        [
            (ASSIGNED_TO_INIT, self.assigned_to_init.into()),
            (CC_INIT, self.cc_init.into()),
            (PRODUCT_INIT, self.product_init.into()),
            (VERSION_INIT, self.version_init.into()),
            (COMPONENT_INIT, self.component_init.into()),
            (OP_SYS_INIT, self.op_sys_init.into()),
            (REPORTER_BUG_CNT, self.reporter_bug_cnt.into()),
            (DESC_INIT, self.desc_init.into()),
            (SHORT_DESC_INIT, self.short_desc_init.into()),
            (PRIORITY_FINAL, self.priority_final.into()),
            (SEVERITY_FINAL, self.severity_final.into()),
        ]
    }
}

/// Column-oriented table with named, ordered columns of equal length.
///
/// Pipeline stages take a `Dataset` by value and return the derived one, so
/// each stage can be run and tested on its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: IndexMap<ColumnName, Column>,
    n_rows: usize,
}

impl Dataset {
    /// Create an empty dataset with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from `(name, column)` pairs, keeping their order.
    pub fn from_columns<I, N>(columns: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = (N, Column)>,
        N: Into<ColumnName>,
    {
        columns
            .into_iter()
            .try_fold(Self::new(), |dataset, (name, column)| {
                dataset.with_column(name, column)
            })
    }

    /// Build a dataset with the record columns, one row per record.
    pub fn from_records(records: impl IntoIterator<Item = BugRecord>) -> Self {
        let mut columns: IndexMap<ColumnName, Column> = IndexMap::new();
        let mut n_rows = 0;
        for record in records {
            for (name, value) in record.into_cells() {
                columns.entry(name.to_string()).or_default().push(value);
            }
            n_rows += 1;
        }
        if columns.is_empty() {
            for (name, _) in BugRecord::default().into_cells() {
                columns.insert(name.to_string(), Vec::new());
            }
        }
        Self { columns, n_rows }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Column names in dataset order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Return the column or a `MissingColumn` error.
    pub fn require_column(&self, name: &str) -> Result<&Column, PipelineError> {
        self.columns
            .get(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Cell at `row` of column `name`.
    pub fn value(&self, name: &str, row: usize) -> Option<&Value> {
        self.columns.get(name)?.get(row)
    }

    /// Borrow every cell of a text column, failing on the first non-text cell.
    pub fn text_values(&self, name: &str) -> Result<Vec<&str>, PipelineError> {
        self.require_column(name)?
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value.as_text().ok_or_else(|| PipelineError::TypeMismatch {
                    column: name.to_string(),
                    row,
                    expected: "text",
                    found: value.kind(),
                })
            })
            .collect()
    }

    /// Append a column at the end. The first column of an empty dataset fixes the row count.
    pub fn with_column(
        mut self,
        name: impl Into<ColumnName>,
        column: Column,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(PipelineError::DuplicateColumn { column: name });
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(PipelineError::LengthMismatch {
                column: name,
                expected: self.n_rows,
                got: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(self)
    }

    /// Remove a column, returning the remaining dataset and the column data.
    pub fn take_column(mut self, name: &str) -> Result<(Self, Column), PipelineError> {
        let column = self
            .columns
            .shift_remove(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
            })?;
        Ok((self, column))
    }

    /// Remove a column and discard its data.
    pub fn drop_column(self, name: &str) -> Result<Self, PipelineError> {
        self.take_column(name).map(|(dataset, _)| dataset)
    }

    /// Keep only the rows whose mask entry is `true`, preserving order.
    pub fn retain_rows(mut self, mask: &[bool]) -> Result<Self, PipelineError> {
        if mask.len() != self.n_rows {
            return Err(PipelineError::LengthMismatch {
                column: "<row mask>".to_string(),
                expected: self.n_rows,
                got: mask.len(),
            });
        }
        for column in self.columns.values_mut() {
            let mut keep = mask.iter();
            column.retain(|_| keep.next().copied().unwrap_or(false));
        }
        self.n_rows = mask.iter().filter(|keep| **keep).count();
        Ok(self)
    }

    /// Copy the rows at `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self, PipelineError> {
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= self.n_rows) {
            return Err(PipelineError::LengthMismatch {
                column: format!("<row {bad}>"),
                expected: self.n_rows,
                got: bad + 1,
            });
        }
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| {
                let picked = indices.iter().map(|&idx| column[idx].clone()).collect();
                (name.clone(), picked)
            })
            .collect();
        Ok(Self {
            columns,
            n_rows: indices.len(),
        })
    }

    /// Iterate columns as `(name, cells)` in dataset order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns
            .iter()
            .map(|(name, column)| (name.as_str(), column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_column(values: &[&str]) -> Column {
        values.iter().map(|value| Value::from(*value)).collect()
    }

    #[test]
    fn from_records_keeps_record_column_order() {
        let dataset = Dataset::from_records(vec![BugRecord::default(), BugRecord::default()]);
        let names: Vec<&str> = dataset.column_names().collect();
        assert_eq!(names, crate::constants::columns::RECORD_COLUMNS);
        assert_eq!(dataset.n_rows(), 2);
    }

    #[test]
    fn empty_record_set_still_has_schema() {
        let dataset = Dataset::from_records(Vec::new());
        assert!(dataset.is_empty());
        assert_eq!(dataset.n_columns(), 11);
    }

    #[test]
    fn with_column_rejects_length_mismatch() {
        let dataset = Dataset::from_columns([("a", text_column(&["x", "y"]))]).unwrap();
        let err = dataset
            .with_column("b", text_column(&["only one"]))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::LengthMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn with_column_rejects_duplicates() {
        let dataset = Dataset::from_columns([("a", text_column(&["x"]))]).unwrap();
        let err = dataset.with_column("a", text_column(&["y"])).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateColumn { ref column } if column == "a"));
    }

    #[test]
    fn take_column_preserves_remaining_order() {
        let dataset = Dataset::from_columns([
            ("a", text_column(&["1"])),
            ("b", text_column(&["2"])),
            ("c", text_column(&["3"])),
        ])
        .unwrap();
        let (rest, taken) = dataset.take_column("b").unwrap();
        assert_eq!(taken, text_column(&["2"]));
        assert_eq!(rest.column_names().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn take_missing_column_fails() {
        let err = Dataset::new().take_column("nope").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { ref column } if column == "nope"));
    }

    #[test]
    fn retain_rows_filters_every_column() {
        let dataset = Dataset::from_columns([
            ("a", text_column(&["1", "2", "3"])),
            ("b", vec![Value::from(10), Value::from(20), Value::from(30)]),
        ])
        .unwrap();
        let kept = dataset.retain_rows(&[true, false, true]).unwrap();
        assert_eq!(kept.n_rows(), 2);
        assert_eq!(kept.column("a").unwrap(), &text_column(&["1", "3"]));
        assert_eq!(
            kept.column("b").unwrap(),
            &vec![Value::from(10), Value::from(30)]
        );
    }

    #[test]
    fn select_rows_rejects_out_of_range() {
        let dataset = Dataset::from_columns([("a", text_column(&["1"]))]).unwrap();
        assert!(dataset.select_rows(&[1]).is_err());
        let picked = dataset.select_rows(&[0, 0]).unwrap();
        assert_eq!(picked.n_rows(), 2);
    }

    #[test]
    fn text_values_reports_type_mismatch() {
        let dataset = Dataset::from_columns([(
            "cc_init",
            vec![Value::from("a@b"), Value::Integer(3)],
        )])
        .unwrap();
        let err = dataset.text_values("cc_init").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::TypeMismatch {
                row: 1,
                expected: "text",
                found: "integer",
                ..
            }
        ));
    }
}
