//! Per-notation row and column labels.
//!
//! A grid names its positions differently in every notation: a spreadsheet
//! dialect counts rows from `1` and columns from `A`, an array dialect counts
//! both from `0`. Renderers never compute these names themselves, they look
//! them up here by integer position.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::coord::col_to_label;

/// Notation names with built-in label generators
pub const EXCEL: &str = "excel";
pub const ARRAY_INDEX: &str = "array_index";
pub const NATIVE: &str = "native";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("notation '{notation}' provides {given} {axis} labels, grid needs {needed}")]
    TooShort {
        notation: String,
        axis: &'static str,
        given: usize,
        needed: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct AxisLabels {
    rows: Vec<String>,
    columns: Vec<String>,
}

/// Ordered label lists for every notation a grid can render in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellIndices {
    rows: u32,
    columns: u32,
    labels: BTreeMap<String, AxisLabels>,
}

impl CellIndices {
    /// Labels for the built-in notations of a `rows` x `columns` grid.
    ///
    /// Each axis gets one label past the last position so that half-open
    /// range ends can be named.
    ///
    /// ```
    /// use polysheet_core::CellIndices;
    ///
    /// let indices = CellIndices::generated(2, 3);
    /// assert_eq!(indices.column_label("excel", 2), Some("C"));
    /// assert_eq!(indices.row_label("array_index", 2), Some("2"));
    /// ```
    pub fn generated(rows: u32, columns: u32) -> Self {
        let numbered = |from: u32, count: u32| -> Vec<String> {
            (from..from + count + 1).map(|n| n.to_string()).collect()
        };

        let mut labels = BTreeMap::new();
        labels.insert(
            EXCEL.to_string(),
            AxisLabels {
                rows: numbered(1, rows),
                columns: (0..=columns).map(col_to_label).collect(),
            },
        );
        labels.insert(
            ARRAY_INDEX.to_string(),
            AxisLabels {
                rows: numbered(0, rows),
                columns: numbered(0, columns),
            },
        );
        labels.insert(
            NATIVE.to_string(),
            AxisLabels {
                rows: numbered(1, rows),
                columns: numbered(1, columns),
            },
        );

        CellIndices {
            rows,
            columns,
            labels,
        }
    }

    /// Add (or replace) the labels of a custom notation
    pub fn with_notation(
        mut self,
        name: &str,
        rows: Vec<String>,
        columns: Vec<String>,
    ) -> Result<Self, LabelError> {
        check_length(name, "row", rows.len(), self.rows)?;
        check_length(name, "column", columns.len(), self.columns)?;
        self.labels
            .insert(name.to_string(), AxisLabels { rows, columns });
        Ok(self)
    }

    pub fn shape(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    pub fn has_notation(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn notations(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    pub fn row_label(&self, notation: &str, row: u32) -> Option<&str> {
        self.labels
            .get(notation)?
            .rows
            .get(row as usize)
            .map(String::as_str)
    }

    pub fn column_label(&self, notation: &str, column: u32) -> Option<&str> {
        self.labels
            .get(notation)?
            .columns
            .get(column as usize)
            .map(String::as_str)
    }
}

fn check_length(
    notation: &str,
    axis: &'static str,
    given: usize,
    needed: u32,
) -> Result<(), LabelError> {
    if given < needed as usize {
        return Err(LabelError::TooShort {
            notation: notation.to_string(),
            axis,
            given,
            needed: needed as usize,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generated_labels() {
        let indices = CellIndices::generated(3, 28);

        assert_eq!(indices.row_label(EXCEL, 0), Some("1"));
        assert_eq!(indices.column_label(EXCEL, 27), Some("AB"));
        assert_eq!(indices.row_label(ARRAY_INDEX, 0), Some("0"));
        assert_eq!(indices.row_label(NATIVE, 2), Some("3"));
        // one past the end is still named
        assert_eq!(indices.row_label(EXCEL, 3), Some("4"));
        assert_eq!(indices.row_label(EXCEL, 4), None);
    }

    #[test]
    fn test_notations_sorted() {
        let indices = CellIndices::generated(1, 1);
        let names: Vec<_> = indices.notations().collect();
        assert_eq!(names, vec![ARRAY_INDEX, EXCEL, NATIVE]);
    }

    #[test]
    fn test_custom_notation() {
        let indices = CellIndices::generated(2, 1)
            .with_notation(
                "roman",
                vec!["I".into(), "II".into()],
                vec!["first".into()],
            )
            .unwrap();

        assert!(indices.has_notation("roman"));
        assert_eq!(indices.row_label("roman", 1), Some("II"));
        assert_eq!(indices.column_label("roman", 0), Some("first"));
        assert_eq!(indices.column_label("unknown", 0), None);
    }

    #[test]
    fn test_custom_notation_too_short() {
        let err = CellIndices::generated(3, 1)
            .with_notation("roman", vec!["I".into()], vec!["a".into()])
            .unwrap_err();

        assert_eq!(
            err,
            LabelError::TooShort {
                notation: "roman".into(),
                axis: "row",
                given: 1,
                needed: 3,
            }
        );
    }
}
