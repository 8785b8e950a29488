//! Named variables.
//!
//! A variable is an unanchored cell that renders as its name wherever it is
//! used, so generated formulas read `price*rate` rather than `120*0.2`.

use once_cell::sync::Lazy;
use polysheet_core::{CellIndices, CellValue};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cell::Cell;
use crate::error::{FormulaError, Result};

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid regex"));

/// Value and description of one variable, as exported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSummary {
    pub value: CellValue,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Variables {
    indices: Arc<CellIndices>,
    cells: BTreeMap<String, Cell>,
}

impl Variables {
    pub fn new(indices: Arc<CellIndices>) -> Self {
        Self {
            indices,
            cells: BTreeMap::new(),
        }
    }

    /// Define or overwrite `name`.
    ///
    /// Names are lowercase ASCII letters, digits and underscores.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<CellValue>,
        description: Option<String>,
    ) -> Result<&Cell> {
        if !NAME_PATTERN.is_match(name) {
            return Err(FormulaError::Validation(format!(
                "variable name '{}' must be lowercase alphanumeric with underscores",
                name
            )));
        }
        let source = Cell::constant(value, Arc::clone(&self.indices)).into_variable(name);
        let mut cell = source.variable()?.into_variable(name);
        cell.set_description(description);
        self.cells.insert(name.to_string(), cell);
        self.get(name)
    }

    pub fn get(&self, name: &str) -> Result<&Cell> {
        self.cells
            .get(name)
            .ok_or_else(|| FormulaError::UnknownVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn summary(&self) -> BTreeMap<String, VariableSummary> {
        self.cells
            .iter()
            .map(|(name, cell)| {
                let summary = VariableSummary {
                    value: cell.value().clone(),
                    description: cell.description().map(str::to_string),
                };
                (name.clone(), summary)
            })
            .collect()
    }
}
