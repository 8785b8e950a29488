//! Expression words.
//!
//! A [`Word`] maps each live notation to the text rendered so far. Words are
//! built bottom-up by the combinators below, each of which consults the
//! grammar of every notation once and never looks at operand history again.
//! A notation is live in the result only when it is live in every operand
//! and still registered, so a word never carries text for one notation that
//! was built from a different expression than the others.

use polysheet_core::{CellCoord, CellIndices, CellValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{FormulaError, Result};
use crate::grammar::{ConditionalPart, Endpoint, Grammar, GrammarRegistry, OffsetPart};
use crate::ops::{AggregateOp, BinaryOp, UnaryOp};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    words: BTreeMap<String, String>,
}

/// Operand of a concatenation: either rendered text or a literal still to be
/// quoted by the notation.
#[derive(Debug, Clone)]
pub enum Term {
    Word(Word),
    Literal(CellValue),
}

impl Word {
    pub fn get(&self, notation: &str) -> Option<&str> {
        self.words.get(notation).map(String::as_str)
    }

    pub fn is_live(&self, notation: &str) -> bool {
        self.words.contains_key(notation)
    }

    /// Live notations in sorted order
    pub fn notations(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.words
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.words
    }

    /// Render every registered notation, skipping those `render` declines
    fn collect<F>(grammars: &GrammarRegistry, mut render: F) -> Word
    where
        F: FnMut(&str, &Grammar) -> Option<String>,
    {
        let words = grammars
            .iter()
            .filter_map(|(name, grammar)| Some((name.to_string(), render(name, &**grammar)?)))
            .collect();
        Word { words }
    }

    fn try_collect<F>(grammars: &GrammarRegistry, mut render: F) -> Result<Word>
    where
        F: FnMut(&str, &Grammar) -> Result<Option<String>>,
    {
        let mut words = BTreeMap::new();
        for (name, grammar) in grammars.iter() {
            if let Some(text) = render(name, &**grammar)? {
                words.insert(name.to_string(), text);
            }
        }
        Ok(Word { words })
    }

    /// Literal value wrapped by the notation's constant rule
    pub fn constant(grammars: &GrammarRegistry, value: &CellValue) -> Word {
        let text = value.as_text();
        Word::collect(grammars, |_, g| Some(g.cells.constant.wrap(&text)))
    }

    /// Content of a cell with neither value nor expression
    pub fn empty(grammars: &GrammarRegistry) -> Word {
        Word::collect(grammars, |_, g| Some(g.cells.empty.content.clone()))
    }

    /// Coordinate reference, live only where `indices` has labels
    pub fn reference(
        grammars: &GrammarRegistry,
        indices: &CellIndices,
        coord: CellCoord,
    ) -> Result<Word> {
        Word::try_collect(grammars, |name, g| {
            Ok(labels(indices, name, coord)?.map(|(row, col)| g.cells.reference.render(row, col)))
        })
    }

    pub fn variable(grammars: &GrammarRegistry, name: &str, value: &CellValue) -> Word {
        Word::collect(grammars, |_, g| {
            let rule = &g.cells.variable;
            let mut text = format!("{}{}", rule.prefix, name);
            if rule.value.include {
                text.push_str(&rule.value.prefix);
                text.push_str(&value.as_text());
                text.push_str(&rule.value.suffix);
            }
            text.push_str(&rule.suffix);
            Some(text)
        })
    }

    pub fn binary(grammars: &GrammarRegistry, op: BinaryOp, left: &Word, right: &Word) -> Word {
        Word::collect(grammars, |name, g| {
            Some(op.rule(g).join(left.get(name)?, right.get(name)?))
        })
    }

    /// Concatenation, quoting literals with the notation's string or numeric context
    pub fn concatenate(grammars: &GrammarRegistry, left: &Term, right: &Term) -> Word {
        let text = |term: &Term, name: &str, g: &Grammar| -> Option<String> {
            match term {
                Term::Word(word) => word.get(name).map(str::to_string),
                Term::Literal(value) => {
                    let rule = &g.operations.concatenate;
                    let context = if value.is_numeric() {
                        &rule.numeric_value
                    } else {
                        &rule.string_value
                    };
                    Some(context.wrap(&value.as_text()))
                }
            }
        };
        Word::collect(grammars, |name, g| {
            let left = text(left, name, g)?;
            let right = text(right, name, g)?;
            Some(g.operations.concatenate.infix().join(&left, &right))
        })
    }

    pub fn unary(grammars: &GrammarRegistry, op: UnaryOp, operand: &Word) -> Word {
        Word::collect(grammars, |name, g| Some(op.rule(g).wrap(operand.get(name)?)))
    }

    /// Range reduction; only the two endpoints are rendered
    pub fn aggregation(
        grammars: &GrammarRegistry,
        indices: &CellIndices,
        op: AggregateOp,
        start: CellCoord,
        end: CellCoord,
    ) -> Result<Word> {
        Word::try_collect(grammars, |name, g| {
            if !indices.has_notation(name) {
                return Ok(None);
            }
            let rule = &g.cells.aggregation;
            let end = if rule.include_last_cell {
                end
            } else {
                end.next_diagonal().ok_or_else(|| FormulaError::MissingLabel {
                    notation: name.to_string(),
                    coord: end,
                })?
            };
            let (Some(first), Some(last)) = (labels(indices, name, start)?, labels(indices, name, end)?)
            else {
                return Ok(None);
            };

            let start_text = render_endpoint(&rule.start_cell, first, first, last);
            let end_text = render_endpoint(&rule.end_cell, last, first, last);
            let range = format!(
                "{}{}{}{}{}",
                rule.prefix, start_text, rule.separator, end_text, rule.suffix
            );
            Ok(Some(op.rule(g).wrap(&range)))
        })
    }

    /// If/then/else with clauses placed in the notation's order
    pub fn conditional(
        grammars: &GrammarRegistry,
        condition: &Word,
        consequent: &Word,
        alternative: &Word,
    ) -> Word {
        Word::collect(grammars, |name, g| {
            let rule = &g.conditional;
            let mut body = String::new();
            for part in &rule.order {
                let operand = match part {
                    ConditionalPart::Condition => condition,
                    ConditionalPart::Consequent => consequent,
                    ConditionalPart::Alternative => alternative,
                };
                body.push_str(&rule.part(*part).wrap(operand.get(name)?));
            }
            Some(format!("{}{}{}", rule.prefix, body, rule.suffix))
        })
    }

    /// Value at `x` on the line through `(x_start, y_start)` and `(x_end, y_end)`
    pub fn linear_interpolation(
        grammars: &GrammarRegistry,
        x_start: &Word,
        y_start: &Word,
        x_end: &Word,
        y_end: &Word,
        x: &Word,
    ) -> Word {
        Word::collect(grammars, |name, g| {
            let operands = [
                x_start.get(name)?,
                y_start.get(name)?,
                x_end.get(name)?,
                y_end.get(name)?,
                x.get(name)?,
            ];
            Some(g.linear_interpolation.render(operands))
        })
    }

    /// Position `reference` shifted by two rendered skip expressions
    pub fn offset(
        grammars: &GrammarRegistry,
        indices: &CellIndices,
        reference: CellCoord,
        skip_rows: &Word,
        skip_columns: &Word,
    ) -> Result<Word> {
        Word::try_collect(grammars, |name, g| {
            let Some((row, col)) = labels(indices, name, reference)? else {
                return Ok(None);
            };
            let (Some(rows), Some(columns)) = (skip_rows.get(name), skip_columns.get(name)) else {
                return Ok(None);
            };

            let rule = &g.cells.offset;
            let body: String = rule
                .order
                .iter()
                .map(|part| {
                    let text = match part {
                        OffsetPart::ReferenceRow => row,
                        OffsetPart::ReferenceColumn => col,
                        OffsetPart::SkipRows => rows,
                        OffsetPart::SkipColumns => columns,
                    };
                    rule.part(*part).wrap(text)
                })
                .collect();
            Ok(Some(format!("{}{}{}", rule.prefix, body, rule.suffix)))
        })
    }

    /// Caller-supplied text, taken verbatim for every registered notation it names
    pub fn raw(grammars: &GrammarRegistry, words: &BTreeMap<String, String>) -> Word {
        Word::collect(grammars, |name, _| words.get(name).cloned())
    }

    /// Final rendering of a derived expression: the operation marker is
    /// applied here, once, and never by the combinators.
    pub fn wrap_operation(&self, grammars: &GrammarRegistry) -> BTreeMap<String, String> {
        grammars
            .iter()
            .filter_map(|(name, g)| {
                let body = self.get(name)?;
                Some((name.to_string(), g.cells.operation.wrap(body)))
            })
            .collect()
    }
}

/// Row and column labels of `coord`, `None` when the notation has no labels
fn labels<'i>(
    indices: &'i CellIndices,
    notation: &str,
    coord: CellCoord,
) -> Result<Option<(&'i str, &'i str)>> {
    if !indices.has_notation(notation) {
        return Ok(None);
    }
    match (
        indices.row_label(notation, coord.row),
        indices.column_label(notation, coord.col),
    ) {
        (Some(row), Some(col)) => Ok(Some((row, col))),
        _ => Err(FormulaError::MissingLabel {
            notation: notation.to_string(),
            coord,
        }),
    }
}

fn render_endpoint(
    rule: &Endpoint,
    own: (&str, &str),
    first: (&str, &str),
    last: (&str, &str),
) -> String {
    let (a, b) = if rule.rows_only {
        (first.0, last.0)
    } else if rule.cols_only {
        (first.1, last.1)
    } else if rule.row_first {
        own
    } else {
        (own.1, own.0)
    };
    format!("{}{}{}{}{}", rule.prefix, a, rule.separator, b, rule.suffix)
}
