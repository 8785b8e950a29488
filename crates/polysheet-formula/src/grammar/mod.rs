//! Declarative grammar tables, one per notation.
//!
//! A grammar is pure data: every operator and cell form is described by the
//! text placed before, between and after its operands. The tables derive
//! serde so a notation can be shipped as JSON and validated against the
//! shape of a bundled table before it is accepted.

pub mod builtin;
pub mod registry;
pub mod validator;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{([a-z_]*)\}").expect("valid regex"));

/// Text placed around a single operand
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Affix {
    pub prefix: String,
    pub suffix: String,
}

impl Affix {
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Affix {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn wrap(&self, body: &str) -> String {
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

/// Text placed around and between two operands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Infix {
    pub prefix: String,
    pub separator: String,
    pub suffix: String,
}

impl Infix {
    pub fn new(prefix: &str, separator: &str, suffix: &str) -> Self {
        Infix {
            prefix: prefix.to_string(),
            separator: separator.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Operand order is always left then right
    pub fn join(&self, left: &str, right: &str) -> String {
        format!(
            "{}{}{}{}{}",
            self.prefix, left, self.separator, right, self.suffix
        )
    }
}

/// Descriptive metadata about an axis' labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisRule {
    pub name_regexp: String,
    pub maximal_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyRule {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableValue {
    pub include: bool,
    pub prefix: String,
    pub suffix: String,
}

/// A variable renders as its name, optionally followed by its current value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableRule {
    pub prefix: String,
    pub suffix: String,
    pub value: VariableValue,
}

/// Single-cell reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceRule {
    pub prefix: String,
    pub separator: String,
    pub suffix: String,
    pub row_first: bool,
}

impl ReferenceRule {
    pub fn render(&self, row: &str, col: &str) -> String {
        if self.row_first {
            format!("{}{}{}{}{}", self.prefix, row, self.separator, col, self.suffix)
        } else {
            format!("{}{}{}{}{}", self.prefix, col, self.separator, row, self.suffix)
        }
    }
}

/// One endpoint of a range.
///
/// `rows_only` renders the row span (`start_row sep end_row`) instead of a
/// coordinate, `cols_only` the column span. `rows_only` wins if both are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoint {
    pub prefix: String,
    pub separator: String,
    pub suffix: String,
    pub row_first: bool,
    pub rows_only: bool,
    pub cols_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationRule {
    pub prefix: String,
    pub separator: String,
    pub suffix: String,
    /// False for half-open notations whose range end names the position past the last cell
    pub include_last_cell: bool,
    pub start_cell: Endpoint,
    pub end_cell: Endpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetPart {
    ReferenceRow,
    ReferenceColumn,
    SkipRows,
    SkipColumns,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OffsetRule {
    pub prefix: String,
    pub suffix: String,
    pub order: Vec<OffsetPart>,
    pub reference_row: Affix,
    pub reference_column: Affix,
    pub skip_rows: Affix,
    pub skip_columns: Affix,
}

impl OffsetRule {
    pub fn part(&self, part: OffsetPart) -> &Affix {
        match part {
            OffsetPart::ReferenceRow => &self.reference_row,
            OffsetPart::ReferenceColumn => &self.reference_column,
            OffsetPart::SkipRows => &self.skip_rows,
            OffsetPart::SkipColumns => &self.skip_columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellRules {
    pub constant: Affix,
    pub operation: Affix,
    pub empty: EmptyRule,
    pub variable: VariableRule,
    pub reference: ReferenceRule,
    pub aggregation: AggregationRule,
    pub offset: OffsetRule,
}

/// Concatenation quotes unanchored constants according to their type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcatenateRule {
    pub prefix: String,
    pub separator: String,
    pub suffix: String,
    pub string_value: Affix,
    pub numeric_value: Affix,
}

impl ConcatenateRule {
    pub fn infix(&self) -> Infix {
        Infix::new(&self.prefix, &self.separator, &self.suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Operations {
    pub add: Infix,
    pub subtract: Infix,
    pub multiply: Infix,
    pub divide: Infix,
    pub modulo: Infix,
    pub power: Infix,
    pub equal_to: Infix,
    pub not_equal_to: Infix,
    pub greater_than: Infix,
    pub greater_than_or_equal_to: Infix,
    pub less_than: Infix,
    pub less_than_or_equal_to: Infix,
    pub conjunction: Infix,
    pub disjunction: Infix,
    pub concatenate: ConcatenateRule,
    pub negation: Affix,
    pub exponential: Affix,
    pub logarithm: Affix,
    pub ceil: Affix,
    pub floor: Affix,
    pub round: Affix,
    pub abs: Affix,
    pub sqrt: Affix,
    pub signum: Affix,
    pub sum: Affix,
    pub product: Affix,
    pub mean: Affix,
    pub min: Affix,
    pub max: Affix,
    pub stdev: Affix,
    pub median: Affix,
    pub count: Affix,
    pub irr: Affix,
    pub first_non_negative: Affix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalPart {
    Condition,
    Consequent,
    Alternative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionalRule {
    pub prefix: String,
    pub suffix: String,
    pub order: Vec<ConditionalPart>,
    pub condition: Affix,
    pub consequent: Affix,
    pub alternative: Affix,
}

impl ConditionalRule {
    pub fn part(&self, part: ConditionalPart) -> &Affix {
        match part {
            ConditionalPart::Condition => &self.condition,
            ConditionalPart::Consequent => &self.consequent,
            ConditionalPart::Alternative => &self.alternative,
        }
    }
}

/// Linear interpolation written as a template over its five operands.
///
/// `{x_s}`, `{y_s}`, `{x_e}` and `{y_e}` are the two known points, `{x}` the
/// position to interpolate at. `{{` and `}}` stand for literal braces. A
/// placeholder may appear any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearInterpolationRule {
    pub word: String,
}

impl LinearInterpolationRule {
    /// Placeholder names, in the order `render` takes its operands
    pub const PLACEHOLDERS: [&'static str; 5] = ["x_s", "y_s", "x_e", "y_e", "x"];

    pub fn new(word: &str) -> Self {
        LinearInterpolationRule {
            word: word.to_string(),
        }
    }

    fn slot(name: &str) -> Option<usize> {
        Self::PLACEHOLDERS.iter().position(|p| *p == name)
    }

    /// Fill the template in one pass, so operand text is never rescanned
    pub fn render(&self, operands: [&str; 5]) -> String {
        PLACEHOLDER
            .replace_all(&self.word, |caps: &Captures| match caps.get(1) {
                Some(name) => Self::slot(name.as_str())
                    .map_or("", |i| operands[i])
                    .to_string(),
                None => caps[0][..1].to_string(),
            })
            .into_owned()
    }

    /// Rejects unknown placeholders and unpaired braces
    pub fn check(&self) -> Result<(), String> {
        let stray = |text: &str| text.contains(&['{', '}'][..]);
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(&self.word) {
            let Some(whole) = caps.get(0) else { continue };
            if stray(&self.word[last..whole.start()]) {
                return Err("unpaired brace".to_string());
            }
            if let Some(name) = caps.get(1) {
                if Self::slot(name.as_str()).is_none() {
                    return Err(format!("unknown placeholder '{}'", whole.as_str()));
                }
            }
            last = whole.end();
        }
        if stray(&self.word[last..]) {
            return Err("unpaired brace".to_string());
        }
        Ok(())
    }
}

/// Complete formatting rules of one notation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grammar {
    pub rows: AxisRule,
    pub cols: AxisRule,
    pub cells: CellRules,
    pub operations: Operations,
    pub brackets: Affix,
    pub conditional: ConditionalRule,
    pub linear_interpolation: LinearInterpolationRule,
}

pub use builtin::{array_index, excel, native};
pub use registry::GrammarRegistry;
pub use validator::validate;
