//! Cells and the operators that combine them.
//!
//! An operator never mutates its operands. It computes the new value with
//! host arithmetic, renders the new [`Word`] from the operands' words and
//! grafts copies of their dependency trees under a fresh, unanchored root.
//!
//! How a cell appears inside a larger expression depends on its state at the
//! moment it is used:
//!
//! | state                  | rendered as                |
//! |------------------------|----------------------------|
//! | anchored               | coordinate reference       |
//! | unanchored constant    | literal value              |
//! | unanchored derived     | its own expression, inline |

use polysheet_core::{CellCoord, CellFormat, CellIndices, CellValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops;
use std::sync::Arc;

use crate::dependency::{Deletion, DependencyTree};
use crate::error::{FormulaError, Result};
use crate::functions::math;
use crate::grammar::{registry, GrammarRegistry};
use crate::ops::{AggregateOp, BinaryOp, UnaryOp};
use crate::word::{Term, Word};

/// Origin of a cell's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// A plain value (possibly empty)
    Constant,
    /// The result of an operator
    Derived,
}

#[derive(Debug, Clone)]
pub struct Cell {
    value: CellValue,
    kind: CellKind,
    word: Option<Word>,
    /// Root coordinates double as the anchor
    tree: DependencyTree,
    indices: Arc<CellIndices>,
    variable_name: Option<String>,
    format: CellFormat,
    description: Option<String>,
}

macro_rules! binary_operators {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(&self, other: &Cell) -> Result<Cell> {
                self.binary(BinaryOp::$op, other)
            }
        )*
    };
}

macro_rules! unary_operators {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $name(&self) -> Result<Cell> {
                self.unary(UnaryOp::$op)
            }
        )*
    };
}

macro_rules! aggregate_operators {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<'a>(
                start: &Cell,
                end: &Cell,
                members: impl IntoIterator<Item = &'a Cell>,
            ) -> Result<Cell> {
                Cell::aggregate(AggregateOp::$op, start, end, members)
            }
        )*
    };
}

impl Cell {
    /// Cell at `(row, column)`, or unanchored when both are `None`.
    ///
    /// Giving only one of the two coordinates is a construction error.
    pub fn new(
        row: Option<u32>,
        column: Option<u32>,
        value: CellValue,
        indices: Arc<CellIndices>,
    ) -> Result<Self> {
        let coords = match (row, column) {
            (Some(row), Some(column)) => Some(CellCoord::new(row, column)),
            (None, None) => None,
            _ => {
                return Err(FormulaError::Construction(
                    "row and column must be given together".to_string(),
                ))
            }
        };
        Ok(Self::placed(coords, value, indices))
    }

    /// Grid cell at `coords`
    pub fn anchored(coords: CellCoord, value: impl Into<CellValue>, indices: Arc<CellIndices>) -> Self {
        Self::placed(Some(coords), value.into(), indices)
    }

    /// Unanchored literal, rendered inline wherever it is used
    pub fn constant(value: impl Into<CellValue>, indices: Arc<CellIndices>) -> Self {
        Self::placed(None, value.into(), indices)
    }

    fn placed(coords: Option<CellCoord>, value: CellValue, indices: Arc<CellIndices>) -> Self {
        Cell {
            value,
            kind: CellKind::Constant,
            word: None,
            tree: DependencyTree::new(coords),
            indices,
            variable_name: None,
            format: CellFormat::default(),
            description: None,
        }
    }

    pub(crate) fn into_variable(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(name.into());
        self
    }

    /// New unanchored derived cell built from `operands`
    fn derived(&self, value: CellValue, word: Word, operands: &[&Cell]) -> Cell {
        let trees: Vec<&DependencyTree> = operands.iter().map(|cell| &cell.tree).collect();
        Cell {
            value,
            kind: CellKind::Derived,
            word: Some(word),
            tree: DependencyTree::construct(None, &trees),
            indices: Arc::clone(&self.indices),
            variable_name: None,
            format: CellFormat::default(),
            description: None,
        }
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn coordinates(&self) -> Option<CellCoord> {
        self.tree.coordinates()
    }

    pub fn is_anchored(&self) -> bool {
        self.coordinates().is_some()
    }

    pub fn indices(&self) -> &Arc<CellIndices> {
        &self.indices
    }

    pub fn is_variable(&self) -> bool {
        self.variable_name.is_some()
    }

    pub fn variable_name(&self) -> Option<&str> {
        self.variable_name.as_deref()
    }

    /// Expression built by the operator that produced this cell
    pub fn words(&self) -> Option<&Word> {
        self.word.as_ref()
    }

    pub fn dependencies(&self) -> &DependencyTree {
        &self.tree
    }

    pub fn format(&self) -> &CellFormat {
        &self.format
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Grammars this cell can render in: registered and labelled
    fn grammars(&self) -> GrammarRegistry {
        registry::snapshot_for(&self.indices)
    }

    /// Word standing for this cell inside another expression
    fn word_for_reference(&self, grammars: &GrammarRegistry) -> Result<Word> {
        match (self.coordinates(), self.kind) {
            (Some(coords), _) => Word::reference(grammars, &self.indices, coords),
            (None, CellKind::Constant) if self.value.is_empty() => Ok(Word::empty(grammars)),
            (None, CellKind::Constant) => Ok(Word::constant(grammars, &self.value)),
            (None, CellKind::Derived) => Ok(self.word.clone().unwrap_or_default()),
        }
    }

    fn term(&self, grammars: &GrammarRegistry) -> Result<Term> {
        if self.kind == CellKind::Constant && !self.is_anchored() {
            return Ok(Term::Literal(self.value.clone()));
        }
        Ok(Term::Word(self.word_for_reference(grammars)?))
    }

    /// Apply any binary operator; the named methods below forward here
    pub fn binary(&self, op: BinaryOp, other: &Cell) -> Result<Cell> {
        let grammars = self.grammars();
        let word = match op {
            BinaryOp::Concatenate => {
                Word::concatenate(&grammars, &self.term(&grammars)?, &other.term(&grammars)?)
            }
            _ => Word::binary(
                &grammars,
                op,
                &self.word_for_reference(&grammars)?,
                &other.word_for_reference(&grammars)?,
            ),
        };
        let value = op.evaluate(&self.value, &other.value);
        Ok(self.derived(value, word, &[self, other]))
    }

    binary_operators! {
        add => Add,
        subtract => Subtract,
        multiply => Multiply,
        divide => Divide,
        /// Floored remainder, rendered per notation as an infix or a call
        modulo => Modulo,
        power => Power,
        equal_to => EqualTo,
        not_equal_to => NotEqualTo,
        greater_than => GreaterThan,
        greater_than_or_equal_to => GreaterThanOrEqualTo,
        less_than => LessThan,
        less_than_or_equal_to => LessThanOrEqualTo,
        conjunction => Conjunction,
        disjunction => Disjunction,
        /// Unanchored constants are quoted as string or number literals
        concatenate => Concatenate,
    }

    pub fn unary(&self, op: UnaryOp) -> Result<Cell> {
        let grammars = self.grammars();
        let word = Word::unary(&grammars, op, &self.word_for_reference(&grammars)?);
        Ok(self.derived(op.evaluate(&self.value), word, &[self]))
    }

    unary_operators! {
        negation => Negation,
        exponential => Exponential,
        logarithm => Logarithm,
        ceil => Ceil,
        floor => Floor,
        round => Round,
        abs => Abs,
        sqrt => Sqrt,
        signum => Signum,
        brackets => Brackets,
    }

    /// Coordinate reference to this cell, which must be anchored
    pub fn reference(&self) -> Result<Cell> {
        let coords = self
            .coordinates()
            .ok_or(FormulaError::NotAnchored("referenced cell"))?;
        let grammars = self.grammars();
        let word = Word::reference(&grammars, &self.indices, coords)?;
        Ok(self.derived(self.value.clone(), word, &[self]))
    }

    /// Named rendering of a variable cell
    pub fn variable(&self) -> Result<Cell> {
        let name = self
            .variable_name
            .as_deref()
            .ok_or_else(|| FormulaError::Validation("cell is not a variable".to_string()))?;
        let word = Word::variable(&self.grammars(), name, &self.value);
        Ok(self.derived(self.value.clone(), word, &[self]))
    }

    /// Reduce `members` while rendering only the `start`..`end` range.
    ///
    /// Both endpoints must be anchored. Members are taken as given, so
    /// callers wanting to skip empty cells filter with [`Cell::non_empty`].
    pub fn aggregate<'a>(
        op: AggregateOp,
        start: &Cell,
        end: &Cell,
        members: impl IntoIterator<Item = &'a Cell>,
    ) -> Result<Cell> {
        let first = start
            .coordinates()
            .ok_or(FormulaError::NotAnchored("range start"))?;
        let last = end
            .coordinates()
            .ok_or(FormulaError::NotAnchored("range end"))?;

        let members: Vec<&Cell> = members.into_iter().collect();
        let values: Vec<CellValue> = members.iter().map(|cell| cell.value.clone()).collect();

        let grammars = start.grammars();
        let word = Word::aggregation(&grammars, &start.indices, op, first, last)?;

        let mut operands = vec![start, end];
        operands.extend(members);
        Ok(start.derived(op.evaluate(&values), word, &operands))
    }

    aggregate_operators! {
        sum => Sum,
        product => Product,
        mean => Mean,
        min => Min,
        max => Max,
        /// Population standard deviation
        stdev => Stdev,
        median => Median,
        count => Count,
        /// Internal rate of return of the members as periodic cash flows
        irr => Irr,
        /// Index of the first non-negative member
        first_non_negative => FirstNonNegative,
    }

    /// If/then/else. The branch value is chosen now, but all three
    /// clauses are rendered.
    pub fn conditional(condition: &Cell, consequent: &Cell, alternative: &Cell) -> Result<Cell> {
        let grammars = condition.grammars();
        let word = Word::conditional(
            &grammars,
            &condition.word_for_reference(&grammars)?,
            &consequent.word_for_reference(&grammars)?,
            &alternative.word_for_reference(&grammars)?,
        );
        let value = match &condition.value {
            CellValue::Error(e) => CellValue::Error(*e),
            v if v.is_truthy() => consequent.value.clone(),
            _ => alternative.value.clone(),
        };
        Ok(condition.derived(value, word, &[condition, consequent, alternative]))
    }

    /// Interpolate at `x` between two known points, extrapolating outside them
    pub fn linear_interpolation(
        x_start: &Cell,
        y_start: &Cell,
        x_end: &Cell,
        y_end: &Cell,
        x: &Cell,
    ) -> Result<Cell> {
        let grammars = x.grammars();
        let word = Word::linear_interpolation(
            &grammars,
            &x_start.word_for_reference(&grammars)?,
            &y_start.word_for_reference(&grammars)?,
            &x_end.word_for_reference(&grammars)?,
            &y_end.word_for_reference(&grammars)?,
            &x.word_for_reference(&grammars)?,
        );
        let value = math::linear_interpolation(
            &x_start.value,
            &y_start.value,
            &x_end.value,
            &y_end.value,
            &x.value,
        );
        Ok(x.derived(value, word, &[x_start, y_start, x_end, y_end, x]))
    }

    /// Value of `target`, rendered as `reference` moved by the two skips.
    ///
    /// `reference` and `target` must both be anchored.
    pub fn offset(
        reference: &Cell,
        skip_rows: &Cell,
        skip_columns: &Cell,
        target: &Cell,
    ) -> Result<Cell> {
        let origin = reference
            .coordinates()
            .ok_or(FormulaError::NotAnchored("offset reference"))?;
        if !target.is_anchored() {
            return Err(FormulaError::NotAnchored("offset target"));
        }
        let grammars = reference.grammars();
        let word = Word::offset(
            &grammars,
            &reference.indices,
            origin,
            &skip_rows.word_for_reference(&grammars)?,
            &skip_columns.word_for_reference(&grammars)?,
        )?;
        Ok(reference.derived(
            target.value.clone(),
            word,
            &[reference, skip_rows, skip_columns, target],
        ))
    }

    /// Keep this cell's value but render caller-supplied text instead.
    ///
    /// Notations missing from `words` are not live in the result.
    pub fn raw(&self, words: &BTreeMap<String, String>) -> Cell {
        let word = Word::raw(&self.grammars(), words);
        self.derived(self.value.clone(), word, &[self])
    }

    /// Complete rendering per notation.
    ///
    /// Derived cells get the notation's `operation` marker around their
    /// expression; constants render their value, or the empty content.
    pub fn parse(&self) -> BTreeMap<String, String> {
        let grammars = self.grammars();
        match self.kind {
            CellKind::Derived => self
                .word
                .as_ref()
                .map(|word| word.wrap_operation(&grammars))
                .unwrap_or_default(),
            CellKind::Constant if self.value.is_empty() => Word::empty(&grammars).into_map(),
            CellKind::Constant => Word::constant(&grammars, &self.value).into_map(),
        }
    }

    /// Move the cell; `None` detaches it from the grid
    pub fn set_coordinates(&mut self, coords: Option<CellCoord>) {
        self.tree.set_coordinates(coords);
    }

    /// Forward a deletion to the dependency tree, returning the coordinates
    /// whose cells must be rebuilt
    pub fn delete(&mut self, deletion: Deletion) -> Vec<CellCoord> {
        self.tree.delete(deletion)
    }

    pub fn delete_row(&mut self, row: u32) -> Vec<CellCoord> {
        self.delete(Deletion::Row(row))
    }

    pub fn delete_column(&mut self, column: u32) -> Vec<CellCoord> {
        self.delete(Deletion::Column(column))
    }

    pub fn set_format(&mut self, format: CellFormat) {
        self.format = format;
    }

    /// Replace the format from a JSON object; anything else is rejected and
    /// the current format kept.
    pub fn set_style_json(&mut self, style: serde_json::Value) -> Result<()> {
        let format = CellFormat::from_json(style)
            .ok_or_else(|| FormulaError::Validation("style must be a JSON object".to_string()))?;
        self.format = format;
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Members that hold a value
    pub fn non_empty<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Vec<&'a Cell> {
        cells.into_iter().filter(|cell| !cell.value.is_empty()).collect()
    }
}

macro_rules! operator_traits {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl ops::$trait<&Cell> for &Cell {
                type Output = Result<Cell>;

                fn $method(self, other: &Cell) -> Result<Cell> {
                    self.binary(BinaryOp::$op, other)
                }
            }
        )*
    };
}

operator_traits! {
    Add::add => Add,
    Sub::sub => Subtract,
    Mul::mul => Multiply,
    Div::div => Divide,
    Rem::rem => Modulo,
    BitAnd::bitand => Conjunction,
    BitOr::bitor => Disjunction,
}

impl ops::Not for &Cell {
    type Output = Result<Cell>;

    fn not(self) -> Result<Cell> {
        self.unary(UnaryOp::Negation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polysheet_core::CellError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn grid() -> Arc<CellIndices> {
        Arc::new(CellIndices::generated(10, 10))
    }

    fn at(indices: &Arc<CellIndices>, row: u32, col: u32, value: f64) -> Cell {
        Cell::anchored(CellCoord::new(row, col), value, Arc::clone(indices))
    }

    fn rendered(cell: &Cell, notation: &str) -> String {
        cell.parse().get(notation).cloned().unwrap_or_default()
    }

    #[test]
    fn test_half_anchored_is_rejected() {
        let err = Cell::new(Some(1), None, CellValue::Empty, grid()).unwrap_err();
        assert!(matches!(err, FormulaError::Construction(_)));
        assert!(Cell::new(None, None, CellValue::Empty, grid()).is_ok());
        assert!(Cell::new(Some(1), Some(2), CellValue::Empty, grid())
            .unwrap()
            .is_anchored());
    }

    #[test]
    fn test_add_anchored_cells() {
        let g = grid();
        let a = at(&g, 0, 0, 3.0);
        let b = at(&g, 1, 2, 4.0);
        let sum = (&a + &b).unwrap();

        assert_eq!(sum.value(), &CellValue::Number(7.0));
        assert_eq!(sum.kind(), CellKind::Derived);
        assert!(!sum.is_anchored());
        assert_eq!(rendered(&sum, "excel"), "=A1+C2");
        assert_eq!(rendered(&sum, "array_index"), "values[0,0]+values[1,2]");
        assert_eq!(
            rendered(&sum, "native"),
            "value at (1, 1) + value at (2, 3)"
        );
    }

    #[test]
    fn test_anchored_derived_cell_is_referenced() {
        let g = grid();
        let a = at(&g, 1, 0, 1.0);
        let b = at(&g, 2, 0, 2.0);
        let mut c = (&a + &b).unwrap();
        c.set_coordinates(Some(CellCoord::new(0, 0)));

        let d = (&c * &Cell::constant(2.0, Arc::clone(&g))).unwrap();
        assert_eq!(rendered(&d, "excel"), "=A1*2");
        assert_eq!(d.value(), &CellValue::Number(6.0));

        // unanchored derived operands are inlined
        let e = (&(&a + &b).unwrap() * &a).unwrap();
        assert_eq!(rendered(&e, "excel"), "=A2+A3*A2");
    }

    #[test]
    fn test_operation_marker_applied_once() {
        let g = grid();
        let a = at(&g, 0, 0, 1.0);
        let nested = a.add(&a).unwrap().brackets().unwrap().multiply(&a).unwrap();
        assert_eq!(rendered(&nested, "excel"), "=(A1+A1)*A1");
        assert!(!rendered(&nested, "excel")[1..].contains('='));
    }

    #[test]
    fn test_brackets_keep_value() {
        let g = grid();
        let x = at(&g, 2, 2, 1.0).subtract(&at(&g, 3, 3, 5.0)).unwrap();
        let wrapped = x.brackets().unwrap();
        assert_eq!(wrapped.value(), x.value());
        for notation in ["excel", "array_index", "native"] {
            let inner = x.words().and_then(|w| w.get(notation)).unwrap_or_default();
            let outer = wrapped.words().and_then(|w| w.get(notation)).unwrap_or_default();
            assert_eq!(outer, format!("({})", inner));
        }
    }

    #[test]
    fn test_constants_render_per_notation() {
        let g = grid();
        let seven = Cell::constant(7.0, Arc::clone(&g));
        assert_eq!(rendered(&seven, "excel"), "7");

        let empty = Cell::anchored(CellCoord::new(0, 0), CellValue::Empty, Arc::clone(&g));
        assert_eq!(rendered(&empty, "excel"), "");

        let half = Cell::constant(0.5, Arc::clone(&g));
        let sum = (&seven + &half).unwrap();
        assert_eq!(rendered(&sum, "array_index"), "7+0.5");
    }

    #[test]
    fn test_reference() {
        let g = grid();
        let anchored = at(&g, 4, 1, 9.0);
        let first = anchored.reference().unwrap();
        let second = anchored.reference().unwrap();
        assert_eq!(first.parse(), second.parse());
        assert_eq!(rendered(&first, "excel"), "=B5");
        assert_eq!(first.value(), &CellValue::Number(9.0));

        let loose = Cell::constant(9.0, Arc::clone(&g));
        assert!(matches!(
            loose.reference(),
            Err(FormulaError::NotAnchored(_))
        ));
    }

    #[test]
    fn test_variable() {
        let g = grid();
        let rate = Cell::constant(0.25, Arc::clone(&g)).into_variable("rate");
        let word = rate.variable().unwrap();
        assert_eq!(rendered(&word, "excel"), "=rate");
        assert_eq!(rendered(&word, "native"), "value of variable 'rate (=0.25)'");

        let plain = Cell::constant(0.25, g);
        assert!(matches!(plain.variable(), Err(FormulaError::Validation(_))));
    }

    #[test]
    fn test_sum_renders_range_only() {
        let g = grid();
        let start = at(&g, 0, 0, 1.0);
        let end = at(&g, 2, 1, 2.0);
        let members = [start.clone(), at(&g, 1, 0, 3.0), end.clone()];

        let total = Cell::sum(&start, &end, &members).unwrap();
        assert_eq!(total.value(), &CellValue::Number(6.0));
        assert_eq!(rendered(&total, "excel"), "=SUM(A1:B3)");
        assert_eq!(rendered(&total, "array_index"), "np.sum(values[0:3,0:2])");

        let fewer = Cell::sum(&start, &end, &members[..1]).unwrap();
        assert_eq!(fewer.parse(), total.parse());
        assert_eq!(fewer.value(), &CellValue::Number(1.0));
    }

    #[test]
    fn test_aggregate_needs_anchored_endpoints() {
        let g = grid();
        let loose = Cell::constant(1.0, Arc::clone(&g));
        let end = at(&g, 1, 1, 1.0);
        assert!(matches!(
            Cell::mean(&loose, &end, [&end]),
            Err(FormulaError::NotAnchored(_))
        ));
        assert!(matches!(
            Cell::mean(&end, &loose, [&end]),
            Err(FormulaError::NotAnchored(_))
        ));
    }

    #[test]
    fn test_half_open_range_on_last_row() {
        let g = grid();
        let start = at(&g, 0, 0, 1.0);
        let end = at(&g, u32::MAX, 0, 1.0);
        assert!(matches!(
            Cell::sum(&start, &end, [&start]),
            Err(FormulaError::MissingLabel { .. })
        ));
    }

    #[test]
    fn test_non_empty_members() {
        let g = grid();
        let start = at(&g, 0, 0, 4.0);
        let blank = Cell::anchored(CellCoord::new(1, 0), CellValue::Empty, Arc::clone(&g));
        let end = at(&g, 2, 0, 2.0);
        let all = [start.clone(), blank, end.clone()];

        let avg = Cell::mean(&start, &end, Cell::non_empty(&all)).unwrap();
        assert_eq!(avg.value(), &CellValue::Number(3.0));
        let count = Cell::count(&start, &end, &all).unwrap();
        assert_eq!(count.value(), &CellValue::Number(3.0));

        let nothing = Cell::median(&start, &end, Cell::non_empty(&all[1..2])).unwrap();
        assert_eq!(nothing.value(), &CellValue::Error(CellError::NotAvailable));
    }

    #[test]
    fn test_conditional_is_eager_but_renders_all_branches() {
        let g = grid();
        let flag = at(&g, 0, 0, 0.0);
        let yes = at(&g, 1, 0, 10.0);
        let no = Cell::constant(20.0, Arc::clone(&g));
        let picked = Cell::conditional(&flag, &yes, &no).unwrap();
        assert_eq!(picked.value(), &CellValue::Number(20.0));
        assert_eq!(rendered(&picked, "excel"), "=IF(A1,A2,20)");

        let broken = Cell::constant(CellValue::Error(CellError::NumError), Arc::clone(&g));
        let failed = Cell::conditional(&broken, &yes, &no).unwrap();
        assert_eq!(failed.value(), &CellValue::Error(CellError::NumError));
    }

    #[test]
    fn test_linear_interpolation() {
        let g = grid();
        let x_start = at(&g, 0, 5, 1.0);
        let y_start = at(&g, 3, 5, 3.0);
        let x_end = Cell::constant(3.0, Arc::clone(&g));
        let y_end = (&at(&g, 4, 5, 4.0) + &at(&g, 4, 6, 5.0)).unwrap();
        let x = Cell::constant(9.0, Arc::clone(&g));

        let y = Cell::linear_interpolation(&x_start, &y_start, &x_end, &y_end, &x).unwrap();
        assert_eq!(y.value(), &CellValue::Number(27.0));
        assert_eq!(y.kind(), CellKind::Derived);
        assert_eq!(rendered(&y, "excel"), "=(9-F1)*((F5+G5-F4)/(3-F1))+F4");
        assert_eq!(
            rendered(&y, "array_index"),
            "values[3,5]+(9-values[0,5])*(values[4,5]+values[4,6]-values[3,5])/(3-values[0,5])"
        );

        // every operand's tree is grafted, derived operands with their own
        let mut coords = y.dependencies().all_coordinates();
        coords.sort();
        assert_eq!(
            coords,
            vec![
                CellCoord::new(0, 5),
                CellCoord::new(3, 5),
                CellCoord::new(4, 5),
                CellCoord::new(4, 6),
            ]
        );
        assert_eq!(y.dependencies().root().len(), 5);

        let flat = Cell::linear_interpolation(&x_start, &y_start, &x_start, &y_end, &x).unwrap();
        assert_eq!(flat.value(), &CellValue::Error(CellError::DivisionByZero));
    }

    #[test]
    fn test_offset() {
        let g = grid();
        let origin = at(&g, 0, 0, 0.0);
        let target = at(&g, 2, 1, 42.0);
        let rows = Cell::constant(2.0, Arc::clone(&g));
        let cols = Cell::constant(1.0, Arc::clone(&g));

        let moved = Cell::offset(&origin, &rows, &cols, &target).unwrap();
        assert_eq!(moved.value(), &CellValue::Number(42.0));
        assert_eq!(rendered(&moved, "excel"), "=OFFSET(A1,2,1)");

        assert!(Cell::offset(&rows, &rows, &cols, &target).is_err());
        assert!(Cell::offset(&origin, &rows, &cols, &rows).is_err());
    }

    #[test]
    fn test_raw() {
        let g = grid();
        let source = at(&g, 0, 0, 5.0);
        let mut words = BTreeMap::new();
        words.insert("excel".to_string(), "CUSTOM()".to_string());
        let raw = source.raw(&words);
        assert_eq!(raw.value(), &CellValue::Number(5.0));
        assert_eq!(rendered(&raw, "excel"), "=CUSTOM()");
        assert!(!raw.parse().contains_key("native"));
    }

    #[test]
    fn test_concatenate_quotes_literals() {
        let g = grid();
        let name = Cell::constant("id-", Arc::clone(&g));
        let number = at(&g, 0, 1, 12.0);
        let joined = name.concatenate(&number).unwrap();
        assert_eq!(joined.value(), &CellValue::from("id-12"));
        assert_eq!(rendered(&joined, "excel"), "=CONCATENATE(\"id-\",B1)");
    }

    #[test]
    fn test_operator_traits() {
        let g = grid();
        let a = at(&g, 0, 0, 7.0);
        let b = at(&g, 0, 1, 2.0);
        assert_eq!((&a - &b).unwrap().value(), &CellValue::Number(5.0));
        assert_eq!((&a / &b).unwrap().value(), &CellValue::Number(3.5));
        assert_eq!((&a % &b).unwrap().value(), &CellValue::Number(1.0));
        assert_eq!(rendered(&(&a % &b).unwrap(), "excel"), "=MOD(A1,B1)");
        assert_eq!((&a & &b).unwrap().value(), &CellValue::Boolean(true));
        assert_eq!((!&a).unwrap().value(), &CellValue::Boolean(false));
        assert_eq!(rendered(&(&a | &b).unwrap(), "array_index"), "values[0,0] or values[0,1]");
    }

    #[test]
    fn test_dependency_tree_follows_anchor() {
        let g = grid();
        let a = at(&g, 1, 0, 1.0);
        let b = at(&g, 3, 0, 2.0);
        let mut sum = (&a + &b).unwrap();
        sum.set_coordinates(Some(CellCoord::new(5, 0)));
        assert_eq!(sum.dependencies().coordinates(), Some(CellCoord::new(5, 0)));

        let touched = sum.delete_row(1);
        assert_eq!(touched, vec![CellCoord::new(1, 0), CellCoord::new(4, 0)]);
        assert_eq!(sum.coordinates(), Some(CellCoord::new(4, 0)));
        let rows: Vec<u32> = sum.dependencies().all_coordinates().iter().map(|c| c.row).collect();
        assert_eq!(rows, vec![4, 2]);
    }

    #[test]
    fn test_style_and_description() {
        let mut cell = Cell::constant(1.0, grid());
        cell.set_style_json(json!({ "bold": true })).unwrap();
        assert!(cell.format().is_bold());

        let err = cell.set_style_json(json!("bold")).unwrap_err();
        assert!(matches!(err, FormulaError::Validation(_)));
        assert!(cell.format().is_bold());

        cell.set_description(Some("net income".to_string()));
        assert_eq!(cell.description(), Some("net income"));
    }

    #[test]
    fn test_custom_notation_needs_grammar_and_labels() -> Result<()> {
        let _guard = registry::TEST_LOCK.lock();
        let name = "cell_test_custom";
        registry::register(crate::grammar::native(), name)?;
        let labels = |n: u32| (0..=n).map(|i| format!("r{}", i)).collect::<Vec<_>>();
        let custom = CellIndices::generated(2, 2).with_notation(name, labels(2), labels(2))?;
        let g = Arc::new(custom);

        let sum = (&at(&g, 0, 1, 1.0) + &at(&g, 1, 0, 2.0))?;
        assert_eq!(rendered(&sum, name), "value at (r0, r1) + value at (r1, r0)");

        let plain = grid();
        let other = (&at(&plain, 0, 0, 1.0) + &at(&plain, 0, 1, 1.0))?;
        assert!(!other.parse().contains_key(name));

        registry::remove(name)?;
        Ok(())
    }

    #[test]
    fn test_unlabelled_notation_is_not_live() {
        let indices = CellIndices::default();
        let cell = Cell::constant(1.0, Arc::new(indices));
        assert!(cell.parse().is_empty());
    }

    proptest! {
        #[test]
        fn prop_sum_ignores_member_order(
            values in proptest::collection::vec(-1000i32..1000, 1..12),
            seed in any::<u64>(),
        ) {
            let g = grid();
            let members: Vec<Cell> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| at(&g, i as u32 % 10, 0, f64::from(v)))
                .collect();
            let start = at(&g, 0, 0, 0.0);
            let end = at(&g, 9, 0, 0.0);

            let mut shuffled: Vec<&Cell> = members.iter().collect();
            let len = shuffled.len();
            shuffled.rotate_left((seed % len as u64) as usize);
            shuffled.reverse();

            let forward = Cell::sum(&start, &end, &members).unwrap();
            let backward = Cell::sum(&start, &end, shuffled).unwrap();
            let expected: i32 = values.iter().sum();
            prop_assert_eq!(forward.value(), &CellValue::Number(f64::from(expected)));
            prop_assert_eq!(forward.value(), backward.value());
            prop_assert_eq!(forward.parse(), backward.parse());
        }

        #[test]
        fn prop_add_renders_both_references(
            r1 in 0u32..10, c1 in 0u32..10, r2 in 0u32..10, c2 in 0u32..10,
            x in -500i32..500, y in -500i32..500,
        ) {
            let g = grid();
            let a = at(&g, r1, c1, f64::from(x));
            let b = at(&g, r2, c2, f64::from(y));
            let sum = (&a + &b).unwrap();
            prop_assert_eq!(sum.value(), &CellValue::Number(f64::from(x + y)));

            let grammars = registry::snapshot_for(&g);
            for (name, grammar) in grammars.iter() {
                let left = a.word_for_reference(&grammars).unwrap();
                let right = b.word_for_reference(&grammars).unwrap();
                let body = grammar.operations.add.join(
                    left.get(name).unwrap_or_default(),
                    right.get(name).unwrap_or_default(),
                );
                prop_assert_eq!(
                    sum.parse().get(name).cloned(),
                    Some(grammar.cells.operation.wrap(&body))
                );
            }
        }
    }
}
