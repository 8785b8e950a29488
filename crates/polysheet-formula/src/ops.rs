//! Closed sets of operator kinds.
//!
//! Each kind resolves, with a single match, both to its grammar rule and to
//! its value function, so one generic template serves every operator.

use polysheet_core::CellValue;
use std::borrow::Cow;
use std::fmt;

use crate::functions::{logical, math, text};
use crate::grammar::{Affix, Grammar, Infix};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,

    // Comparison
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,

    // Logical
    Conjunction,
    Disjunction,

    // String
    Concatenate,
}

impl BinaryOp {
    pub fn rule<'g>(&self, grammar: &'g Grammar) -> Cow<'g, Infix> {
        let ops = &grammar.operations;
        Cow::Borrowed(match self {
            BinaryOp::Add => &ops.add,
            BinaryOp::Subtract => &ops.subtract,
            BinaryOp::Multiply => &ops.multiply,
            BinaryOp::Divide => &ops.divide,
            BinaryOp::Modulo => &ops.modulo,
            BinaryOp::Power => &ops.power,
            BinaryOp::EqualTo => &ops.equal_to,
            BinaryOp::NotEqualTo => &ops.not_equal_to,
            BinaryOp::GreaterThan => &ops.greater_than,
            BinaryOp::GreaterThanOrEqualTo => &ops.greater_than_or_equal_to,
            BinaryOp::LessThan => &ops.less_than,
            BinaryOp::LessThanOrEqualTo => &ops.less_than_or_equal_to,
            BinaryOp::Conjunction => &ops.conjunction,
            BinaryOp::Disjunction => &ops.disjunction,
            BinaryOp::Concatenate => return Cow::Owned(ops.concatenate.infix()),
        })
    }

    pub fn evaluate(&self, left: &CellValue, right: &CellValue) -> CellValue {
        match self {
            BinaryOp::Add => math::add(left, right),
            BinaryOp::Subtract => math::subtract(left, right),
            BinaryOp::Multiply => math::multiply(left, right),
            BinaryOp::Divide => math::divide(left, right),
            BinaryOp::Modulo => math::modulo(left, right),
            BinaryOp::Power => math::power(left, right),
            BinaryOp::EqualTo => logical::equal_to(left, right),
            BinaryOp::NotEqualTo => logical::not_equal_to(left, right),
            BinaryOp::GreaterThan => logical::greater_than(left, right),
            BinaryOp::GreaterThanOrEqualTo => logical::greater_than_or_equal_to(left, right),
            BinaryOp::LessThan => logical::less_than(left, right),
            BinaryOp::LessThanOrEqualTo => logical::less_than_or_equal_to(left, right),
            BinaryOp::Conjunction => logical::conjunction(left, right),
            BinaryOp::Disjunction => logical::disjunction(left, right),
            BinaryOp::Concatenate => text::concatenate(left, right),
        }
    }
}

/// Single-operand operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negation,
    Exponential,
    Logarithm,
    Ceil,
    Floor,
    Round,
    Abs,
    Sqrt,
    Signum,
    Brackets,
}

impl UnaryOp {
    pub fn rule<'g>(&self, grammar: &'g Grammar) -> &'g Affix {
        let ops = &grammar.operations;
        match self {
            UnaryOp::Negation => &ops.negation,
            UnaryOp::Exponential => &ops.exponential,
            UnaryOp::Logarithm => &ops.logarithm,
            UnaryOp::Ceil => &ops.ceil,
            UnaryOp::Floor => &ops.floor,
            UnaryOp::Round => &ops.round,
            UnaryOp::Abs => &ops.abs,
            UnaryOp::Sqrt => &ops.sqrt,
            UnaryOp::Signum => &ops.signum,
            UnaryOp::Brackets => &grammar.brackets,
        }
    }

    pub fn evaluate(&self, value: &CellValue) -> CellValue {
        match self {
            UnaryOp::Negation => logical::negation(value),
            UnaryOp::Exponential => math::exponential(value),
            UnaryOp::Logarithm => math::logarithm(value),
            UnaryOp::Ceil => math::ceil(value),
            UnaryOp::Floor => math::floor(value),
            UnaryOp::Round => math::round(value),
            UnaryOp::Abs => math::abs(value),
            UnaryOp::Sqrt => math::sqrt(value),
            UnaryOp::Signum => math::signum(value),
            UnaryOp::Brackets => value.clone(),
        }
    }
}

/// Range reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Sum,
    Product,
    Mean,
    Min,
    Max,
    Stdev,
    Median,
    Count,
    Irr,
    FirstNonNegative,
}

impl AggregateOp {
    pub fn rule<'g>(&self, grammar: &'g Grammar) -> &'g Affix {
        let ops = &grammar.operations;
        match self {
            AggregateOp::Sum => &ops.sum,
            AggregateOp::Product => &ops.product,
            AggregateOp::Mean => &ops.mean,
            AggregateOp::Min => &ops.min,
            AggregateOp::Max => &ops.max,
            AggregateOp::Stdev => &ops.stdev,
            AggregateOp::Median => &ops.median,
            AggregateOp::Count => &ops.count,
            AggregateOp::Irr => &ops.irr,
            AggregateOp::FirstNonNegative => &ops.first_non_negative,
        }
    }

    pub fn evaluate(&self, values: &[CellValue]) -> CellValue {
        match self {
            AggregateOp::Sum => math::sum(values),
            AggregateOp::Product => math::product(values),
            AggregateOp::Mean => math::mean(values),
            AggregateOp::Min => math::min(values),
            AggregateOp::Max => math::max(values),
            AggregateOp::Stdev => math::stdev(values),
            AggregateOp::Median => math::median(values),
            AggregateOp::Count => math::count(values),
            AggregateOp::Irr => math::irr(values),
            AggregateOp::FirstNonNegative => math::first_non_negative(values),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "subtract",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "divide",
            BinaryOp::Modulo => "modulo",
            BinaryOp::Power => "power",
            BinaryOp::EqualTo => "equal_to",
            BinaryOp::NotEqualTo => "not_equal_to",
            BinaryOp::GreaterThan => "greater_than",
            BinaryOp::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            BinaryOp::LessThan => "less_than",
            BinaryOp::LessThanOrEqualTo => "less_than_or_equal_to",
            BinaryOp::Conjunction => "conjunction",
            BinaryOp::Disjunction => "disjunction",
            BinaryOp::Concatenate => "concatenate",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{array_index, excel};

    #[test]
    fn test_rules_follow_notation() {
        let excel = excel();
        let array = array_index();
        assert_eq!(BinaryOp::Modulo.rule(&excel).prefix, "MOD(");
        assert_eq!(BinaryOp::Modulo.rule(&array).separator, "%");
        assert_eq!(BinaryOp::Concatenate.rule(&array).separator, ")+str(");
        assert_eq!(UnaryOp::Brackets.rule(&excel).prefix, "(");
        assert_eq!(AggregateOp::Mean.rule(&excel).prefix, "AVERAGE(");
    }

    #[test]
    fn test_evaluate() {
        let a = CellValue::Number(6.0);
        let b = CellValue::Number(4.0);
        assert_eq!(BinaryOp::Modulo.evaluate(&a, &b), CellValue::Number(2.0));
        assert_eq!(BinaryOp::GreaterThan.evaluate(&a, &b), CellValue::Boolean(true));
        assert_eq!(UnaryOp::Brackets.evaluate(&a), a);
        assert_eq!(
            AggregateOp::Max.evaluate(&[a.clone(), b.clone()]),
            CellValue::Number(6.0)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(BinaryOp::GreaterThanOrEqualTo.to_string(), "greater_than_or_equal_to");
    }
}
