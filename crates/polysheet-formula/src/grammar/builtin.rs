//! Grammars bundled with the engine.
//!
//! `array_index` doubles as the reference shape every other table is
//! validated against.

use super::*;

fn affix(prefix: &str, suffix: &str) -> Affix {
    Affix::new(prefix, suffix)
}

fn infix(prefix: &str, separator: &str, suffix: &str) -> Infix {
    Infix::new(prefix, separator, suffix)
}

/// Infix operator with no surrounding text
fn sep(separator: &str) -> Infix {
    Infix::new("", separator, "")
}

/// Function call with a single argument
fn call(name: &str) -> Affix {
    Affix::new(&format!("{}(", name), ")")
}

/// Narrative prefix with no closing text
fn phrase(prefix: &str) -> Affix {
    Affix::new(prefix, "")
}

fn axis(name_regexp: &str) -> AxisRule {
    AxisRule {
        name_regexp: name_regexp.to_string(),
        maximal_number: 65535,
    }
}

fn endpoint(prefix: &str, separator: &str, suffix: &str) -> Endpoint {
    Endpoint {
        prefix: prefix.to_string(),
        separator: separator.to_string(),
        suffix: suffix.to_string(),
        row_first: false,
        rows_only: false,
        cols_only: false,
    }
}

fn rows_only(mut endpoint: Endpoint) -> Endpoint {
    endpoint.rows_only = true;
    endpoint
}

fn cols_only(mut endpoint: Endpoint) -> Endpoint {
    endpoint.cols_only = true;
    endpoint
}

fn text(value: &str) -> String {
    value.to_string()
}

/// Spreadsheet formula dialect: `=SUM(A1:B3)`, `=IF(E3=7,E4,5)`
pub fn excel() -> Grammar {
    Grammar {
        rows: axis("[0-9]+"),
        cols: axis("[A-Z]+"),
        cells: CellRules {
            constant: affix("", ""),
            operation: affix("=", ""),
            empty: EmptyRule { content: text("") },
            variable: VariableRule {
                prefix: text(""),
                suffix: text(""),
                value: VariableValue {
                    include: false,
                    prefix: text(""),
                    suffix: text(""),
                },
            },
            reference: ReferenceRule {
                prefix: text(""),
                separator: text(""),
                suffix: text(""),
                row_first: false,
            },
            aggregation: AggregationRule {
                prefix: text(""),
                separator: text(":"),
                suffix: text(""),
                include_last_cell: true,
                start_cell: endpoint("", "", ""),
                end_cell: endpoint("", "", ""),
            },
            offset: OffsetRule {
                prefix: text("OFFSET("),
                suffix: text(")"),
                order: vec![
                    OffsetPart::ReferenceColumn,
                    OffsetPart::ReferenceRow,
                    OffsetPart::SkipRows,
                    OffsetPart::SkipColumns,
                ],
                reference_row: affix("", ","),
                reference_column: affix("", ""),
                skip_rows: affix("", ","),
                skip_columns: affix("", ""),
            },
        },
        operations: Operations {
            add: sep("+"),
            subtract: sep("-"),
            multiply: sep("*"),
            divide: sep("/"),
            modulo: infix("MOD(", ",", ")"),
            power: sep("^"),
            equal_to: sep("="),
            not_equal_to: sep("<>"),
            greater_than: sep(">"),
            greater_than_or_equal_to: sep(">="),
            less_than: sep("<"),
            less_than_or_equal_to: sep("<="),
            conjunction: infix("AND(", ", ", ")"),
            disjunction: infix("OR(", ", ", ")"),
            concatenate: ConcatenateRule {
                prefix: text("CONCATENATE("),
                separator: text(","),
                suffix: text(")"),
                string_value: affix("\"", "\""),
                numeric_value: affix("", ""),
            },
            negation: call("NOT"),
            exponential: call("EXP"),
            logarithm: call("LN"),
            ceil: call("CEILING"),
            floor: call("FLOOR"),
            round: call("ROUND"),
            abs: call("ABS"),
            sqrt: call("SQRT"),
            signum: call("SIGN"),
            sum: call("SUM"),
            product: call("PRODUCT"),
            mean: call("AVERAGE"),
            min: call("MIN"),
            max: call("MAX"),
            stdev: call("STDEV.P"),
            median: call("MEDIAN"),
            count: call("COUNT"),
            irr: call("IRR"),
            first_non_negative: affix("MATCH(TRUE,INDEX(", ">=0,0),0)-1"),
        },
        brackets: affix("(", ")"),
        conditional: ConditionalRule {
            prefix: text("IF("),
            suffix: text(")"),
            order: vec![
                ConditionalPart::Condition,
                ConditionalPart::Consequent,
                ConditionalPart::Alternative,
            ],
            condition: affix("", ","),
            consequent: affix("", ","),
            alternative: affix("", ""),
        },
        linear_interpolation: LinearInterpolationRule::new(
            "({x}-{x_s})*(({y_e}-{y_s})/({x_e}-{x_s}))+{y_s}",
        ),
    }
}

/// NumPy-style array dialect: `values[1,3]`, `np.sum(values[1:4,2:6])`
pub fn array_index() -> Grammar {
    Grammar {
        rows: axis("[0-9]+"),
        cols: axis("[0-9]+"),
        cells: CellRules {
            constant: affix("", ""),
            operation: affix("", ""),
            empty: EmptyRule { content: text("") },
            variable: VariableRule {
                prefix: text(""),
                suffix: text(""),
                value: VariableValue {
                    include: false,
                    prefix: text(""),
                    suffix: text(""),
                },
            },
            reference: ReferenceRule {
                prefix: text("values["),
                separator: text(","),
                suffix: text("]"),
                row_first: true,
            },
            aggregation: AggregationRule {
                prefix: text("values["),
                separator: text(","),
                suffix: text("]"),
                include_last_cell: false,
                start_cell: rows_only(endpoint("", ":", "")),
                end_cell: cols_only(endpoint("", ":", "")),
            },
            offset: OffsetRule {
                prefix: text("values["),
                suffix: text("]"),
                order: vec![
                    OffsetPart::ReferenceRow,
                    OffsetPart::SkipRows,
                    OffsetPart::ReferenceColumn,
                    OffsetPart::SkipColumns,
                ],
                reference_row: affix("", "+"),
                reference_column: affix("", "+"),
                skip_rows: affix("", ","),
                skip_columns: affix("", ""),
            },
        },
        operations: Operations {
            add: sep("+"),
            subtract: sep("-"),
            multiply: sep("*"),
            divide: sep("/"),
            modulo: sep("%"),
            power: sep("**"),
            equal_to: sep("=="),
            not_equal_to: sep("!="),
            greater_than: sep(">"),
            greater_than_or_equal_to: sep(">="),
            less_than: sep("<"),
            less_than_or_equal_to: sep("<="),
            conjunction: sep(" and "),
            disjunction: sep(" or "),
            concatenate: ConcatenateRule {
                prefix: text("str("),
                separator: text(")+str("),
                suffix: text(")"),
                string_value: affix("\"", "\""),
                numeric_value: affix("", ""),
            },
            negation: affix("not (", ")"),
            exponential: call("np.exp"),
            logarithm: call("np.log"),
            ceil: call("np.ceil"),
            floor: call("np.floor"),
            round: call("np.round"),
            abs: call("np.abs"),
            sqrt: call("np.sqrt"),
            signum: call("np.sign"),
            sum: call("np.sum"),
            product: call("np.prod"),
            mean: call("np.mean"),
            min: call("np.min"),
            max: call("np.max"),
            stdev: call("np.std"),
            median: call("np.median"),
            count: affix("((lambda var=", ": var.shape[0] * var.shape[1])())"),
            irr: call("npf.irr"),
            first_non_negative: affix("np.argmin(", "<0)"),
        },
        brackets: affix("(", ")"),
        conditional: ConditionalRule {
            prefix: text("("),
            suffix: text(")"),
            order: vec![
                ConditionalPart::Consequent,
                ConditionalPart::Condition,
                ConditionalPart::Alternative,
            ],
            condition: affix(" if (", ") "),
            consequent: affix("(", ")"),
            alternative: affix("else (", ")"),
        },
        linear_interpolation: LinearInterpolationRule::new(
            "{y_s}+({x}-{x_s})*({y_e}-{y_s})/({x_e}-{x_s})",
        ),
    }
}

/// Narrative English: `value at (2, 4) + 7`
pub fn native() -> Grammar {
    Grammar {
        rows: axis("[0-9]+"),
        cols: axis("[0-9]+"),
        cells: CellRules {
            constant: affix("", ""),
            operation: affix("", ""),
            empty: EmptyRule { content: text("") },
            variable: VariableRule {
                prefix: text("value of variable '"),
                suffix: text("'"),
                value: VariableValue {
                    include: true,
                    prefix: text(" (="),
                    suffix: text(")"),
                },
            },
            reference: ReferenceRule {
                prefix: text("value at ("),
                separator: text(", "),
                suffix: text(")"),
                row_first: true,
            },
            aggregation: AggregationRule {
                prefix: text("set of values on "),
                separator: text(" and "),
                suffix: text(""),
                include_last_cell: true,
                start_cell: rows_only(endpoint("row from (", " to ", ")")),
                end_cell: cols_only(endpoint("column from (", " to ", ")")),
            },
            offset: OffsetRule {
                prefix: text("skip from "),
                suffix: text(""),
                order: vec![
                    OffsetPart::ReferenceRow,
                    OffsetPart::SkipRows,
                    OffsetPart::ReferenceColumn,
                    OffsetPart::SkipColumns,
                ],
                reference_row: affix("the row at position ", " exactly "),
                reference_column: affix("and from the column at position ", " exactly "),
                skip_rows: affix("", " items down, "),
                skip_columns: affix("", " items left"),
            },
        },
        operations: Operations {
            add: sep(" + "),
            subtract: sep(" - "),
            multiply: sep(" * "),
            divide: sep(" / "),
            modulo: sep(" mod "),
            power: sep(" power to "),
            equal_to: sep(" equal to "),
            not_equal_to: sep(" not equal to "),
            greater_than: sep(" greater than "),
            greater_than_or_equal_to: sep(" greater than or equal to "),
            less_than: sep(" less than "),
            less_than_or_equal_to: sep(" less than or equal to "),
            conjunction: sep(" and "),
            disjunction: sep(" or "),
            concatenate: ConcatenateRule {
                prefix: text("concatenate string "),
                separator: text(" and "),
                suffix: text(""),
                string_value: affix("'", "'"),
                numeric_value: affix("'", "'"),
            },
            negation: affix("negation (", ")"),
            exponential: phrase("exponential function of "),
            logarithm: phrase("logarithm of "),
            ceil: phrase("ceiling function of "),
            floor: phrase("floor function of "),
            round: phrase("round of "),
            abs: phrase("absolute value of "),
            sqrt: phrase("square root of "),
            signum: phrase("signum of "),
            sum: phrase("sum of "),
            product: phrase("product of "),
            mean: phrase("mean-average of "),
            min: phrase("minimum of "),
            max: phrase("maximum of "),
            stdev: phrase("standard deviation of "),
            median: phrase("median of "),
            count: phrase("number of items in "),
            irr: phrase("internal rate of return of "),
            first_non_negative: phrase("position of the last negative value before the first non-negative one in "),
        },
        brackets: affix("(", ")"),
        conditional: ConditionalRule {
            prefix: text("("),
            suffix: text(")"),
            order: vec![
                ConditionalPart::Condition,
                ConditionalPart::Consequent,
                ConditionalPart::Alternative,
            ],
            condition: affix("if ", ""),
            consequent: affix(" then ", ""),
            alternative: affix(" else ", ""),
        },
        linear_interpolation: LinearInterpolationRule::new(
            "linear interpolation at {x} between ({x_s}, {y_s}) and ({x_e}, {y_e})",
        ),
    }
}
