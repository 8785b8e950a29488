use polysheet_core::CellValue;
use std::cmp::Ordering;

/// Ordering used by the comparison operators.
///
/// Numbers and booleans compare numerically, text case-insensitively, and
/// mixed kinds fall back to their textual forms.
fn compare_values(left: &CellValue, right: &CellValue) -> Ordering {
    match (left, right) {
        (CellValue::Text(a), CellValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => left.as_text().cmp(&right.as_text()),
        },
    }
}

fn comparison(left: &CellValue, right: &CellValue, test: impl Fn(Ordering) -> bool) -> CellValue {
    if let CellValue::Error(e) = left {
        return CellValue::Error(*e);
    }
    if let CellValue::Error(e) = right {
        return CellValue::Error(*e);
    }
    CellValue::Boolean(test(compare_values(left, right)))
}

pub fn equal_to(left: &CellValue, right: &CellValue) -> CellValue {
    comparison(left, right, |o| o == Ordering::Equal)
}

pub fn not_equal_to(left: &CellValue, right: &CellValue) -> CellValue {
    comparison(left, right, |o| o != Ordering::Equal)
}

pub fn greater_than(left: &CellValue, right: &CellValue) -> CellValue {
    comparison(left, right, |o| o == Ordering::Greater)
}

pub fn greater_than_or_equal_to(left: &CellValue, right: &CellValue) -> CellValue {
    comparison(left, right, |o| o != Ordering::Less)
}

pub fn less_than(left: &CellValue, right: &CellValue) -> CellValue {
    comparison(left, right, |o| o == Ordering::Less)
}

pub fn less_than_or_equal_to(left: &CellValue, right: &CellValue) -> CellValue {
    comparison(left, right, |o| o != Ordering::Greater)
}

/// AND of the operands' truthiness
pub fn conjunction(left: &CellValue, right: &CellValue) -> CellValue {
    comparison(left, right, |_| left.is_truthy() && right.is_truthy())
}

/// OR of the operands' truthiness
pub fn disjunction(left: &CellValue, right: &CellValue) -> CellValue {
    comparison(left, right, |_| left.is_truthy() || right.is_truthy())
}

pub fn negation(value: &CellValue) -> CellValue {
    match value {
        CellValue::Error(e) => CellValue::Error(*e),
        other => CellValue::Boolean(!other.is_truthy()),
    }
}
