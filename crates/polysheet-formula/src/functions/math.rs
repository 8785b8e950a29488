use polysheet_core::{CellError, CellValue};

/// Collect members as numbers. An error member is returned as-is, any other
/// non-numeric member turns the whole reduction into `#VALUE!`.
fn numbers(values: &[CellValue]) -> Result<Vec<f64>, CellValue> {
    values
        .iter()
        .map(|value| match value {
            CellValue::Error(e) => Err(CellValue::Error(*e)),
            other => other
                .as_number()
                .ok_or(CellValue::Error(CellError::InvalidValue)),
        })
        .collect()
}

fn finite(result: f64) -> CellValue {
    if result.is_nan() || result.is_infinite() {
        CellValue::Error(CellError::NumError)
    } else {
        CellValue::Number(result)
    }
}

fn numeric_op(left: &CellValue, right: &CellValue, op: impl Fn(f64, f64) -> f64) -> CellValue {
    if let CellValue::Error(e) = left {
        return CellValue::Error(*e);
    }
    if let CellValue::Error(e) = right {
        return CellValue::Error(*e);
    }
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => finite(op(a, b)),
        _ => CellValue::Error(CellError::InvalidValue),
    }
}

fn unary_op(value: &CellValue, op: impl Fn(f64) -> CellValue) -> CellValue {
    match value {
        CellValue::Error(e) => CellValue::Error(*e),
        other => match other.as_number() {
            Some(n) => op(n),
            None => CellValue::Error(CellError::InvalidValue),
        },
    }
}

pub fn add(left: &CellValue, right: &CellValue) -> CellValue {
    numeric_op(left, right, |a, b| a + b)
}

pub fn subtract(left: &CellValue, right: &CellValue) -> CellValue {
    numeric_op(left, right, |a, b| a - b)
}

pub fn multiply(left: &CellValue, right: &CellValue) -> CellValue {
    numeric_op(left, right, |a, b| a * b)
}

pub fn divide(left: &CellValue, right: &CellValue) -> CellValue {
    if right.as_number() == Some(0.0) && !matches!(left, CellValue::Error(_)) {
        return CellValue::Error(CellError::DivisionByZero);
    }
    numeric_op(left, right, |a, b| a / b)
}

/// Floored modulo, the result takes the sign of the divisor
pub fn modulo(left: &CellValue, right: &CellValue) -> CellValue {
    if right.as_number() == Some(0.0) && !matches!(left, CellValue::Error(_)) {
        return CellValue::Error(CellError::DivisionByZero);
    }
    numeric_op(left, right, |a, b| a - b * (a / b).floor())
}

pub fn power(left: &CellValue, right: &CellValue) -> CellValue {
    numeric_op(left, right, f64::powf)
}

pub fn exponential(value: &CellValue) -> CellValue {
    unary_op(value, |n| finite(n.exp()))
}

/// Natural logarithm
pub fn logarithm(value: &CellValue) -> CellValue {
    unary_op(value, |n| {
        if n <= 0.0 {
            CellValue::Error(CellError::NumError)
        } else {
            CellValue::Number(n.ln())
        }
    })
}

pub fn ceil(value: &CellValue) -> CellValue {
    unary_op(value, |n| CellValue::Number(n.ceil()))
}

pub fn floor(value: &CellValue) -> CellValue {
    unary_op(value, |n| CellValue::Number(n.floor()))
}

/// Round half to even
pub fn round(value: &CellValue) -> CellValue {
    unary_op(value, |n| CellValue::Number(n.round_ties_even()))
}

pub fn abs(value: &CellValue) -> CellValue {
    unary_op(value, |n| CellValue::Number(n.abs()))
}

pub fn sqrt(value: &CellValue) -> CellValue {
    unary_op(value, |n| {
        if n < 0.0 {
            CellValue::Error(CellError::NumError)
        } else {
            CellValue::Number(n.sqrt())
        }
    })
}

/// -1, 0 or 1
pub fn signum(value: &CellValue) -> CellValue {
    unary_op(value, |n| {
        CellValue::Number(if n > 0.0 {
            1.0
        } else if n < 0.0 {
            -1.0
        } else {
            0.0
        })
    })
}

pub fn sum(values: &[CellValue]) -> CellValue {
    match numbers(values) {
        Ok(ns) => finite(ns.iter().sum()),
        Err(e) => e,
    }
}

pub fn product(values: &[CellValue]) -> CellValue {
    match numbers(values) {
        Ok(ns) => finite(ns.iter().product()),
        Err(e) => e,
    }
}

/// Arithmetic mean, `#DIV/0!` for an empty set
pub fn mean(values: &[CellValue]) -> CellValue {
    match numbers(values) {
        Ok(ns) if ns.is_empty() => CellValue::Error(CellError::DivisionByZero),
        Ok(ns) => finite(ns.iter().sum::<f64>() / ns.len() as f64),
        Err(e) => e,
    }
}

pub fn min(values: &[CellValue]) -> CellValue {
    match numbers(values) {
        Ok(ns) => CellValue::Number(ns.into_iter().reduce(f64::min).unwrap_or(0.0)),
        Err(e) => e,
    }
}

pub fn max(values: &[CellValue]) -> CellValue {
    match numbers(values) {
        Ok(ns) => CellValue::Number(ns.into_iter().reduce(f64::max).unwrap_or(0.0)),
        Err(e) => e,
    }
}

/// Population standard deviation
pub fn stdev(values: &[CellValue]) -> CellValue {
    let ns = match numbers(values) {
        Ok(ns) if ns.is_empty() => return CellValue::Error(CellError::DivisionByZero),
        Ok(ns) => ns,
        Err(e) => return e,
    };
    let n = ns.len() as f64;
    let mean = ns.iter().sum::<f64>() / n;
    let variance = ns.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    finite(variance.sqrt())
}

/// Middle value, `#N/A` for an empty set
pub fn median(values: &[CellValue]) -> CellValue {
    let mut ns = match numbers(values) {
        Ok(ns) if ns.is_empty() => return CellValue::Error(CellError::NotAvailable),
        Ok(ns) => ns,
        Err(e) => return e,
    };
    ns.sort_by(f64::total_cmp);
    let mid = ns.len() / 2;
    if ns.len() % 2 == 0 {
        CellValue::Number((ns[mid - 1] + ns[mid]) / 2.0)
    } else {
        CellValue::Number(ns[mid])
    }
}

/// Number of members, whatever their values
pub fn count(values: &[CellValue]) -> CellValue {
    CellValue::Number(values.len() as f64)
}

fn npv(rate: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(i, flow)| flow / (1.0 + rate).powi(i as i32))
        .sum()
}

fn npv_derivative(rate: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, flow)| -(i as f64) * flow / (1.0 + rate).powi(i as i32 + 1))
        .sum()
}

const IRR_TOLERANCE: f64 = 1e-10;

fn irr_newton(flows: &[f64]) -> Option<f64> {
    let mut rate = 0.1;
    for _ in 0..100 {
        let derivative = npv_derivative(rate, flows);
        if derivative == 0.0 {
            return None;
        }
        let next = rate - npv(rate, flows) / derivative;
        if !next.is_finite() || next <= -1.0 {
            return None;
        }
        if (next - rate).abs() < IRR_TOLERANCE {
            return Some(next);
        }
        rate = next;
    }
    None
}

fn irr_bisection(flows: &[f64]) -> Option<f64> {
    let mut low = -0.999_999;
    let mut high = 1.0;
    while npv(low, flows).signum() == npv(high, flows).signum() {
        high *= 2.0;
        if high > 1e6 {
            return None;
        }
    }
    for _ in 0..500 {
        let mid = (low + high) / 2.0;
        let value = npv(mid, flows);
        if value.abs() < IRR_TOLERANCE || (high - low) / 2.0 < IRR_TOLERANCE {
            return Some(mid);
        }
        if value.signum() == npv(low, flows).signum() {
            low = mid;
        } else {
            high = mid;
        }
    }
    Some((low + high) / 2.0)
}

/// Internal rate of return of a series of periodic cash flows
pub fn irr(values: &[CellValue]) -> CellValue {
    let flows = match numbers(values) {
        Ok(ns) => ns,
        Err(e) => return e,
    };
    let has_inflow = flows.iter().any(|f| *f > 0.0);
    let has_outflow = flows.iter().any(|f| *f < 0.0);
    if !(has_inflow && has_outflow) {
        return CellValue::Error(CellError::NumError);
    }

    match irr_newton(&flows).or_else(|| irr_bisection(&flows)) {
        Some(rate) => finite(rate),
        None => CellValue::Error(CellError::NumError),
    }
}

/// `y` at `x` on the line through `(x_start, y_start)` and `(x_end, y_end)`.
///
/// Extrapolates outside the known points; `#DIV/0!` when both share one `x`.
pub fn linear_interpolation(
    x_start: &CellValue,
    y_start: &CellValue,
    x_end: &CellValue,
    y_end: &CellValue,
    x: &CellValue,
) -> CellValue {
    let slope = divide(&subtract(y_end, y_start), &subtract(x_end, x_start));
    add(y_start, &multiply(&subtract(x, x_start), &slope))
}

/// 1-based position of the last negative value of the leading negative run.
///
/// Zero when the first member is non-negative, the member count when all are
/// negative. An empty set has no position, so it yields `#N/A`.
pub fn first_non_negative(values: &[CellValue]) -> CellValue {
    match numbers(values) {
        Ok(ns) if ns.is_empty() => CellValue::Error(CellError::NotAvailable),
        Ok(ns) => {
            let position = ns.iter().position(|n| *n >= 0.0).unwrap_or(ns.len());
            CellValue::Number(position as f64)
        }
        Err(e) => e,
    }
}
