use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CellError;

/// Scalar held by a cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// No value, as in a blank grid cell
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(CellError),
}

macro_rules! impl_from {
    ($($source:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$source> for CellValue {
                fn from($v: $source) -> Self {
                    $body
                }
            }
        )*
    };
}

impl_from! {
    f64 => |v| CellValue::Number(v),
    i32 => |v| CellValue::Number(f64::from(v)),
    bool => |v| CellValue::Boolean(v),
    &str => |v| CellValue::Text(v.to_string()),
    String => |v| CellValue::Text(v),
    CellError => |v| CellValue::Error(v),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numbers and booleans take part in arithmetic, everything else does not
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Number(_) | CellValue::Boolean(_))
    }

    /// Numeric operand, booleans coerced to 1 and 0
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Textual form used for concatenation and for rendering constants
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Truthiness used when a value selects a branch.
    ///
    /// Empty and error values are false, text is true when non-empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty | CellValue::Error(_) => false,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Boolean(b) => *b,
            CellValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            // whole numbers print without a fractional part
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(CellValue::Number(42.0).as_number(), Some(42.0));
        assert_eq!(CellValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(CellValue::from("123").as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
        assert!(CellValue::Boolean(false).is_numeric());
        assert!(!CellValue::from("1").is_numeric());
    }

    #[test]
    fn test_text_form() {
        assert_eq!(CellValue::Number(42.0).as_text(), "42");
        assert_eq!(CellValue::Number(42.5).as_text(), "42.5");
        assert_eq!(CellValue::Number(-3.0).as_text(), "-3");
        assert_eq!(CellValue::Number(1e20).as_text(), "100000000000000000000");
        assert_eq!(CellValue::Boolean(true).as_text(), "TRUE");
        assert_eq!(CellValue::Empty.as_text(), "");
        assert_eq!(CellValue::from(CellError::DivisionByZero).as_text(), "#DIV/0!");
    }

    #[test]
    fn test_truthiness() {
        assert!(CellValue::Number(2.0).is_truthy());
        assert!(!CellValue::Number(0.0).is_truthy());
        assert!(!CellValue::Empty.is_truthy());
        assert!(CellValue::from("x").is_truthy());
        assert!(!CellValue::from("").is_truthy());
        assert!(!CellValue::Error(CellError::NumError).is_truthy());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(CellValue::from(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "Number", "value": 7.0 }));
        assert_eq!(CellValue::default(), CellValue::Empty);
    }
}
