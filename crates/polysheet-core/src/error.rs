use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Undefined result of a value operation, carried in place of a value.
///
/// Displays as the spreadsheet error literal so that it renders the same way
/// in every notation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    #[error("#DIV/0!")]
    DivisionByZero,
    /// Operand of the wrong kind
    #[error("#VALUE!")]
    InvalidValue,
    /// NaN, infinite, or outside the function's domain
    #[error("#NUM!")]
    NumError,
    #[error("#N/A")]
    NotAvailable,
}
