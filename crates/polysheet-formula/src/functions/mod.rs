//! Value semantics of the operators: host arithmetic on `CellValue`, with
//! undefined results carried as `CellValue::Error`.

pub mod logical;
pub mod math;
pub mod text;
