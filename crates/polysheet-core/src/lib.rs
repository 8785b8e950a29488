//! Values, coordinates and per-notation labels shared by polysheet crates.

pub mod coord;
pub mod error;
pub mod format;
pub mod labels;
pub mod value;

pub use coord::{col_to_label, CellCoord};
pub use error::CellError;
pub use format::CellFormat;
pub use labels::{CellIndices, LabelError};
pub use value::CellValue;
