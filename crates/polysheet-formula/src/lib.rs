//! Expressions over grid cells, rendered in several notations at once.
//!
//! ```
//! use std::sync::Arc;
//! use polysheet_core::{CellCoord, CellIndices};
//! use polysheet_formula::Cell;
//!
//! let grid = Arc::new(CellIndices::generated(3, 3));
//! let a = Cell::anchored(CellCoord::new(0, 0), 2.0, Arc::clone(&grid));
//! let b = Cell::anchored(CellCoord::new(1, 0), 3.0, Arc::clone(&grid));
//!
//! let total = (&a + &b).unwrap();
//! let words = total.parse();
//! assert_eq!(words["excel"], "=A1+A2");
//! assert_eq!(words["array_index"], "values[0,0]+values[1,0]");
//! ```

pub mod cell;
pub mod config;
pub mod dependency;
pub mod error;
pub mod functions;
pub mod grammar;
pub mod ops;
pub mod variables;
pub mod word;

pub use cell::{Cell, CellKind};
pub use config::Config;
pub use dependency::{Deletion, DependencyTree};
pub use error::{FormulaError, GrammarError, Result};
pub use grammar::{registry, Grammar, GrammarRegistry};
pub use ops::{AggregateOp, BinaryOp, UnaryOp};
pub use variables::Variables;
pub use word::{Term, Word};
