use polysheet_core::{CellCoord, LabelError};
use thiserror::Error;

/// Errors raised while registering or looking up grammar tables
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("Notation '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Notation '{0}' is not registered")]
    NotRegistered(String),

    #[error("Invalid grammar at '{path}': {reason}")]
    Invalid { path: String, reason: String },

    #[error("Grammar is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by the cell operator surface
#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("Construction error: {0}")]
    Construction(String),

    #[error("Cell is not anchored: {0}")]
    NotAnchored(&'static str),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("No '{notation}' label for {coord}")]
    MissingLabel { notation: String, coord: CellCoord },

    #[error("Configuration error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LabelError> for FormulaError {
    fn from(err: LabelError) -> Self {
        FormulaError::Construction(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FormulaError>;
