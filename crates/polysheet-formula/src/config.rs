use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{FormulaError, Result};
use crate::grammar::{registry, GrammarRegistry};

/// Environment variable listing extra grammar files
pub const GRAMMARS_VAR: &str = "POLYSHEET_GRAMMARS";

/// Extra notations loaded at start-up
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// JSON grammar files, each registered under its file stem
    pub grammar_files: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let grammar_files = env::var_os(GRAMMARS_VAR)
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { grammar_files }
    }

    /// Register every grammar file in the process-wide registry.
    ///
    /// All files are read and registered into a staged copy first. Any
    /// failure leaves the registry untouched.
    pub fn apply(&self) -> Result<Vec<String>> {
        let sources = self.read_sources()?;
        registry::update(|staged| register_all(staged, &sources))
    }

    /// Register every grammar file in `target`, all or nothing
    pub fn apply_to(&self, target: &mut GrammarRegistry) -> Result<Vec<String>> {
        let sources = self.read_sources()?;
        let mut staged = target.clone();
        let names = register_all(&mut staged, &sources)?;
        *target = staged;
        Ok(names)
    }

    /// Notation name and JSON text of each file
    fn read_sources(&self) -> Result<Vec<(String, String)>> {
        self.grammar_files
            .iter()
            .map(|path| {
                let name = notation_name(path)?;
                let text = fs::read_to_string(path)?;
                debug!("Read grammar '{}' from {}", name, path.display());
                Ok((name, text))
            })
            .collect()
    }
}

fn register_all(
    target: &mut GrammarRegistry,
    sources: &[(String, String)],
) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(sources.len());
    for (name, text) in sources {
        target.register_json(text, name)?;
        names.push(name.clone());
    }
    Ok(names)
}

fn notation_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            FormulaError::Validation(format!("no notation name in path {}", path.display()))
        })
}
