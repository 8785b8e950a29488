//! Named grammar tables.
//!
//! `GrammarRegistry` is a plain value; the free functions of this module
//! operate on a process-wide instance seeded with the built-in notations.
//! Every mutation validates first and only then touches the map, so a failed
//! call leaves the registry as it was.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use polysheet_core::CellIndices;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::{builtin, validator, Grammar};
use crate::error::GrammarError;

#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    grammars: BTreeMap<String, Arc<Grammar>>,
}

impl GrammarRegistry {
    /// Registry without any notation
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `excel`, `array_index` and `native`
    pub fn with_builtins() -> Self {
        let mut grammars = BTreeMap::new();
        grammars.insert("excel".to_string(), Arc::new(builtin::excel()));
        grammars.insert("array_index".to_string(), Arc::new(builtin::array_index()));
        grammars.insert("native".to_string(), Arc::new(builtin::native()));
        GrammarRegistry { grammars }
    }

    pub fn register(&mut self, grammar: Grammar, name: &str) -> Result<(), GrammarError> {
        if self.grammars.contains_key(name) {
            return Err(GrammarError::AlreadyRegistered(name.to_string()));
        }
        validator::check(&grammar)?;
        self.grammars.insert(name.to_string(), Arc::new(grammar));
        debug!("Registered grammar '{}'", name);
        Ok(())
    }

    /// Register a grammar described as JSON
    pub fn register_json(&mut self, text: &str, name: &str) -> Result<(), GrammarError> {
        if self.grammars.contains_key(name) {
            return Err(GrammarError::AlreadyRegistered(name.to_string()));
        }
        let value: serde_json::Value = serde_json::from_str(text)?;
        let grammar = validator::check_value(&value)?;
        self.grammars.insert(name.to_string(), Arc::new(grammar));
        debug!("Registered grammar '{}' from JSON", name);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Arc<Grammar>, GrammarError> {
        let removed = self
            .grammars
            .remove(name)
            .ok_or_else(|| GrammarError::NotRegistered(name.to_string()))?;
        debug!("Removed grammar '{}'", name);
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Grammar>> {
        self.grammars.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.grammars.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.grammars.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Grammar>)> {
        self.grammars.iter().map(|(name, grammar)| (name.as_str(), grammar))
    }

    /// Subset of the registry whose names pass `keep`
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        let grammars = self
            .grammars
            .iter()
            .filter(|(name, _)| keep(name))
            .map(|(name, grammar)| (name.clone(), Arc::clone(grammar)))
            .collect();
        GrammarRegistry { grammars }
    }
}

static REGISTRY: Lazy<RwLock<GrammarRegistry>> =
    Lazy::new(|| RwLock::new(GrammarRegistry::with_builtins()));

/// Held by tests that add or remove process-wide notations
#[cfg(test)]
pub(crate) static TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

/// Register a grammar under `name` in the process-wide registry
pub fn register(grammar: Grammar, name: &str) -> Result<(), GrammarError> {
    REGISTRY.write().register(grammar, name)
}

pub fn register_json(text: &str, name: &str) -> Result<(), GrammarError> {
    REGISTRY.write().register_json(text, name)
}

pub fn remove(name: &str) -> Result<(), GrammarError> {
    REGISTRY.write().remove(name).map(|_| ())
}

pub fn validate(grammar: &Grammar) -> bool {
    validator::validate(grammar)
}

/// Apply `change` to a copy of the process-wide registry.
///
/// The copy replaces the registry only when `change` succeeds.
pub fn update<T, E>(
    change: impl FnOnce(&mut GrammarRegistry) -> Result<T, E>,
) -> Result<T, E> {
    let mut guard = REGISTRY.write();
    let mut staged = guard.clone();
    let out = change(&mut staged)?;
    *guard = staged;
    Ok(out)
}

pub fn list_registered_names() -> Vec<String> {
    REGISTRY.read().names()
}

pub fn get(name: &str) -> Option<Arc<Grammar>> {
    REGISTRY.read().get(name)
}

/// Consistent copy of the registry, cheap since grammars are shared
pub fn snapshot() -> GrammarRegistry {
    REGISTRY.read().clone()
}

/// Snapshot limited to the notations `indices` has labels for
pub fn snapshot_for(indices: &CellIndices) -> GrammarRegistry {
    REGISTRY.read().filtered(|name| indices.has_notation(name))
}
