//! Structural validation of grammar tables.
//!
//! A candidate is compared against the serialised `array_index` table: every
//! path of the reference must exist in the candidate with the same JSON kind,
//! and the candidate may not carry keys the reference does not know. The
//! check is structural only; a well-typed but wrong rule passes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

use super::{builtin, Grammar};
use crate::error::GrammarError;

static REFERENCE_SHAPE: Lazy<Value> =
    Lazy::new(|| serde_json::to_value(builtin::array_index()).unwrap_or_default());

/// Non-throwing probe
pub fn validate(grammar: &Grammar) -> bool {
    check(grammar).is_ok()
}

/// Validate a typed grammar, reporting the first failing path
pub fn check(grammar: &Grammar) -> Result<(), GrammarError> {
    let value = serde_json::to_value(grammar)?;
    check_shape(&REFERENCE_SHAPE, &value, "")?;
    check_rules(grammar)
}

/// Validate raw JSON and turn it into a grammar
pub fn check_value(value: &Value) -> Result<Grammar, GrammarError> {
    check_shape(&REFERENCE_SHAPE, value, "")?;
    let grammar: Grammar = serde_json::from_value(value.clone())?;
    check_rules(&grammar)?;
    Ok(grammar)
}

fn invalid(path: &str, reason: impl Into<String>) -> GrammarError {
    GrammarError::Invalid {
        path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
        reason: reason.into(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn check_shape(reference: &Value, candidate: &Value, path: &str) -> Result<(), GrammarError> {
    if kind(reference) != kind(candidate) {
        return Err(invalid(
            path,
            format!("expected {}, found {}", kind(reference), kind(candidate)),
        ));
    }

    match (reference, candidate) {
        (Value::Object(expected), Value::Object(given)) => {
            for (key, expected_value) in expected {
                let key_path = child_path(path, key);
                match given.get(key) {
                    Some(given_value) => check_shape(expected_value, given_value, &key_path)?,
                    None => return Err(invalid(&key_path, "missing")),
                }
            }
            if let Some(extra) = given.keys().find(|key| !expected.contains_key(*key)) {
                return Err(invalid(&child_path(path, extra), "unexpected key"));
            }
            Ok(())
        }
        (Value::Array(expected), Value::Array(given)) => match expected.first() {
            Some(element) => given.iter().enumerate().try_for_each(|(i, item)| {
                check_shape(element, item, &format!("{}[{}]", path, i))
            }),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn check_permutation<T>(path: &str, order: &[T], expected: usize) -> Result<(), GrammarError>
where
    T: std::hash::Hash + Eq,
{
    let distinct: HashSet<&T> = order.iter().collect();
    if order.len() != expected || distinct.len() != expected {
        return Err(invalid(
            path,
            format!("must name each of the {} parts exactly once", expected),
        ));
    }
    Ok(())
}

fn check_rules(grammar: &Grammar) -> Result<(), GrammarError> {
    for (path, pattern) in [
        ("rows.name_regexp", &grammar.rows.name_regexp),
        ("cols.name_regexp", &grammar.cols.name_regexp),
    ] {
        Regex::new(pattern).map_err(|e| invalid(path, e.to_string()))?;
    }
    check_permutation("cells.offset.order", &grammar.cells.offset.order, 4)?;
    check_permutation("conditional.order", &grammar.conditional.order, 3)?;
    grammar
        .linear_interpolation
        .check()
        .map_err(|reason| invalid("linear_interpolation.word", reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{excel, native, ConditionalPart};
    use serde_json::json;

    fn path_of(err: GrammarError) -> String {
        match err {
            GrammarError::Invalid { path, .. } => path,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_builtins_validate() {
        assert!(validate(&builtin::array_index()));
        assert!(validate(&excel()));
        assert!(validate(&native()));
    }

    #[test]
    fn test_missing_key_is_reported_with_path() {
        let mut value = serde_json::to_value(excel()).unwrap();
        value["cells"]["reference"]
            .as_object_mut()
            .unwrap()
            .remove("row_first");

        let err = check_value(&value).unwrap_err();
        assert_eq!(path_of(err), "cells.reference.row_first");
    }

    #[test]
    fn test_wrong_leaf_type() {
        let mut value = serde_json::to_value(excel()).unwrap();
        value["operations"]["add"]["separator"] = json!(1);

        let err = check_value(&value).unwrap_err();
        assert_eq!(path_of(err), "operations.add.separator");
    }

    #[test]
    fn test_unexpected_key() {
        let mut value = serde_json::to_value(native()).unwrap();
        value["brackets"]["sufix"] = json!(")");

        let err = check_value(&value).unwrap_err();
        assert_eq!(path_of(err), "brackets.sufix");
    }

    #[test]
    fn test_order_element_kind() {
        let mut value = serde_json::to_value(excel()).unwrap();
        value["conditional"]["order"][1] = json!(true);

        let err = check_value(&value).unwrap_err();
        assert_eq!(path_of(err), "conditional.order[1]");
    }

    #[test]
    fn test_order_must_be_permutation() {
        let mut grammar = excel();
        grammar.conditional.order = vec![
            ConditionalPart::Condition,
            ConditionalPart::Condition,
            ConditionalPart::Alternative,
        ];

        assert!(!validate(&grammar));
        assert_eq!(path_of(check(&grammar).unwrap_err()), "conditional.order");
    }

    #[test]
    fn test_bad_regexp() {
        let mut grammar = excel();
        grammar.rows.name_regexp = "[0-9".to_string();

        assert_eq!(path_of(check(&grammar).unwrap_err()), "rows.name_regexp");
    }

    #[test]
    fn test_interpolation_placeholders() {
        let mut value = serde_json::to_value(excel()).unwrap();
        value["linear_interpolation"]["word"] = json!("{x}+{slope}");
        assert_eq!(path_of(check_value(&value).unwrap_err()), "linear_interpolation.word");

        value["linear_interpolation"]
            .as_object_mut()
            .unwrap()
            .remove("word");
        assert_eq!(path_of(check_value(&value).unwrap_err()), "linear_interpolation.word");
    }

    #[test]
    fn test_unknown_order_part_fails_to_parse() {
        let mut value = serde_json::to_value(excel()).unwrap();
        value["conditional"]["order"][0] = json!("otherwise");

        assert!(matches!(check_value(&value), Err(GrammarError::Parse(_))));
    }

    #[test]
    fn test_check_value_round_trips() {
        let value = serde_json::to_value(native()).unwrap();
        assert_eq!(check_value(&value).unwrap(), native());
    }
}
