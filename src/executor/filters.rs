//! Predicate evaluation against JSON records
//!
//! Storage paths traverse nested objects. An array met mid-path fans out:
//! the lookup matches if any element matches, like a to-many join.
//! Missing and null values never match a field lookup.

use std::cmp::Ordering;

use serde_json::Value;

use crate::planner::temporal::{parse_date, parse_temporal};
use crate::planner::{CaseSensitivity, FieldPredicate, Lookup, Predicate};

/// Evaluates predicates against documents
#[derive(Debug, Clone, Copy)]
pub struct PredicateFilter<'a> {
    delimiter: &'a str,
}

impl<'a> PredicateFilter<'a> {
    pub fn new(delimiter: &'a str) -> Self {
        Self { delimiter }
    }

    /// Checks if a document matches a predicate
    pub fn matches(&self, document: &Value, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::All => true,
            Predicate::Nothing => false,
            Predicate::Field(field) => self.matches_field(document, field),
            Predicate::Not(inner) => !self.matches(document, inner),
            Predicate::And(children) => children.iter().all(|p| self.matches(document, p)),
            Predicate::Or(children) => children.iter().any(|p| self.matches(document, p)),
        }
    }

    fn matches_field(&self, document: &Value, predicate: &FieldPredicate) -> bool {
        resolve_path(document, &predicate.path, self.delimiter)
            .into_iter()
            .filter(|v| !v.is_null())
            .any(|v| Self::matches_value(v, predicate))
    }

    fn matches_value(actual: &Value, predicate: &FieldPredicate) -> bool {
        let expected = &predicate.value;
        match predicate.lookup {
            Lookup::Exact => values_equal(actual, expected),
            Lookup::Lt => compare_values(actual, expected) == Some(Ordering::Less),
            Lookup::Lte => matches!(
                compare_values(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Lookup::Gt => compare_values(actual, expected) == Some(Ordering::Greater),
            Lookup::Gte => matches!(
                compare_values(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Lookup::In => expected
                .as_array()
                .map(|values| values.iter().any(|v| values_equal(actual, v)))
                .unwrap_or(false),
            Lookup::Contains | Lookup::StartsWith | Lookup::EndsWith => {
                match (actual.as_str(), expected.as_str()) {
                    (Some(haystack), Some(needle)) => {
                        text_match(predicate.lookup, haystack, needle, predicate.case)
                    }
                    _ => false,
                }
            }
            Lookup::Date => match (actual.as_str(), expected.as_str()) {
                (Some(a), Some(e)) => match (parse_date(a), parse_date(e)) {
                    (Some(a), Some(e)) => a == e,
                    _ => false,
                },
                _ => false,
            },
        }
    }
}

fn text_match(lookup: Lookup, haystack: &str, needle: &str, case: CaseSensitivity) -> bool {
    let (haystack, needle) = match case {
        CaseSensitivity::Sensitive => (haystack.to_string(), needle.to_string()),
        CaseSensitivity::Insensitive => (haystack.to_lowercase(), needle.to_lowercase()),
    };
    match lookup {
        Lookup::Contains => haystack.contains(&needle),
        Lookup::StartsWith => haystack.starts_with(&needle),
        Lookup::EndsWith => haystack.ends_with(&needle),
        _ => false,
    }
}

/// Exact equality; numbers compare by value (1 == 1.0), no other coercion
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => actual == expected,
    }
}

/// Ordering between two scalars of the same kind
///
/// Strings that both parse as dates compare chronologically.
fn compare_values(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => match (parse_temporal(a), parse_temporal(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Values reached by a storage path, fanning out over arrays mid-path
pub(crate) fn resolve_path<'v>(document: &'v Value, path: &str, delimiter: &str) -> Vec<&'v Value> {
    let mut current = vec![document];

    for segment in path.split(delimiter) {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => next.extend(map.get(segment)),
                Value::Array(items) => next.extend(
                    items
                        .iter()
                        .filter_map(|item| item.as_object().and_then(|m| m.get(segment))),
                ),
                _ => {}
            }
        }
        current = next;
    }

    current
}
