//! Result sorting for the memory source
//!
//! Multi-key, stable, deterministic.

use std::cmp::Ordering;

use serde_json::Value;

use super::filters::resolve_path;
use crate::planner::temporal::parse_temporal;
use crate::planner::{OrderTerm, SortDirection};

/// Sorts records by resolved storage paths
#[derive(Debug, Clone, Copy)]
pub struct ResultSorter<'a> {
    delimiter: &'a str,
}

impl<'a> ResultSorter<'a> {
    pub fn new(delimiter: &'a str) -> Self {
        Self { delimiter }
    }

    /// Sorts records; earlier terms take precedence, ties keep input order
    pub fn sort(&self, records: &mut [&Value], terms: &[OrderTerm]) {
        if terms.is_empty() {
            return;
        }

        records.sort_by(|a, b| {
            for term in terms {
                let a_val = resolve_path(a, &term.path, self.delimiter).into_iter().next();
                let b_val = resolve_path(b, &term.path, self.delimiter).into_iter().next();

                let ordering = Self::compare_values(a_val, b_val);
                let ordering = match term.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };

                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string
    /// - For same types, natural ordering; date strings chronologically
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);

                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                    (Value::Number(a_n), Value::Number(b_n)) => {
                        let a_f = a_n.as_f64().unwrap_or(0.0);
                        let b_f = b_n.as_f64().unwrap_or(0.0);
                        a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(a_s), Value::String(b_s)) => {
                        // Dates order chronologically and ahead of plain strings
                        let a_t = parse_temporal(a_s);
                        let b_t = parse_temporal(b_s);
                        (a_t.is_none(), a_t, a_s).cmp(&(b_t.is_none(), b_t, b_s))
                    }
                    _ => Ordering::Equal,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn term(path: &str, direction: SortDirection) -> OrderTerm {
        OrderTerm {
            path: path.to_string(),
            direction,
        }
    }

    fn ids<'a>(rows: &[&'a Value]) -> Vec<&'a str> {
        rows.iter().map(|r| r["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let docs = vec![
            json!({"id": "c", "age": 30}),
            json!({"id": "a", "age": 20}),
            json!({"id": "b", "age": 25}),
        ];
        let sorter = ResultSorter::new("__");

        let mut rows: Vec<&Value> = docs.iter().collect();
        sorter.sort(&mut rows, &[term("age", SortDirection::Asc)]);
        assert_eq!(ids(&rows), vec!["a", "b", "c"]);

        sorter.sort(&mut rows, &[term("age", SortDirection::Desc)]);
        assert_eq!(ids(&rows), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_stable() {
        let docs = vec![
            json!({"id": "a", "age": 25}),
            json!({"id": "b", "age": 25}),
            json!({"id": "c", "age": 25}),
        ];
        let mut rows: Vec<&Value> = docs.iter().collect();

        ResultSorter::new("__").sort(&mut rows, &[term("age", SortDirection::Desc)]);

        assert_eq!(ids(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_secondary_key_breaks_ties() {
        let docs = vec![
            json!({"id": "1", "team": {"name": "red"}, "age": 30}),
            json!({"id": "2", "team": {"name": "blue"}, "age": 40}),
            json!({"id": "3", "team": {"name": "red"}, "age": 20}),
        ];
        let mut rows: Vec<&Value> = docs.iter().collect();

        ResultSorter::new("__").sort(
            &mut rows,
            &[term("team__name", SortDirection::Desc), term("age", SortDirection::Asc)],
        );

        assert_eq!(ids(&rows), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_missing_sorts_first() {
        let docs = vec![json!({"id": "x", "age": 1}), json!({"id": "y"})];
        let mut rows: Vec<&Value> = docs.iter().collect();

        ResultSorter::new("__").sort(&mut rows, &[term("age", SortDirection::Asc)]);

        assert_eq!(ids(&rows), vec!["y", "x"]);
    }

    #[test]
    fn test_date_strings_sort_chronologically() {
        let docs = vec![
            json!({"id": "late", "at": "2023-01-15 23:00:00"}),
            json!({"id": "plain", "at": "pending"}),
            json!({"id": "early", "at": "2023-01-15T01:00:00"}),
        ];
        let mut rows: Vec<&Value> = docs.iter().collect();

        ResultSorter::new("__").sort(&mut rows, &[term("at", SortDirection::Asc)]);

        assert_eq!(ids(&rows), vec!["early", "late", "plain"]);
    }
}
