//! In-memory queryset over JSON records
//!
//! Records are an immutable shared snapshot. Transforms only append stages;
//! stages are evaluated in order on `count` / `fetch`, so a handle can be
//! built up cheaply and evaluated once.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::executor::{PredicateFilter, ResultSorter};
use crate::planner::{OrderTerm, Predicate};

use super::Queryable;

/// Errors raised while evaluating a memory queryset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Storage path with an empty segment
    #[error("Cannot resolve path '{0}': empty segment")]
    InvalidPath(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Filter(Predicate),
    Exclude(Predicate),
    OrderBy(Vec<OrderTerm>),
    Distinct,
    Slice { start: usize, end: usize },
}

/// Lazy queryset over a shared record snapshot
#[derive(Debug, Clone)]
pub struct MemoryQuerySet {
    records: Arc<Vec<Value>>,
    delimiter: String,
    stages: Vec<Stage>,
    evaluations: Arc<AtomicUsize>,
}

impl MemoryQuerySet {
    /// Create a queryset over owned records
    pub fn new(records: Vec<Value>) -> Self {
        Self::from_shared(Arc::new(records))
    }

    /// Create a queryset over an existing snapshot
    pub fn from_shared(records: Arc<Vec<Value>>) -> Self {
        Self {
            records,
            delimiter: "__".to_string(),
            stages: Vec::new(),
            evaluations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the relationship-traversal delimiter used in storage paths
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Number of times this queryset family hit the records
    ///
    /// Shared by every handle derived from the same root.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }

    /// Human-readable description of the pending stages
    pub fn describe(&self) -> String {
        let mut out = String::from("SCAN");
        for stage in &self.stages {
            let _ = match stage {
                Stage::Filter(p) => write!(out, " | FILTER {}", p),
                Stage::Exclude(p) => write!(out, " | EXCLUDE {}", p),
                Stage::OrderBy(terms) => {
                    let terms: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
                    write!(out, " | ORDER BY {}", terms.join(", "))
                }
                Stage::Distinct => write!(out, " | DISTINCT"),
                Stage::Slice { start, end } => write!(out, " | SLICE [{}:{}]", start, end),
            };
        }
        out
    }

    fn push(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    fn validate_path(&self, path: &str) -> Result<(), MemoryError> {
        if path.is_empty() || path.split(self.delimiter.as_str()).any(str::is_empty) {
            return Err(MemoryError::InvalidPath(path.to_string()));
        }
        Ok(())
    }

    fn validate_predicate(&self, predicate: &Predicate) -> Result<(), MemoryError> {
        predicate
            .paths()
            .into_iter()
            .try_for_each(|path| self.validate_path(path))
    }

    fn evaluate(&self) -> Result<Vec<&Value>, MemoryError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);

        let mut rows: Vec<&Value> = self.records.iter().collect();

        for stage in &self.stages {
            match stage {
                Stage::Filter(predicate) => {
                    self.validate_predicate(predicate)?;
                    let filter = PredicateFilter::new(&self.delimiter);
                    rows.retain(|doc| filter.matches(doc, predicate));
                }
                Stage::Exclude(predicate) => {
                    self.validate_predicate(predicate)?;
                    let filter = PredicateFilter::new(&self.delimiter);
                    rows.retain(|doc| !filter.matches(doc, predicate));
                }
                Stage::OrderBy(terms) => {
                    for term in terms {
                        self.validate_path(&term.path)?;
                    }
                    ResultSorter::new(&self.delimiter).sort(&mut rows, terms);
                }
                Stage::Distinct => {
                    // Same record reached twice, not equal content
                    let mut seen = HashSet::new();
                    rows.retain(|doc| seen.insert(*doc as *const Value));
                }
                Stage::Slice { start, end } => {
                    let len = rows.len();
                    let end = (*end).min(len);
                    let start = (*start).min(end);
                    rows = rows[start..end].to_vec();
                }
            }
        }

        Ok(rows)
    }
}

impl Queryable for MemoryQuerySet {
    type Record = Value;
    type Error = MemoryError;

    fn filter(self, predicate: Predicate) -> Self {
        self.push(Stage::Filter(predicate))
    }

    fn exclude(self, predicate: Predicate) -> Self {
        self.push(Stage::Exclude(predicate))
    }

    fn order_by(self, ordering: Vec<OrderTerm>) -> Self {
        self.push(Stage::OrderBy(ordering))
    }

    fn distinct(self) -> Self {
        self.push(Stage::Distinct)
    }

    fn slice(self, start: usize, end: usize) -> Self {
        self.push(Stage::Slice { start, end })
    }

    fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.evaluate()?.len())
    }

    fn fetch(self) -> Result<Vec<Value>, MemoryError> {
        Ok(self.evaluate()?.into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{Lookup, SortDirection};
    use serde_json::json;

    fn people() -> MemoryQuerySet {
        MemoryQuerySet::new(vec![
            json!({"id": 1, "name": "Alice", "age": 30, "team": {"name": "red"}}),
            json!({"id": 2, "name": "Bob", "age": 25, "team": {"name": "blue"}}),
            json!({"id": 3, "name": "Carol", "age": 35, "team": {"name": "red"}}),
        ])
    }

    fn ids(rows: &[Value]) -> Vec<i64> {
        rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_transforms_are_lazy() {
        let qs = people()
            .filter(Predicate::field("age", Lookup::Gte, json!(30)))
            .order_by(vec![OrderTerm {
                path: "age".to_string(),
                direction: SortDirection::Desc,
            }]);
        assert_eq!(qs.evaluations(), 0);

        assert_eq!(qs.count().unwrap(), 2);
        assert_eq!(qs.evaluations(), 1);
        assert_eq!(ids(&qs.fetch().unwrap()), vec![3, 1]);
    }

    #[test]
    fn test_nested_path_filter() {
        let rows = people()
            .filter(Predicate::exact("team__name", json!("red")))
            .fetch()
            .unwrap();
        assert_eq!(ids(&rows), vec![1, 3]);
    }

    #[test]
    fn test_exclude() {
        let rows = people()
            .exclude(Predicate::exact("name", json!("Bob")))
            .fetch()
            .unwrap();
        assert_eq!(ids(&rows), vec![1, 3]);
    }

    #[test]
    fn test_slice_clamps_to_len() {
        assert_eq!(ids(&people().slice(1, 10).fetch().unwrap()), vec![2, 3]);
        assert!(people().slice(5, 10).fetch().unwrap().is_empty());
    }

    #[test]
    fn test_distinct_keeps_records_with_equal_content() {
        let qs = MemoryQuerySet::new(vec![
            json!({"name": "Alex", "qty": 1}),
            json!({"name": "Alex", "qty": 1}),
            json!({"name": "Bob", "qty": 2}),
        ]);
        assert_eq!(qs.clone().distinct().count().unwrap(), 3);

        let rows = qs
            .filter(Predicate::exact("name", json!("Alex")))
            .distinct()
            .fetch()
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_invalid_path_is_source_error() {
        let err = people()
            .filter(Predicate::exact("team____name", json!("red")))
            .count()
            .unwrap_err();
        assert_eq!(err, MemoryError::InvalidPath("team____name".to_string()));
    }

    #[test]
    fn test_custom_delimiter() {
        let rows = people()
            .with_delimiter("/")
            .filter(Predicate::exact("team/name", json!("blue")))
            .fetch()
            .unwrap();
        assert_eq!(ids(&rows), vec![2]);
    }

    #[test]
    fn test_describe() {
        let qs = people()
            .filter(Predicate::exact("name", json!("Bob")))
            .distinct()
            .slice(0, 10);
        assert_eq!(
            qs.describe(),
            r#"SCAN | FILTER name__exact="Bob" | DISTINCT | SLICE [0:10]"#
        );
    }
}
