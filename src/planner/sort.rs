//! Sort spec application
//!
//! Turns the grid's ordered (field, direction) list into one ordering
//! directive on resolved storage paths.

use std::collections::HashSet;

use super::ast::{OrderTerm, SortSpec};
use super::path::FieldPathResolver;
use crate::query::Queryable;

/// Applies sort specs to a query
#[derive(Debug, Clone, Default)]
pub struct SortSpecApplier {
    resolver: FieldPathResolver,
}

impl SortSpecApplier {
    pub fn new(resolver: FieldPathResolver) -> Self {
        Self { resolver }
    }

    /// Build ordering terms; the first entry on a path wins, later ones are dropped
    pub fn ordering(&self, specs: &[SortSpec]) -> Vec<OrderTerm> {
        let mut seen = HashSet::new();
        specs
            .iter()
            .map(|spec| OrderTerm {
                path: self.resolver.resolve(&spec.field),
                direction: spec.direction,
            })
            .filter(|term| seen.insert(term.path.clone()))
            .collect()
    }

    /// Apply the ordering; an empty spec list leaves the query untouched
    pub fn apply<Q: Queryable>(&self, query: Q, specs: &[SortSpec]) -> Q {
        let ordering = self.ordering(specs);
        if ordering.is_empty() {
            return query;
        }
        query.order_by(ordering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::SortDirection;
    use crate::query::MemoryQuerySet;
    use serde_json::json;

    #[test]
    fn test_ordering_preserves_precedence() {
        let applier = SortSpecApplier::default();
        let terms = applier.ordering(&[SortSpec::desc("event_type.name"), SortSpec::asc("id")]);

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].path, "event_type__name");
        assert_eq!(terms[0].direction, SortDirection::Desc);
        assert_eq!(terms[1].path, "id");
        assert_eq!(terms[1].direction, SortDirection::Asc);
    }

    #[test]
    fn test_duplicate_paths_first_wins() {
        let applier = SortSpecApplier::default();
        let terms = applier.ordering(&[
            SortSpec::asc("name"),
            SortSpec::desc("age"),
            SortSpec::desc("name"),
        ]);

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].to_string(), "name");
        assert_eq!(terms[1].to_string(), "-age");
    }

    #[test]
    fn test_apply_sorts_query() {
        let query = MemoryQuerySet::new(vec![
            json!({"id": 1, "author": {"name": "b"}}),
            json!({"id": 2, "author": {"name": "a"}}),
        ]);

        let rows = SortSpecApplier::default()
            .apply(query, &[SortSpec::asc("author.name")])
            .fetch()
            .unwrap();

        assert_eq!(rows[0]["id"], 2);
        assert_eq!(rows[1]["id"], 1);
    }

    #[test]
    fn test_empty_specs_leave_query_untouched() {
        let query = MemoryQuerySet::new(vec![json!({"id": 1})]);
        let sorted = SortSpecApplier::default().apply(query, &[]);
        assert_eq!(sorted.describe(), "SCAN");
    }
}
