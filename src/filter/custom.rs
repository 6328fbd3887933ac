//! Custom filter providers
//!
//! A custom filter owns one logical field: when the grid filters on it the
//! default compiler is bypassed and the provider rewrites the query itself.
//! Providers are built per request and handed to the tree compiler; the
//! engine keeps no registry of its own.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::core::RequestContext;
use crate::errors::GridResult;

/// Per-request capability to filter selected fields outside the operator table
pub trait CustomPredicateProvider<Q> {
    /// Returns true if this provider owns the logical field
    fn handles(&self, field: &str) -> bool;

    /// Apply the raw wire condition to the query, returning the new query state
    fn apply(
        &self,
        field: &str,
        resolved: &str,
        condition: &Value,
        query: Q,
        ctx: &RequestContext,
    ) -> GridResult<Q>;
}

/// Provider that owns no fields
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomFilters;

impl<Q> CustomPredicateProvider<Q> for NoCustomFilters {
    fn handles(&self, _field: &str) -> bool {
        false
    }

    fn apply(
        &self,
        _field: &str,
        _resolved: &str,
        _condition: &Value,
        query: Q,
        _ctx: &RequestContext,
    ) -> GridResult<Q> {
        Ok(query)
    }
}

/// Custom filter function: `(resolved field, condition, query, context)`
pub type CustomFilterFn<Q> =
    Box<dyn Fn(&str, &Value, Q, &RequestContext) -> GridResult<Q> + Send + Sync>;

/// Closure-backed provider keyed by logical field name
pub struct CustomFilters<Q> {
    filters: HashMap<String, CustomFilterFn<Q>>,
}

impl<Q> CustomFilters<Q> {
    pub fn new() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Register a filter for a logical field, builder style
    pub fn with<F>(mut self, field: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&str, &Value, Q, &RequestContext) -> GridResult<Q> + Send + Sync + 'static,
    {
        self.register(field, filter);
        self
    }

    /// Register a filter for a logical field, replacing any previous one
    pub fn register<F>(&mut self, field: impl Into<String>, filter: F)
    where
        F: Fn(&str, &Value, Q, &RequestContext) -> GridResult<Q> + Send + Sync + 'static,
    {
        self.filters.insert(field.into(), Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<Q> Default for CustomFilters<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> fmt::Debug for CustomFilters<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<_> = self.filters.keys().collect();
        fields.sort();
        f.debug_struct("CustomFilters").field("fields", &fields).finish()
    }
}

impl<Q> CustomPredicateProvider<Q> for CustomFilters<Q> {
    fn handles(&self, field: &str) -> bool {
        self.filters.contains_key(field)
    }

    fn apply(
        &self,
        field: &str,
        resolved: &str,
        condition: &Value,
        query: Q,
        ctx: &RequestContext,
    ) -> GridResult<Q> {
        match self.filters.get(field) {
            Some(filter) => filter(resolved, condition, query, ctx),
            None => Ok(query),
        }
    }
}
