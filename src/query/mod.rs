//! Abstract queryable collection
//!
//! The engine threads one query handle through the pipeline. Every
//! transform consumes the handle and returns the next one. Transforms are
//! lazy; only `count` and `fetch` touch the data source.

mod memory;

pub use memory::{MemoryError, MemoryQuerySet};

use crate::planner::{OrderTerm, Predicate};

/// A lazily evaluated, queryset-like collection
pub trait Queryable: Sized {
    /// Materialized row type
    type Record;

    /// Data-source error, propagated unchanged by the engine
    type Error: std::error::Error + Send + Sync + 'static;

    /// Keep records matching the predicate
    fn filter(self, predicate: Predicate) -> Self;

    /// Drop records matching the predicate
    fn exclude(self, predicate: Predicate) -> Self;

    /// Replace the ordering; earlier terms take precedence
    fn order_by(self, ordering: Vec<OrderTerm>) -> Self;

    /// Collapse duplicate records produced by fan-out joins
    fn distinct(self) -> Self;

    /// Zero-based slice, `end` exclusive, pushed to the source's limit/offset
    fn slice(self, start: usize, end: usize) -> Self;

    /// Count the records the query currently selects
    fn count(&self) -> Result<usize, Self::Error>;

    /// Materialize the selected records
    fn fetch(self) -> Result<Vec<Self::Record>, Self::Error>;
}
