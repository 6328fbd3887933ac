//! Grid execution subsystem
//!
//! Turns a parsed grid request into a `{rowCount, totalCount, rows}`
//! response, and provides the in-memory evaluation used by `MemoryQuerySet`.
//!
//! # Execution Flow (strict order)
//!
//! 1. Count the base collection
//! 2. Filter (custom filters first, then the default predicate)
//! 3. Count the filtered collection
//! 4. Order
//! 5. Slice by row range
//! 6. Fetch and assemble

mod executor;
mod filters;
mod result;
mod slicer;
mod sorter;

pub use executor::{GridExecutor, PreparedQuery};
pub use filters::PredicateFilter;
pub use result::{GridResponse, ResultAssembler};
pub use slicer::RangeSlicer;
pub use sorter::ResultSorter;
