//! Query planning primitives
//!
//! Everything here is pure: predicates, ordering terms and row ranges are
//! built from the request without touching the data source.
//!
//! - `ast`: predicate combinator form, sort and range types
//! - `path`: dotted logical paths → storage paths
//! - `sort`: sort spec → ordering directive
//! - `temporal`: date operand parsing

mod ast;
mod path;
mod sort;
pub mod temporal;

pub use ast::{
    CaseSensitivity, FieldPredicate, Lookup, OrderTerm, Predicate, RowRange, SortDirection,
    SortSpec,
};
pub use path::{FieldPathResolver, LOGICAL_DELIMITER};
pub use sort::SortSpecApplier;
