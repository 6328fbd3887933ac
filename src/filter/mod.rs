//! # Filter Translation
//!
//! Wire filter model → filter tree → predicate applied to a query.
//!
//! - `model`: wire JSON → `FilterNode`
//! - `condition`: one leaf → `Predicate`
//! - `custom`: per-request custom filter providers
//! - `tree`: recursive compilation and application

mod condition;
mod custom;
mod model;
mod tree;

pub use condition::ConditionCompiler;
pub use custom::{CustomFilterFn, CustomFilters, CustomPredicateProvider, NoCustomFilters};
pub use model::{Combination, CombineOp, FilterNode, FilterType, LeafCondition};
pub use tree::FilterTreeCompiler;
