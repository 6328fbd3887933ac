//! gridquery - data-grid request translation
//!
//! Translates a server-side row model request (filter tree, sort list, row
//! range) into operations on a queryset-like source and assembles the
//! `{rowCount, totalCount, rows}` response.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod executor;
pub mod filter;
pub mod observability;
pub mod planner;
pub mod query;
pub mod rest_api;

pub use config::EngineConfig;
pub use core::RequestContext;
pub use errors::{GridError, GridResult};
pub use executor::{GridExecutor, GridResponse, PreparedQuery};
pub use filter::{CustomFilters, CustomPredicateProvider, FilterNode, NoCustomFilters};
pub use query::{MemoryQuerySet, Queryable};
pub use rest_api::{GridHandler, GridRequest, PaginationStrategy};
