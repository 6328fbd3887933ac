//! # REST API Module
//!
//! Query-parameter surface of the grid engine: request parsing, per-request
//! pagination selection, response bodies and HTTP error rendering. Routing
//! and serving belong to the host service.

pub mod errors;
pub mod handler;
pub mod pagination;
pub mod parser;
pub mod response;

pub use errors::ErrorResponse;
pub use handler::{GridHandler, ListOutcome};
pub use pagination::PaginationStrategy;
pub use parser::GridRequest;
pub use response::ListResponse;
