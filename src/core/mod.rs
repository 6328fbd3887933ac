//! # Core Types
//!
//! Per-request state shared by the filter compiler and the pipeline.

pub mod context;

pub use context::RequestContext;
