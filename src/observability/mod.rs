//! Observability for the translation pipeline
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed pipeline events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on translation
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use gridquery::observability::{Event, Logger, Severity};
//!
//! let logger = Logger::new(Some(Severity::Info));
//! logger.info(Event::FilterApplied, &[("filtered_count", 42.into())]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
