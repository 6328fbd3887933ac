//! Observable events of the translation pipeline
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events, one per pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Engine configuration loaded
    ConfigLoaded,
    /// Record snapshot loaded (CLI)
    DataLoaded,

    // Request
    /// Wire request parsed into a grid request
    GridRequestParsed,
    /// Request served with standard limit/offset pagination
    StandardPageServed,
    /// Request rejected or failed
    RequestFailed,

    // Pipeline stages
    /// Base collection counted
    TotalCounted,
    /// Caller-supplied custom filter applied
    CustomFilterApplied,
    /// Default filter predicate applied
    FilterApplied,
    /// Ordering applied
    SortApplied,
    /// Row range applied
    RangeApplied,
    /// Response assembled
    ResultAssembled,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DataLoaded => "DATA_LOADED",
            Event::GridRequestParsed => "GRID_REQUEST_PARSED",
            Event::StandardPageServed => "STANDARD_PAGE_SERVED",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::TotalCounted => "TOTAL_COUNTED",
            Event::CustomFilterApplied => "CUSTOM_FILTER_APPLIED",
            Event::FilterApplied => "FILTER_APPLIED",
            Event::SortApplied => "SORT_APPLIED",
            Event::RangeApplied => "RANGE_APPLIED",
            Event::ResultAssembled => "RESULT_ASSEMBLED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
