//! Request Context
//!
//! Per-request data handed to custom filter providers and stamped on every
//! log line. Built fresh for each request; the engine never stores it.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

/// Context carried through one pipeline execution
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for log correlation
    pub request_id: Uuid,

    /// Raw query parameters of the request
    pub params: HashMap<String, String>,

    /// Caller-defined values (user, tenant, ...) for custom filters
    pub metadata: HashMap<String, Value>,

    /// Start time for duration tracking
    started_at: Instant,
}

impl RequestContext {
    /// Create a context for the given query parameters
    pub fn new(params: HashMap<String, String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            params,
            metadata: HashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Look up a raw query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Add metadata for custom filters
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get metadata by key
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}
