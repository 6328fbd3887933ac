//! Logical field path resolution
//!
//! The grid names nested fields with dots (`author.name`); the storage layer
//! traverses relations with its own delimiter (`author__name`).

/// Delimiter used by grid field names
pub const LOGICAL_DELIMITER: char = '.';

/// Resolves dotted logical paths to storage paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPathResolver {
    delimiter: String,
}

impl Default for FieldPathResolver {
    fn default() -> Self {
        Self::new("__")
    }
}

impl FieldPathResolver {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// Resolve a logical path; single-segment and empty paths resolve to themselves
    pub fn resolve(&self, logical: &str) -> String {
        logical
            .split(LOGICAL_DELIMITER)
            .collect::<Vec<_>>()
            .join(&self.delimiter)
    }
}
