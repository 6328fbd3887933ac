//! # Grid Errors
//!
//! Error type shared by every stage of the translation pipeline.
//!
//! Client errors (4xx) describe a request the engine refuses to translate.
//! Server errors (5xx) describe a broken integration or a failing data source.
//! Data-source errors are carried through unchanged.

use axum::http::StatusCode;
use thiserror::Error;

/// Result type for grid operations
pub type GridResult<T> = Result<T, GridError>;

/// Grid translation errors
#[derive(Debug, Error)]
pub enum GridError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// `filter` or `sort` is not valid JSON or not the expected shape
    #[error("Malformed {param} parameter: {reason}")]
    MalformedFilterJson { param: String, reason: String },

    /// A condition's operand does not fit its filter type
    #[error("Malformed filter on field '{field}': {reason}")]
    MalformedFilter { field: String, reason: String },

    /// Unknown `filterType`
    #[error("Unsupported filter type '{filter_type}' on field '{field}'")]
    UnsupportedFilterType { field: String, filter_type: String },

    /// Known `filterType` with an unknown operator
    #[error("Unsupported operator '{operator}' for {filter_type} filter on field '{field}'")]
    UnsupportedFilter {
        field: String,
        filter_type: String,
        operator: String,
    },

    /// A custom filter rewrites the query and cannot sit under an OR
    #[error("Custom filter on field '{0}' cannot be combined with OR")]
    CustomFilterInDisjunction(String),

    /// Bad `startRow` / `endRow`
    #[error("Invalid row range: {0}")]
    InvalidRange(String),

    /// Bad `limit` / `offset` on a standard (non-grid) request
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// Standard page size above the configured maximum
    #[error("Limit {0} exceeds maximum {1}")]
    LimitExceeded(usize, usize),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Counts captured at different pipeline stages disagree
    #[error("Inconsistent counts: {0}")]
    InconsistentCounts(String),

    /// Engine configuration rejected
    #[error("Config error: {0}")]
    Config(String),

    /// Error raised by the data source, propagated as-is
    #[error(transparent)]
    DataSource(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl GridError {
    pub fn malformed_json(param: impl Into<String>, reason: impl Into<String>) -> Self {
        GridError::MalformedFilterJson {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_filter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        GridError::MalformedFilter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_type(field: impl Into<String>, filter_type: impl Into<String>) -> Self {
        GridError::UnsupportedFilterType {
            field: field.into(),
            filter_type: filter_type.into(),
        }
    }

    pub fn unsupported_operator(
        field: impl Into<String>,
        filter_type: impl Into<String>,
        operator: impl Into<String>,
    ) -> Self {
        GridError::UnsupportedFilter {
            field: field.into(),
            filter_type: filter_type.into(),
            operator: operator.into(),
        }
    }

    /// Wrap a data-source error without translating it
    pub fn data_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GridError::DataSource(Box::new(err))
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            GridError::MalformedFilterJson { .. } => "GRID_MALFORMED_FILTER_JSON",
            GridError::MalformedFilter { .. } => "GRID_MALFORMED_FILTER",
            GridError::UnsupportedFilterType { .. } => "GRID_UNSUPPORTED_FILTER_TYPE",
            GridError::UnsupportedFilter { .. } => "GRID_UNSUPPORTED_FILTER",
            GridError::CustomFilterInDisjunction(_) => "GRID_CUSTOM_FILTER_IN_DISJUNCTION",
            GridError::InvalidRange(_) => "GRID_INVALID_RANGE",
            GridError::InvalidQueryParam(_) => "GRID_INVALID_QUERY_PARAM",
            GridError::LimitExceeded(_, _) => "GRID_LIMIT_EXCEEDED",
            GridError::InconsistentCounts(_) => "GRID_INCONSISTENT_COUNTS",
            GridError::Config(_) => "GRID_CONFIG_ERROR",
            GridError::DataSource(_) => "GRID_DATA_SOURCE_ERROR",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            GridError::MalformedFilterJson { .. }
            | GridError::MalformedFilter { .. }
            | GridError::UnsupportedFilterType { .. }
            | GridError::UnsupportedFilter { .. }
            | GridError::CustomFilterInDisjunction(_)
            | GridError::InvalidRange(_)
            | GridError::InvalidQueryParam(_)
            | GridError::LimitExceeded(_, _) => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            GridError::InconsistentCounts(_)
            | GridError::Config(_)
            | GridError::DataSource(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the caller sent a request the engine refuses
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}
