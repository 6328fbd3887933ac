//! # REST API Errors
//!
//! HTTP rendering of `GridError` for host services.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::GridError;

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub error_code: String,
}

impl From<&GridError> for ErrorResponse {
    fn from(err: &GridError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code().as_u16(),
            error_code: err.code().to_string(),
        }
    }
}

impl IntoResponse for GridError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
