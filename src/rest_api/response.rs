//! # Response Formatting
//!
//! Response bodies for the two list paths: the grid's
//! `{rowCount, totalCount, rows}` and the standard limit/offset page.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::executor::GridResponse;

/// Standard list response with limit/offset pagination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
    pub count: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, limit: usize, offset: usize) -> Self {
        let count = data.len();
        Self {
            data,
            count,
            limit,
            offset,
        }
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl<R: Serialize> IntoResponse for GridResponse<R> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
