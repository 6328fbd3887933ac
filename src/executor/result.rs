//! Result assembly for grid responses

use serde::{Deserialize, Serialize};

use crate::errors::{GridError, GridResult};
use crate::planner::RowRange;

/// Grid response body: `{rowCount, totalCount, rows}`
///
/// `row_count` is the filtered count before slicing, `total_count` the
/// unfiltered count, `rows` the requested page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResponse<R> {
    #[serde(rename = "rowCount")]
    pub row_count: usize,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    pub rows: Vec<R>,
}

impl<R> GridResponse<R> {
    /// Returns the number of rows in this page
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the page holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds grid responses and checks their count invariants
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler;

impl ResultAssembler {
    /// Assemble a response; counts that contradict each other are rejected
    pub fn assemble<R>(
        total: usize,
        filtered: usize,
        rows: Vec<R>,
        range: Option<RowRange>,
    ) -> GridResult<GridResponse<R>> {
        if filtered > total {
            return Err(GridError::InconsistentCounts(format!(
                "filtered count {} exceeds total count {}",
                filtered, total
            )));
        }

        if rows.len() > filtered {
            return Err(GridError::InconsistentCounts(format!(
                "{} rows returned but filtered count is {}",
                rows.len(),
                filtered
            )));
        }

        if let Some(range) = range {
            if rows.len() > range.len() {
                return Err(GridError::InconsistentCounts(format!(
                    "{} rows returned for a range of {}",
                    rows.len(),
                    range.len()
                )));
            }
        }

        Ok(GridResponse {
            row_count: filtered,
            total_count: total,
            rows,
        })
    }
}
