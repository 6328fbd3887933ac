//! Row range slicing

use crate::planner::RowRange;
use crate::query::Queryable;

/// Pushes the grid's row range down to the source's native slice
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeSlicer;

impl RangeSlicer {
    /// Slice by the range; `None` returns the query unchanged
    pub fn slice<Q: Queryable>(query: Q, range: Option<RowRange>) -> Q {
        match range {
            Some(range) => query.slice(range.start(), range.end()),
            None => query,
        }
    }
}
