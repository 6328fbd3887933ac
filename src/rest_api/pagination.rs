//! # Pagination Selection
//!
//! Chooses how one request is paginated. Grid requests page by row range;
//! everything else pages by `limit` / `offset`. The choice is a value for
//! the current request only and never outlives it.

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::errors::{GridError, GridResult};
use crate::planner::RowRange;

use super::parser::GridRequest;

/// Pagination for one request
#[derive(Debug, Clone, PartialEq)]
pub enum PaginationStrategy {
    /// Grid request, paged by its row range
    Grid(GridRequest),
    /// Standard limit/offset page
    Standard { limit: usize, offset: usize },
}

impl PaginationStrategy {
    /// Select the strategy for the request's parameters
    pub fn select(params: &HashMap<String, String>, config: &EngineConfig) -> GridResult<Self> {
        if let Some(request) = GridRequest::parse(params, config)? {
            return Ok(PaginationStrategy::Grid(request));
        }
        Self::standard(params, config)
    }

    /// Standard limit/offset pagination from `limit` and `offset`
    pub fn standard(params: &HashMap<String, String>, config: &EngineConfig) -> GridResult<Self> {
        let limit = match params.get("limit") {
            Some(value) => parse_limit(value)?,
            None => config.default_limit,
        };

        if limit > config.max_limit {
            return Err(GridError::LimitExceeded(limit, config.max_limit));
        }

        let offset = match params.get("offset") {
            Some(value) => parse_offset(value)?,
            None => 0,
        };

        Ok(PaginationStrategy::Standard { limit, offset })
    }

    pub fn is_grid(&self) -> bool {
        matches!(self, PaginationStrategy::Grid(_))
    }

    /// Grid row range; `None` for standard pages and unbounded grid requests
    pub fn range(&self) -> Option<RowRange> {
        match self {
            PaginationStrategy::Grid(request) => request.range,
            PaginationStrategy::Standard { .. } => None,
        }
    }
}

/// Parse limit parameter
fn parse_limit(value: &str) -> GridResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| GridError::InvalidQueryParam(format!("Invalid limit: {}", value)))
}

/// Parse offset parameter
fn parse_offset(value: &str) -> GridResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| GridError::InvalidQueryParam(format!("Invalid offset: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn select(pairs: &[(&str, &str)]) -> GridResult<PaginationStrategy> {
        PaginationStrategy::select(&params(pairs), &EngineConfig::default())
    }

    #[test]
    fn test_grid_selected_per_request() {
        let grid = select(&[("startRow", "0"), ("endRow", "50")]).unwrap();
        assert!(grid.is_grid());
        assert_eq!(grid.range(), Some(RowRange::new(0, 50).unwrap()));

        // The next request on the same config is unaffected
        let standard = select(&[]).unwrap();
        assert_eq!(
            standard,
            PaginationStrategy::Standard {
                limit: 100,
                offset: 0
            }
        );
    }

    #[test]
    fn test_format_without_range_is_grid() {
        let strategy = select(&[("format", "aggrid")]).unwrap();
        assert_eq!(strategy, PaginationStrategy::Grid(GridRequest::default()));
        assert_eq!(strategy.range(), None);
    }

    #[test]
    fn test_standard_limit_offset() {
        let strategy = select(&[("limit", "20"), ("offset", "40")]).unwrap();
        assert_eq!(
            strategy,
            PaginationStrategy::Standard {
                limit: 20,
                offset: 40
            }
        );
    }

    #[test]
    fn test_limit_exceeded() {
        assert!(matches!(
            select(&[("limit", "5000")]),
            Err(GridError::LimitExceeded(5000, 1000))
        ));
    }

    #[test]
    fn test_invalid_limit() {
        assert!(matches!(
            select(&[("limit", "ten")]),
            Err(GridError::InvalidQueryParam(_))
        ));
        assert!(matches!(
            select(&[("offset", "-1")]),
            Err(GridError::InvalidQueryParam(_))
        ));
    }
}
