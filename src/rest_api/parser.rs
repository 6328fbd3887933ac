//! # Grid Request Parser
//!
//! Parses the grid's query parameters into a structured request.
//!
//! | Parameter  | Shape                                  |
//! |------------|----------------------------------------|
//! | `format`   | activation marker (`aggrid`)           |
//! | `filter`   | JSON object keyed by field             |
//! | `sort`     | JSON array of `{colId, sort}`          |
//! | `startRow` | integer, inclusive                     |
//! | `endRow`   | integer, exclusive                     |

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::errors::{GridError, GridResult};
use crate::filter::FilterNode;
use crate::planner::{RowRange, SortDirection, SortSpec};

/// Parameters whose presence alone activates the grid path
const GRID_PARAMS: &[&str] = &["filter", "sort", "startRow", "endRow"];

/// Parsed grid request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridRequest {
    /// Filter tree (None = no filtering)
    pub filter: Option<FilterNode>,

    /// Sort entries in precedence order
    pub sort: Vec<SortSpec>,

    /// Requested rows (None = all rows)
    pub range: Option<RowRange>,
}

#[derive(Debug, Deserialize)]
struct SortEntry {
    #[serde(rename = "colId")]
    col_id: String,
    #[serde(default)]
    sort: Option<String>,
}

impl GridRequest {
    /// Whether the parameters address the grid rather than a standard list
    pub fn is_grid_request(params: &HashMap<String, String>, config: &EngineConfig) -> bool {
        let format_matches = params
            .get("format")
            .map(|f| f.eq_ignore_ascii_case(&config.activation_format))
            .unwrap_or(false);

        format_matches || GRID_PARAMS.iter().any(|p| params.contains_key(*p))
    }

    /// Parse query parameters; `None` when the request is not a grid request
    pub fn parse(
        params: &HashMap<String, String>,
        config: &EngineConfig,
    ) -> GridResult<Option<Self>> {
        if !Self::is_grid_request(params, config) {
            return Ok(None);
        }

        let filter = match non_empty(params, "filter") {
            Some(raw) => {
                let model: Value = serde_json::from_str(raw)
                    .map_err(|e| GridError::malformed_json("filter", e.to_string()))?;
                FilterNode::from_model(&model)?
            }
            None => None,
        };

        let sort = match non_empty(params, "sort") {
            Some(raw) => parse_sort(raw)?,
            None => Vec::new(),
        };

        let start = parse_row(params, "startRow")?;
        let end = parse_row(params, "endRow")?;
        let range = match (start, end) {
            (Some(start), Some(end)) => Some(RowRange::new(start, end)?),
            _ => None,
        };

        Ok(Some(GridRequest {
            filter,
            sort,
            range,
        }))
    }
}

fn non_empty<'p>(params: &'p HashMap<String, String>, key: &str) -> Option<&'p str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Parse the sort model; a missing direction sorts ascending
fn parse_sort(raw: &str) -> GridResult<Vec<SortSpec>> {
    let entries: Vec<SortEntry> =
        serde_json::from_str(raw).map_err(|e| GridError::malformed_json("sort", e.to_string()))?;

    entries
        .into_iter()
        .map(|entry| {
            let direction = match entry.sort.as_deref().map(str::to_ascii_lowercase).as_deref() {
                None | Some("") | Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                Some(other) => {
                    return Err(GridError::malformed_json(
                        "sort",
                        format!("invalid direction '{}' for '{}'", other, entry.col_id),
                    ))
                }
            };
            Ok(SortSpec {
                field: entry.col_id,
                direction,
            })
        })
        .collect()
}

/// Parse a row bound
fn parse_row(params: &HashMap<String, String>, key: &str) -> GridResult<Option<i64>> {
    match non_empty(params, key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| GridError::InvalidRange(format!("Invalid {}: {}", key, value))),
        None => Ok(None),
    }
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

    fn parse(pairs: &[(&str, &str)]) -> GridResult<Option<GridRequest>> {
        GridRequest::parse(&params(pairs), &EngineConfig::default())
    }

    #[test]
    fn test_activation() {
        let config = EngineConfig::default();
        assert!(GridRequest::is_grid_request(&params(&[("format", "AGGRID")]), &config));
        assert!(GridRequest::is_grid_request(&params(&[("startRow", "0")]), &config));
        assert!(GridRequest::is_grid_request(&params(&[("sort", "")]), &config));
        assert!(!GridRequest::is_grid_request(&params(&[("format", "json")]), &config));
        assert!(!GridRequest::is_grid_request(&params(&[("limit", "10")]), &config));
    }

    #[test]
    fn test_non_grid_request_is_none() {
        assert!(parse(&[("limit", "10")]).unwrap().is_none());
    }

    #[test]
    fn test_format_only_is_empty_request() {
        let request = parse(&[("format", "aggrid")]).unwrap().unwrap();
        assert_eq!(request, GridRequest::default());
    }

    #[test]
    fn test_full_request() {
        let request = parse(&[
            ("format", "aggrid"),
            ("filter", r#"{"name":{"filterType":"text","type":"contains","filter":"ex"}}"#),
            ("sort", r#"[{"colId":"name","sort":"asc"},{"colId":"age","sort":"desc"}]"#),
            ("startRow", "0"),
            ("endRow", "10"),
        ])
        .unwrap()
        .unwrap();

        assert!(request.filter.is_some());
        assert_eq!(request.sort, vec![SortSpec::asc("name"), SortSpec::desc("age")]);
        assert_eq!(request.range, Some(RowRange::new(0, 10).unwrap()));
    }

    #[test]
    fn test_invalid_filter_json_fails() {
        let err = parse(&[("filter", "{not json")]).unwrap_err();
        assert!(matches!(err, GridError::MalformedFilterJson { ref param, .. } if param == "filter"));
    }

    #[test]
    fn test_sort_shapes() {
        let request = parse(&[("sort", r#"[{"colId":"name"}]"#)]).unwrap().unwrap();
        assert_eq!(request.sort, vec![SortSpec::asc("name")]);

        let err = parse(&[("sort", r#"[{"sort":"asc"}]"#)]).unwrap_err();
        assert!(matches!(err, GridError::MalformedFilterJson { .. }));

        let err = parse(&[("sort", r#"[{"colId":"name","sort":"up"}]"#)]).unwrap_err();
        assert!(err.to_string().contains("up"));

        let err = parse(&[("sort", r#"{"colId":"name"}"#)]).unwrap_err();
        assert!(matches!(err, GridError::MalformedFilterJson { .. }));
    }

    #[test]
    fn test_range_validation() {
        assert!(matches!(
            parse(&[("startRow", "abc"), ("endRow", "10")]),
            Err(GridError::InvalidRange(_))
        ));
        assert!(matches!(
            parse(&[("startRow", "-1"), ("endRow", "10")]),
            Err(GridError::InvalidRange(_))
        ));
        assert!(matches!(
            parse(&[("startRow", "10"), ("endRow", "10")]),
            Err(GridError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_half_range_is_no_range() {
        let request = parse(&[("startRow", "10")]).unwrap().unwrap();
        assert!(request.range.is_none());
    }

    #[test]
    fn test_empty_filter_string_is_absent() {
        let request = parse(&[("format", "aggrid"), ("filter", "")]).unwrap().unwrap();
        assert!(request.filter.is_none());
    }

    #[test]
    fn test_custom_activation_format() {
        let config = EngineConfig {
            activation_format: "grid".to_string(),
            ..EngineConfig::default()
        };
        assert!(GridRequest::parse(&params(&[("format", "grid")]), &config)
            .unwrap()
            .is_some());
        assert!(GridRequest::parse(&params(&[("format", "aggrid")]), &config)
            .unwrap()
            .is_none());
    }
}
