//! Grid pipeline executor
//!
//! Runs one grid request against a queryable source.
//!
//! Execution flow (strict order):
//! 1. Count the base collection (`totalCount`)
//! 2. Apply custom filters, then the default filter predicate
//! 3. Count the filtered collection (`rowCount`)
//! 4. Apply the ordering
//! 5. Slice by the row range
//! 6. Fetch and assemble the response
//!
//! Steps 1 to 4 are `prepare`; a prepared query is never sliced, so a
//! caller can paginate it by other means.

use serde_json::Value;

use crate::config::EngineConfig;
use crate::core::RequestContext;
use crate::errors::{GridError, GridResult};
use crate::filter::{CustomPredicateProvider, FilterTreeCompiler};
use crate::observability::{Event, Logger};
use crate::planner::{FieldPathResolver, RowRange, SortSpecApplier};
use crate::query::Queryable;
use crate::rest_api::GridRequest;

use super::result::{GridResponse, ResultAssembler};
use super::slicer::RangeSlicer;

/// Filtered and ordered query with its counts
#[derive(Debug, Clone)]
pub struct PreparedQuery<Q> {
    /// Query after filtering and ordering, not sliced
    pub query: Q,
    /// Count of the base collection
    pub total_count: usize,
    /// Count after filtering
    pub filtered_count: usize,
}

/// Executes grid requests
#[derive(Debug, Clone)]
pub struct GridExecutor {
    filters: FilterTreeCompiler,
    sorter: SortSpecApplier,
    logger: Logger,
}

impl GridExecutor {
    /// Create an executor; the configuration is validated first
    pub fn new(config: &EngineConfig) -> GridResult<Self> {
        config.validate()?;
        let logger = Logger::new(config.min_severity()?);
        Ok(Self::with_logger(config, logger))
    }

    /// Create an executor writing to the given logger
    pub fn with_logger(config: &EngineConfig, logger: Logger) -> Self {
        Self {
            filters: FilterTreeCompiler::new(config, logger),
            sorter: SortSpecApplier::new(FieldPathResolver::new(config.path_delimiter.clone())),
            logger,
        }
    }

    pub fn logger(&self) -> Logger {
        self.logger
    }

    /// Count, filter, count again, order. Never slices.
    pub fn prepare<Q: Queryable>(
        &self,
        request: &GridRequest,
        query: Q,
        custom: &dyn CustomPredicateProvider<Q>,
        ctx: &RequestContext,
    ) -> GridResult<PreparedQuery<Q>> {
        let request_id = Value::from(ctx.request_id.to_string());

        let total_count = query.count().map_err(GridError::data_source)?;
        self.logger.trace(
            Event::TotalCounted,
            &[
                ("request_id", request_id.clone()),
                ("total_count", Value::from(total_count)),
            ],
        );

        let query = self
            .filters
            .apply(request.filter.as_ref(), query, custom, ctx)?;
        let filtered_count = query.count().map_err(GridError::data_source)?;

        let query = if request.sort.is_empty() {
            query
        } else {
            let ordering: Vec<String> = self
                .sorter
                .ordering(&request.sort)
                .iter()
                .map(|term| term.to_string())
                .collect();
            self.logger.info(
                Event::SortApplied,
                &[
                    ("request_id", request_id),
                    ("ordering", Value::from(ordering)),
                ],
            );
            self.sorter.apply(query, &request.sort)
        };

        Ok(PreparedQuery {
            query,
            total_count,
            filtered_count,
        })
    }

    /// Slice a prepared query, fetch the page and assemble the response
    pub fn paginate<Q: Queryable>(
        &self,
        prepared: PreparedQuery<Q>,
        range: Option<RowRange>,
        ctx: &RequestContext,
    ) -> GridResult<GridResponse<Q::Record>> {
        let request_id = Value::from(ctx.request_id.to_string());

        if let Some(range) = range {
            self.logger.trace(
                Event::RangeApplied,
                &[
                    ("request_id", request_id.clone()),
                    ("start_row", Value::from(range.start())),
                    ("end_row", Value::from(range.end())),
                ],
            );
        }

        let rows = RangeSlicer::slice(prepared.query, range)
            .fetch()
            .map_err(GridError::data_source)?;

        let response =
            ResultAssembler::assemble(prepared.total_count, prepared.filtered_count, rows, range)?;

        self.logger.info(
            Event::ResultAssembled,
            &[
                ("request_id", request_id),
                ("row_count", Value::from(response.row_count)),
                ("total_count", Value::from(response.total_count)),
                ("rows", Value::from(response.len())),
                ("elapsed_ms", Value::from(ctx.elapsed_ms() as u64)),
            ],
        );

        Ok(response)
    }

    /// Run the whole pipeline for one request
    pub fn execute<Q: Queryable>(
        &self,
        request: &GridRequest,
        query: Q,
        custom: &dyn CustomPredicateProvider<Q>,
        ctx: &RequestContext,
    ) -> GridResult<GridResponse<Q::Record>> {
        let prepared = self.prepare(request, query, custom, ctx)?;
        self.paginate(prepared, request.range, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterNode, NoCustomFilters};
    use crate::planner::SortSpec;
    use crate::query::MemoryQuerySet;
    use serde_json::json;

    fn executor() -> GridExecutor {
        GridExecutor::with_logger(&EngineConfig::default(), Logger::disabled())
    }

    fn records() -> MemoryQuerySet {
        MemoryQuerySet::new(vec![
            json!({"id": 1, "name": "Rex", "age": 30}),
            json!({"id": 2, "name": "Ann", "age": 25}),
            json!({"id": 3, "name": "Alex", "age": 41}),
            json!({"id": 4, "name": "Bob", "age": 52}),
        ])
    }

    fn request(filter: Option<Value>, sort: Vec<SortSpec>, range: Option<(i64, i64)>) -> GridRequest {
        GridRequest {
            filter: filter.and_then(|f| FilterNode::from_model(&f).unwrap()),
            sort,
            range: range.map(|(s, e)| RowRange::new(s, e).unwrap()),
        }
    }

    #[test]
    fn test_prepare_counts_before_and_after_filter() {
        let prepared = executor()
            .prepare(
                &request(
                    Some(json!({"name": {"filterType": "text", "type": "contains", "filter": "ex"}})),
                    vec![SortSpec::asc("name")],
                    None,
                ),
                records(),
                &NoCustomFilters,
                &RequestContext::default(),
            )
            .unwrap();

        assert_eq!(prepared.total_count, 4);
        assert_eq!(prepared.filtered_count, 2);
        assert!(!prepared.query.describe().contains("SLICE"));
    }

    #[test]
    fn test_execute_sorts_and_slices() {
        let response = executor()
            .execute(
                &request(None, vec![SortSpec::desc("age")], Some((1, 3))),
                records(),
                &NoCustomFilters,
                &RequestContext::default(),
            )
            .unwrap();

        assert_eq!(response.row_count, 4);
        assert_eq!(response.total_count, 4);
        let ids: Vec<_> = response.rows.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(3), json!(1)]);
    }

    #[test]
    fn test_empty_request_returns_everything() {
        let response = executor()
            .execute(
                &GridRequest::default(),
                records(),
                &NoCustomFilters,
                &RequestContext::default(),
            )
            .unwrap();

        assert_eq!(response.row_count, 4);
        assert_eq!(response.len(), 4);
    }

    #[test]
    fn test_data_source_error_propagates() {
        let err = executor()
            .execute(
                &request(
                    Some(json!({"author.": {"filterType": "text", "type": "equals", "filter": "x"}})),
                    vec![],
                    None,
                ),
                records(),
                &NoCustomFilters,
                &RequestContext::default(),
            )
            .unwrap_err();

        assert!(matches!(err, GridError::DataSource(_)));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig {
            path_delimiter: String::new(),
            ..EngineConfig::default()
        };
        assert!(matches!(GridExecutor::new(&config), Err(GridError::Config(_))));
    }
}
