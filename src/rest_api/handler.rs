//! # List Handler
//!
//! Serves list requests: grid requests run the full translation pipeline,
//! all others get a plain limit/offset page of the unfiltered collection.

use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::core::RequestContext;
use crate::errors::{GridError, GridResult};
use crate::executor::{GridExecutor, GridResponse};
use crate::filter::CustomPredicateProvider;
use crate::observability::{Event, Logger};
use crate::query::Queryable;

use super::pagination::PaginationStrategy;
use super::parser::GridRequest;
use super::response::ListResponse;

/// Result of a list request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListOutcome<R: Serialize> {
    Grid(GridResponse<R>),
    Standard(ListResponse<R>),
}

impl<R: Serialize> IntoResponse for ListOutcome<R> {
    fn into_response(self) -> Response {
        match self {
            ListOutcome::Grid(response) => response.into_response(),
            ListOutcome::Standard(response) => response.into_response(),
        }
    }
}

/// Handles list requests against any queryable source
#[derive(Debug, Clone)]
pub struct GridHandler {
    config: EngineConfig,
    executor: GridExecutor,
    logger: Logger,
}

impl GridHandler {
    /// Create a handler; the configuration is validated first
    pub fn new(config: EngineConfig) -> GridResult<Self> {
        let executor = GridExecutor::new(&config)?;
        let logger = executor.logger();
        Ok(Self {
            config,
            executor,
            logger,
        })
    }

    /// Create a handler writing to the given logger
    pub fn with_logger(config: EngineConfig, logger: Logger) -> Self {
        Self {
            executor: GridExecutor::with_logger(&config, logger),
            config,
            logger,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Serve one list request
    pub fn list<Q>(
        &self,
        query: Q,
        custom: &dyn CustomPredicateProvider<Q>,
        ctx: &RequestContext,
    ) -> GridResult<ListOutcome<Q::Record>>
    where
        Q: Queryable,
        Q::Record: Serialize,
    {
        let result = self.serve(query, custom, ctx);

        if let Err(err) = &result {
            let fields = [
                ("request_id", Value::from(ctx.request_id.to_string())),
                ("code", Value::from(err.code())),
                ("message", Value::from(err.to_string())),
            ];
            if err.is_client_error() {
                self.logger.warn(Event::RequestFailed, &fields);
            } else {
                self.logger.error(Event::RequestFailed, &fields);
            }
        }

        result
    }

    fn serve<Q>(
        &self,
        query: Q,
        custom: &dyn CustomPredicateProvider<Q>,
        ctx: &RequestContext,
    ) -> GridResult<ListOutcome<Q::Record>>
    where
        Q: Queryable,
        Q::Record: Serialize,
    {
        match PaginationStrategy::select(&ctx.params, &self.config)? {
            PaginationStrategy::Grid(request) => {
                self.log_parsed(&request, ctx);
                let response = self.executor.execute(&request, query, custom, ctx)?;
                Ok(ListOutcome::Grid(response))
            }
            PaginationStrategy::Standard { limit, offset } => {
                let end = offset.saturating_add(limit);
                let rows = query
                    .slice(offset, end)
                    .fetch()
                    .map_err(GridError::data_source)?;

                self.logger.info(
                    Event::StandardPageServed,
                    &[
                        ("request_id", Value::from(ctx.request_id.to_string())),
                        ("limit", Value::from(limit)),
                        ("offset", Value::from(offset)),
                        ("rows", Value::from(rows.len())),
                    ],
                );

                Ok(ListOutcome::Standard(ListResponse::new(rows, limit, offset)))
            }
        }
    }

    fn log_parsed(&self, request: &GridRequest, ctx: &RequestContext) {
        let range = request
            .range
            .map(|r| Value::from(format!("{}..{}", r.start(), r.end())))
            .unwrap_or(Value::Null);

        self.logger.info(
            Event::GridRequestParsed,
            &[
                ("request_id", Value::from(ctx.request_id.to_string())),
                (
                    "conditions",
                    Value::from(request.filter.as_ref().map_or(0, |f| f.leaf_count())),
                ),
                ("sort_keys", Value::from(request.sort.len())),
                ("range", range),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::NoCustomFilters;
    use crate::query::MemoryQuerySet;
    use serde_json::json;

    fn handler() -> GridHandler {
        GridHandler::with_logger(EngineConfig::default(), Logger::disabled())
    }

    fn ctx(pairs: &[(&str, &str)]) -> RequestContext {
        RequestContext::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn records() -> MemoryQuerySet {
        MemoryQuerySet::new((0..30).map(|i| json!({"id": i, "even": i % 2 == 0})).collect())
    }

    #[test]
    fn test_grid_request_returns_grid_response() {
        let outcome = handler()
            .list(
                records(),
                &NoCustomFilters,
                &ctx(&[
                    ("filter", r#"{"even":{"filterType":"boolean","filter":true}}"#),
                    ("startRow", "0"),
                    ("endRow", "5"),
                ]),
            )
            .unwrap();

        let body = serde_json::to_value(&outcome).unwrap();
        assert_eq!(body["rowCount"], 15);
        assert_eq!(body["totalCount"], 30);
        assert_eq!(body["rows"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn test_plain_request_returns_standard_page() {
        let outcome = handler()
            .list(records(), &NoCustomFilters, &ctx(&[("limit", "10"), ("offset", "25")]))
            .unwrap();

        match outcome {
            ListOutcome::Standard(page) => {
                assert_eq!(page.count, 5);
                assert_eq!(page.data[0]["id"], 25);
            }
            other => panic!("expected standard page, got {:?}", other),
        }
    }

    #[test]
    fn test_errors_are_returned() {
        let err = handler()
            .list(records(), &NoCustomFilters, &ctx(&[("filter", "[")]))
            .unwrap_err();
        assert_eq!(err.code(), "GRID_MALFORMED_FILTER_JSON");
    }
}
