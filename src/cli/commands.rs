//! CLI command implementations
//!
//! Both commands load the engine configuration, then read request lines
//! from stdin and write one response line per request to stdout. A failing
//! request produces an error line; only I/O and startup failures are fatal.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::core::RequestContext;
use crate::errors::{GridError, GridResult};
use crate::filter::{FilterTreeCompiler, NoCustomFilters};
use crate::observability::{Event, Logger};
use crate::planner::{FieldPathResolver, SortSpecApplier};
use crate::query::MemoryQuerySet;
use crate::rest_api::{GridHandler, GridRequest};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response};

/// Parse args and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Run { config, data } => serve(config.as_deref(), &data),
        Command::Explain { config } => explain(config.as_deref()),
    }
}

/// Serve grid requests against a record file
pub fn serve(config_path: Option<&Path>, data_path: &Path) -> CliResult<()> {
    let (config, logger) = load_config(config_path)?;
    let records = load_records(data_path)?;
    logger.info(
        Event::DataLoaded,
        &[
            ("path", Value::from(data_path.display().to_string())),
            ("records", Value::from(records.len())),
        ],
    );

    let handler = GridHandler::with_logger(config, logger);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    serve_requests(&handler, records, stdin.lock(), &mut stdout)
}

/// Request loop of `run`, over any reader and writer
pub fn serve_requests<R: BufRead, W: Write>(
    handler: &GridHandler,
    records: Arc<Vec<Value>>,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    let delimiter = handler.config().path_delimiter.clone();

    respond_each(input, output, |params| {
        let ctx = RequestContext::new(params);
        let query = MemoryQuerySet::from_shared(Arc::clone(&records)).with_delimiter(&delimiter);
        let outcome = handler.list(query, &NoCustomFilters, &ctx)?;
        serde_json::to_value(outcome).map_err(GridError::data_source)
    })
}

/// Explain requests: compiled predicate, ordering and range
pub fn explain(config_path: Option<&Path>) -> CliResult<()> {
    let (config, logger) = load_config(config_path)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    explain_requests(&config, logger, stdin.lock(), &mut stdout)
}

/// Request loop of `explain`, over any reader and writer
pub fn explain_requests<R: BufRead, W: Write>(
    config: &EngineConfig,
    logger: Logger,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    let filters = FilterTreeCompiler::new(config, logger);
    let sorter = SortSpecApplier::new(FieldPathResolver::new(config.path_delimiter.clone()));

    respond_each(input, output, |params| {
        let request = match GridRequest::parse(&params, config)? {
            Some(request) => request,
            None => return Ok(json!({"grid": false})),
        };

        let predicate = match &request.filter {
            Some(tree) => Some(filters.predicate(tree)?.to_string()),
            None => None,
        };
        let ordering: Vec<String> = sorter
            .ordering(&request.sort)
            .iter()
            .map(|term| term.to_string())
            .collect();
        let range = request
            .range
            .map(|r| json!({"startRow": r.start(), "endRow": r.end()}));

        Ok(json!({
            "grid": true,
            "predicate": predicate,
            "ordering": ordering,
            "range": range,
        }))
    })
}

fn respond_each<R, W, F>(input: R, output: &mut W, mut handle: F) -> CliResult<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(HashMap<String, String>) -> GridResult<Value>,
{
    for line in read_requests(input) {
        match line? {
            Ok(params) => match handle(params) {
                Ok(data) => write_response(output, data)?,
                Err(e) => write_error(output, e.code(), &e.to_string())?,
            },
            Err(e) => write_error(output, e.code_str(), e.message())?,
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> CliResult<(EngineConfig, Logger)> {
    let config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let logger = Logger::new(config.min_severity()?);

    logger.info(
        Event::ConfigLoaded,
        &[
            (
                "path",
                path.map(|p| Value::from(p.display().to_string()))
                    .unwrap_or(Value::Null),
            ),
            ("path_delimiter", Value::from(config.path_delimiter.clone())),
            ("distinct_after_filter", Value::from(config.distinct_after_filter)),
        ],
    );

    Ok((config, logger))
}

/// Load the record snapshot; the file must hold a JSON array
pub fn load_records(path: &Path) -> CliResult<Arc<Vec<Value>>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::data_error(format!("Failed to read {}: {}", path.display(), e))
    })?;

    match serde_json::from_str(&content) {
        Ok(Value::Array(records)) => Ok(Arc::new(records)),
        Ok(_) => Err(CliError::data_error(format!(
            "{} must contain a JSON array of records",
            path.display()
        ))),
        Err(e) => Err(CliError::data_error(format!(
            "Invalid JSON in {}: {}",
            path.display(),
            e
        ))),
    }
}
