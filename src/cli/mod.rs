//! CLI module for gridquery
//!
//! Provides command-line interface for:
//! - run: Serve grid requests from stdin against a JSON record file
//! - explain: Print the compiled form of each request

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    explain, explain_requests, load_records, run, run_command, serve, serve_requests,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_params, read_requests, write_error, write_response};
