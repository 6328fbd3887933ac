//! CLI argument definitions using clap
//!
//! Commands:
//! - gridquery run --data <path> [--config <path>]
//! - gridquery explain [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gridquery - data-grid requests over JSON records
#[derive(Parser, Debug)]
#[command(name = "gridquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve grid requests from stdin against a JSON record file
    Run {
        /// Path to engine configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to a JSON array of records
        #[arg(long)]
        data: PathBuf,
    },

    /// Print the compiled filter, ordering and range of each request
    Explain {
        /// Path to engine configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
