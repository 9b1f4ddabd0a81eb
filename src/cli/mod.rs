//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Load config and fixture, then serve the REST API
//! - check-config: Validate config and fixture and exit

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_config, run, run_command, serve};
pub use config::{Config, FixtureSummary, ViewerToken};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_response, write_response_to};
