//! CLI argument definitions using clap
//!
//! Commands:
//! - storefront-blocks serve --config <path> [--port <port>]
//! - storefront-blocks check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storefront blocks REST API
#[derive(Parser, Debug)]
#[command(name = "storefront-blocks")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./storefront.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate the configuration and fixture, then exit
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./storefront.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
