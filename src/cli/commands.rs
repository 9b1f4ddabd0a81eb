//! CLI command implementations

use std::path::Path;

use serde_json::json;

use crate::http_server::HttpServer;
use crate::observability::init_logger;

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command, cli.verbose)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, verbose: bool) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port, verbose),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Load the configuration and fixture, then serve HTTP until stopped
pub fn serve(config_path: &Path, port: Option<u16>, verbose: bool) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    init_logger(config.log_format, verbose);

    if let Some(port) = port {
        config.server.port = port;
    }

    let (platform, summary) = config.build_platform()?;
    tracing::info!(
        fixture = %config.fixture_path.display(),
        products = summary.products,
        carts = summary.carts,
        viewers = config.viewers.len(),
        "catalog fixture loaded"
    );

    let server = HttpServer::new(config.server.clone(), platform);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Validate configuration and fixture without starting the server
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let (_, summary) = config.build_platform()?;

    write_response(json!({
        "valid": true,
        "listen": config.server.socket_addr(),
        "fixture": summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_config_accepts_valid_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("catalog.json"), r#"{"products": []}"#).unwrap();
        let config = dir.path().join("storefront.json");
        fs::write(&config, r#"{"fixture_path": "catalog.json"}"#).unwrap();

        assert!(check_config(&config).is_ok());
    }

    #[test]
    fn test_check_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_config(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
