//! Configuration file
//!
//! A single JSON document: HTTP server settings, store settings, the
//! bearer tokens the stand-alone host accepts and the catalog fixture the
//! in-memory host is seeded from. Relative fixture paths resolve against
//! the directory holding the config file.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::observability::LogFormat;
use crate::platform::{Fixture, Platform, StoreSettings, TokenViewers, Viewer};

use super::errors::{CliError, CliResult};

/// Largest supported number of price decimals
const MAX_DECIMALS: u32 = 8;

/// A bearer token and the user it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerToken {
    pub token: String,
    pub user_id: u64,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub viewers: Vec<ViewerToken>,

    /// Catalog, media and cart seed data (required)
    pub fixture_path: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        if config.fixture_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.fixture_path = dir.join(&config.fixture_path);
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CliResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(CliError::config_error("server.host must not be empty"));
        }

        let currency = &self.store.currency;
        let code_ok = currency.code.len() == 3 && currency.code.chars().all(|c| c.is_ascii_uppercase());
        if !code_ok {
            return Err(CliError::config_error(format!(
                "Invalid currency code: '{}'. Expected three upper-case letters.",
                currency.code
            )));
        }
        if currency.decimals > MAX_DECIMALS {
            return Err(CliError::config_error(format!(
                "store.currency.decimals must be <= {}",
                MAX_DECIMALS
            )));
        }
        if currency.decimal_separator.is_empty() {
            return Err(CliError::config_error(
                "store.currency.decimal_separator must not be empty",
            ));
        }

        let mut tokens = BTreeSet::new();
        for viewer in &self.viewers {
            if viewer.token.trim().is_empty() {
                return Err(CliError::config_error(format!(
                    "Viewer {} has an empty token",
                    viewer.user_id
                )));
            }
            if !tokens.insert(viewer.token.as_str()) {
                return Err(CliError::config_error(format!(
                    "Duplicate viewer token for user {}",
                    viewer.user_id
                )));
            }
        }

        Ok(())
    }

    pub fn token_viewers(&self) -> TokenViewers {
        self.viewers.iter().fold(TokenViewers::new(), |viewers, v| {
            viewers.with(
                v.token.clone(),
                Viewer::user(v.user_id, v.capabilities.iter().cloned()),
            )
        })
    }

    /// Load the fixture and wire the in-memory host
    pub fn build_platform(&self) -> CliResult<(Platform, FixtureSummary)> {
        let fixture = Fixture::load(&self.fixture_path)?;
        let summary = FixtureSummary::of(&fixture);
        let platform = Platform::in_memory(fixture, self.store.clone(), self.token_viewers());
        Ok((platform, summary))
    }
}

/// Counts reported after loading a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixtureSummary {
    pub products: usize,
    pub terms: usize,
    pub attachments: usize,
    pub carts: usize,
}

impl FixtureSummary {
    fn of(fixture: &Fixture) -> Self {
        Self {
            products: fixture.products.len(),
            terms: fixture.terms.len(),
            attachments: fixture.attachments.len(),
            carts: fixture.carts.len(),
        }
    }
}
