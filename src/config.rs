use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::backend::ApiDialect;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    /// Where exported CSV files land.
    pub export_dir: PathBuf,
    /// Where the rolling log files land.
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub dialect: ApiDialect,
}

/// Command-line values that take precedence over environment variables.
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub dialect: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::load(Overrides::default())
    }

    /// Resolution order: CLI override, then environment, then the default.
    /// The default base URL depends on the resolved dialect, so the dialect
    /// is settled first.
    pub fn load(overrides: Overrides) -> Result<Self> {
        dotenvy::dotenv().ok();

        let dialect: ApiDialect = overrides
            .dialect
            .or_else(|| env::var("ESTATE_API_DIALECT").ok())
            .map(|s| s.parse().map_err(|e: String| anyhow!(e)))
            .transpose()?
            .unwrap_or_default();

        let base_url = overrides
            .base_url
            .or_else(|| env::var("ESTATE_API_BASE_URL").ok())
            .unwrap_or_else(|| dialect.default_base_url().to_string());

        let export_dir = overrides
            .export_dir
            .or_else(|| env::var("ESTATE_EXPORT_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let log_dir = overrides
            .log_dir
            .or_else(|| env::var("ESTATE_LOG_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("logs"));

        Ok(Self {
            api: ApiConfig { base_url, dialect },
            export_dir,
            log_dir,
        })
    }
}
