//! CLI settings
//!
//! Layered as: built-in defaults < TOML file < `IMPACT_*` environment
//! variables. Command-line flags override the loaded values in `main`.

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "impact.toml";
/// Prefix of environment overrides, e.g. `IMPACT_LOG_LEVEL`.
pub const ENV_PREFIX: &str = "IMPACT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Default distribution mode for `allocate` and `plan`.
    pub distribution_mode: String,
    /// Default transfer restriction for `encode` and `plan`.
    pub transfer_restriction: String,
    /// Fixed "now" in unix seconds, for reproducible metadata.
    pub generated_at: Option<i64>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            distribution_mode: "equal".to_string(),
            transfer_restriction: "allow_all".to_string(),
            generated_at: None,
        }
    }
}

impl CliConfig {
    /// Load configuration. An explicitly named file must exist; the default
    /// file is optional.
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        let resolved_path = match config_path_override {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!(
                        "configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path.to_path_buf())
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let config = builder.build().context("failed to assemble configuration")?;
        config
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// Generation timestamp: configured override or the current wall clock.
    pub fn generated_at(&self) -> i64 {
        self.generated_at
            .unwrap_or_else(|| chrono::Utc::now().timestamp())
    }
}
