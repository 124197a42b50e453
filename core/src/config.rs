//! Configuration for the Conduit tooling
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. A TOML file: the explicit path, else `CONDUIT_CONFIG_PATH`, else
//!    `conduit.toml` in the working directory if it exists
//! 3. Environment variables prefixed with `CONDUIT_`, nested keys joined by
//!    `__` (e.g. `CONDUIT_DIAGNOSTICS__MINIMUM_SEVERITY=warning`)
//!
//! A `.env` file in the working directory is read before the environment.
//!
//! ```toml
//! [diagnostics]
//! simplification_hints = false
//! minimum_severity = "warning"
//!
//! [runtime_parameters]
//! region = "eu"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::diagnostics::Severity;
use crate::expr::RuntimeParameterProvider;
use crate::validation::ValidationOptions;

const CONFIG_PATH_VAR: &str = "CONDUIT_CONFIG_PATH";
const DEFAULT_CONFIG_FILE: &str = "conduit.toml";
const ENV_PREFIX: &str = "CONDUIT";

/// Loaded settings
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Values for `requires` properties, keyed by parameter name
    #[serde(default)]
    pub runtime_parameters: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_true")]
    pub simplification_hints: bool,
    #[serde(default = "default_true")]
    pub unused_block_warnings: bool,
    /// One of `error`, `warning`, `info`, `hint`
    #[serde(default = "default_minimum_severity")]
    pub minimum_severity: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            simplification_hints: true,
            unused_block_warnings: true,
            minimum_severity: default_minimum_severity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_minimum_severity() -> String {
    Severity::Hint.as_str().to_string()
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default locations
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    /// Validation switches; fails on an unknown severity name
    pub fn validation_options(&self) -> Result<ValidationOptions> {
        let minimum_severity = self
            .diagnostics
            .minimum_severity
            .parse::<Severity>()
            .map_err(anyhow::Error::msg)
            .context("Invalid diagnostics.minimum_severity")?;
        Ok(ValidationOptions {
            simplification_hints: self.diagnostics.simplification_hints,
            unused_block_warnings: self.diagnostics.unused_block_warnings,
            minimum_severity,
        })
    }

    pub fn runtime_parameters(&self) -> RuntimeParameterProvider {
        RuntimeParameterProvider::from_map(self.runtime_parameters.clone())
    }
}

/// Builder for [`Config`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    skip_environment: bool,
}

impl ConfigBuilder {
    /// Set the config file path (overrides default search)
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Ignore `.env` and `CONDUIT_*` variables
    pub fn skip_environment(mut self, skip: bool) -> Self {
        self.skip_environment = skip;
        self
    }

    pub fn build(self) -> Result<Config> {
        if !self.skip_environment {
            dotenvy::dotenv().ok();
        }

        let mut builder = config::Config::builder()
            .set_default("diagnostics.simplification_hints", true)?
            .set_default("diagnostics.unused_block_warnings", true)?
            .set_default("diagnostics.minimum_severity", default_minimum_severity())?;

        if let Some(path) = self.resolve_path()? {
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        if !self.skip_environment {
            builder = builder.add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: Config = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        // surface a bad severity at load time
        config.validation_options()?;
        Ok(config)
    }

    fn resolve_path(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.config_path {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Some(path.clone()));
        }
        if !self.skip_environment {
            if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
                return Ok(Some(PathBuf::from(path)));
            }
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        Ok(default.exists().then(|| default.to_path_buf()))
    }
}
