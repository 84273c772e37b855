//! CLI configuration file.
//!
//! An optional JSON file supplies defaults; command-line flags override it.
//! The default location is platform specific:
//! - Linux: `~/.config/evgrowth/config.json`
//! - macOS: `~/Library/Application Support/evgrowth/config.json`
//! - Windows: `%APPDATA%\evgrowth\config.json`

use evgrowth::data::{DemoConfig, FISCAL_YEAR_START_MONTH, LoadOptions, PeriodBasis, Schema};
use evgrowth::metrics::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading the configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// IO error.
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed JSON.
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Neither a data file nor demo mode was configured.
    #[error("no data file given: pass --data <FILE>, set \"data\" in {0}, or use --demo")]
    NoDataSource(String),
}

/// Which column layout the data file uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Layout {
    /// `state`, `electric_vehicles_sold`, `total_vehicles_sold`
    #[default]
    State,
    /// `maker`, `electric_vehicles_sold`
    Maker,
}

impl Layout {
    fn schema(self) -> Schema {
        match self {
            Self::State => Schema::by_state(),
            Self::Maker => Schema::by_maker(),
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Sales file
    pub(crate) data: Option<PathBuf>,
    /// Column layout of `data`
    pub(crate) layout: Layout,
    /// Period bucketing
    pub(crate) basis: PeriodBasis,
    /// First month of the fiscal year
    pub(crate) fiscal_start_month: u32,
    /// Use generated data instead of a file
    pub(crate) demo: bool,
    /// Generated data shape
    pub(crate) demo_config: DemoConfig,
    /// Engine settings
    pub(crate) engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: None,
            layout: Layout::State,
            basis: PeriodBasis::default(),
            fiscal_start_month: FISCAL_YEAR_START_MONTH,
            demo: false,
            demo_config: DemoConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Get the default configuration file path.
pub(crate) fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evgrowth")
        .join("config.json")
}

impl Config {
    /// Read the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };
        if !required && !path.is_file() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load options for the configured source.
    pub(crate) fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        let options = if self.demo {
            LoadOptions::demo(self.demo_config.clone())
        } else {
            let path = self.data.as_ref().ok_or_else(|| {
                ConfigError::NoDataSource(default_config_path().display().to_string())
            })?;
            LoadOptions::csv(path).with_schema(self.layout.schema())
        };

        Ok(LoadOptions {
            fiscal_start_month: self.fiscal_start_month,
            ..options.with_basis(self.basis)
        })
    }

    /// First month of the seasonal year for the configured basis.
    pub(crate) const fn first_month(&self) -> u32 {
        match self.basis {
            PeriodBasis::Fiscal => self.fiscal_start_month,
            PeriodBasis::Calendar | PeriodBasis::Quarter => 1,
        }
    }
}
