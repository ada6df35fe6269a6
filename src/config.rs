use crate::constants::{
    CONFIG_PATH, CUTOFF_DATE, DEFAULT_CSV_PATH, DEFAULT_HTML_PATH, LEGACY_BOOSTER,
    SPACEX_API_BASE_URL,
};
use crate::error::{EtlError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub dataset: DatasetConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Resolve each referenced entity once per run instead of once per launch
    pub cache_references: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub cutoff_date: NaiveDate,
    pub excluded_booster: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub html_path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: SPACEX_API_BASE_URL.to_string(),
            cache_references: false,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        let (year, month, day) = CUTOFF_DATE;
        Self {
            cutoff_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
            excluded_booster: LEGACY_BOOSTER.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            html_path: PathBuf::from(DEFAULT_HTML_PATH),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config = Self::from_toml(&config_content)?;
        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(EtlError::Config("api.base_url must not be empty".into()));
        }
        if self.output.csv_path == self.output.html_path {
            return Err(EtlError::Config(
                "output.csv_path and output.html_path must differ".into(),
            ));
        }
        Ok(())
    }
}
