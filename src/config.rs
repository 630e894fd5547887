use crate::aggregator::CatalogAggregator;
use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_CONFIG_PATH, DEFAULT_TIMEOUT_SECONDS};
use crate::error::{DrinkifyError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "DRINKIFY_API_BASE_URL";
pub const ENV_TIMEOUT_SECONDS: &str = "DRINKIFY_TIMEOUT_SECONDS";
pub const ENV_MAX_CONCURRENCY: &str = "DRINKIFY_MAX_CONCURRENCY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: format!("drinkify/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Upper bound on concurrent partition fetches; unset means unbounded.
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "drinkify.log".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from `drinkify.toml` when no path is given. A
    /// missing default file means built-in defaults; a missing explicit file
    /// is an error. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DrinkifyError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `DRINKIFY_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECONDS) {
            self.api.timeout_seconds = raw.trim().parse().map_err(|_| {
                DrinkifyError::Config(format!("{} must be an integer, got '{}'", ENV_TIMEOUT_SECONDS, raw))
            })?;
        }
        if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
            let raw = raw.trim();
            self.catalog.max_concurrency = if raw.is_empty() || raw.eq_ignore_ascii_case("unbounded") {
                None
            } else {
                Some(raw.parse().map_err(|_| {
                    DrinkifyError::Config(format!("{} must be an integer, got '{}'", ENV_MAX_CONCURRENCY, raw))
                })?)
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(DrinkifyError::Config("api.base_url must not be empty".into()));
        }
        if self.api.timeout_seconds == 0 {
            return Err(DrinkifyError::Config("api.timeout_seconds must be greater than zero".into()));
        }
        if self.catalog.max_concurrency == Some(0) {
            return Err(DrinkifyError::Config("catalog.max_concurrency must be at least 1".into()));
        }
        Ok(())
    }

    pub fn aggregator(&self) -> CatalogAggregator {
        match self.catalog.max_concurrency {
            Some(limit) => CatalogAggregator::with_max_concurrency(limit),
            None => CatalogAggregator::new(),
        }
    }
}
