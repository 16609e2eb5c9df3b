use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Largest page the history provider will serve
pub const MAX_HISTORY_PAGE_SIZE: u32 = 50;

/// Largest unit exponent a `Decimal` can hold exactly
pub const MAX_UNIT_EXPONENT: u32 = 28;

/// Progress must be reported at least this often
pub const MAX_PROGRESS_INTERVAL: usize = 10;

pub const DEFAULT_CONFIG_PATH: &str = "gas_tracker.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Transaction-history provider
    pub history: HistoryConfig,

    /// Historical-price provider
    pub price: PriceConfig,

    /// Cost calculation and run pacing
    pub calculation: CalculationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// History API base URL
    pub api_base_url: String,

    /// Sent as `X-API-KEY` when non-empty
    pub api_key: String,

    /// Network the history query is scoped to (e.g. "ethereum")
    pub network: String,

    /// Entries requested per page (1..=50)
    pub page_size: u32,

    /// Pages fetched before giving up on a cursor that never ends
    pub max_pages: u32,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceConfig {
    /// Price API base URL
    pub api_base_url: String,

    /// Sent as `X-API-KEY` when non-empty
    pub api_key: String,

    /// Native token symbol to price (e.g. "ETH")
    pub symbol: String,

    /// Candle granularity requested from the provider
    pub interval: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Decimal places between the smallest native unit and the display unit
    pub unit_exponent: u32,

    /// Emit a progress message every N processed transactions
    pub progress_interval: usize,

    /// Pause every N processed transactions (0 disables)
    pub pacing_interval: usize,

    /// Length of each pause in milliseconds (0 disables)
    pub pacing_delay_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig {
                api_base_url: "http://localhost:8080/v1".to_string(),
                api_key: "".to_string(), // Set GAS__HISTORY__API_KEY
                network: "ethereum".to_string(),
                page_size: MAX_HISTORY_PAGE_SIZE,
                max_pages: 10_000,
                request_timeout_seconds: 30,
            },
            price: PriceConfig {
                api_base_url: "http://localhost:8081/v1".to_string(),
                api_key: "".to_string(), // Set GAS__PRICE__API_KEY
                symbol: "ETH".to_string(),
                interval: "1h".to_string(),
                request_timeout_seconds: 30,
            },
            calculation: CalculationConfig {
                unit_exponent: 18,
                progress_interval: 10,
                pacing_interval: 20,
                pacing_delay_ms: 100,
            },
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "History API base URL is required".to_string(),
            ));
        }

        if self.network.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "History network is required".to_string(),
            ));
        }

        if self.page_size == 0 || self.page_size > MAX_HISTORY_PAGE_SIZE {
            return Err(ConfigurationError::InvalidValue(format!(
                "History page size must be between 1 and {}, got {}",
                MAX_HISTORY_PAGE_SIZE, self.page_size
            )));
        }

        if self.max_pages == 0 {
            return Err(ConfigurationError::InvalidValue(
                "History max pages must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl PriceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Price API base URL is required".to_string(),
            ));
        }

        if self.symbol.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Price symbol is required".to_string(),
            ));
        }

        if self.interval.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Price interval is required".to_string(),
            ));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl CalculationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.unit_exponent > MAX_UNIT_EXPONENT {
            return Err(ConfigurationError::InvalidValue(format!(
                "Unit exponent must be at most {}, got {}",
                MAX_UNIT_EXPONENT, self.unit_exponent
            )));
        }

        if self.progress_interval == 0 || self.progress_interval > MAX_PROGRESS_INTERVAL {
            return Err(ConfigurationError::InvalidValue(format!(
                "Progress interval must be between 1 and {}, got {}",
                MAX_PROGRESS_INTERVAL, self.progress_interval
            )));
        }

        Ok(())
    }

    /// Pacing is off when either the interval or the delay is zero
    pub fn pacing_enabled(&self) -> bool {
        self.pacing_interval > 0 && self.pacing_delay_ms > 0
    }
}

impl SystemConfig {
    /// Load configuration from `gas_tracker.toml` and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path.
    ///
    /// Layers, lowest priority first: built-in defaults, the file (if it
    /// exists), then `GAS__SECTION__KEY` environment variables.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("GAS")
                .try_parsing(true)
                .separator("__"),
        );

        let system_config: SystemConfig = config_builder.build()?.try_deserialize()?;

        system_config.validate()?;

        debug!(
            "Configuration: network={}, symbol={}, page_size={}, max_pages={}",
            system_config.history.network,
            system_config.price.symbol,
            system_config.history.page_size,
            system_config.history.max_pages
        );

        Ok(system_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.history.validate()?;
        self.price.validate()?;
        self.calculation.validate()?;
        Ok(())
    }

    /// Configuration as JSON with API keys masked
    pub fn to_redacted_json(&self) -> serde_json::Value {
        let mut redacted = self.clone();
        for key in [&mut redacted.history.api_key, &mut redacted.price.api_key] {
            if !key.is_empty() {
                *key = "***".to_string();
            }
        }
        serde_json::to_value(&redacted).unwrap_or(serde_json::Value::Null)
    }
}
