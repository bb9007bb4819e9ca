use std::env;
use thiserror::Error;

use mortgage_calc_core::Currency;

const LOG_LEVEL_VAR: &str = "MCALC_LOG_LEVEL";
const LOG_FORMAT_VAR: &str = "MCALC_LOG_FORMAT";
const CURRENCY_VAR: &str = "MCALC_CURRENCY";

/// Shape of the log lines written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Process-wide settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Used when neither `--currency` nor the input file names one.
    pub default_currency: Currency,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let log_level = env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| "warn".to_string());

        let log_format = match env::var(LOG_FORMAT_VAR) {
            Ok(value) => {
                LogFormat::parse(&value).ok_or(ConfigError::InvalidLogFormat { value })?
            }
            Err(_) => LogFormat::default(),
        };

        let default_currency = match env::var(CURRENCY_VAR) {
            Ok(value) => value
                .parse::<Currency>()
                .map_err(|_| ConfigError::InvalidCurrency { value })?,
            Err(_) => Currency::default(),
        };

        Ok(Self {
            log_level,
            log_format,
            default_currency,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MCALC_CURRENCY must be one of DOP, USD, EUR (got '{value}')")]
    InvalidCurrency { value: String },

    #[error("MCALC_LOG_FORMAT must be 'compact' or 'json' (got '{value}')")]
    InvalidLogFormat { value: String },
}
