use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use crate::app::backoff::{Backoff, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use crate::app::retriever::Strategy;
use crate::app::scheduler::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_MAX_PER_SECOND};
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Largest page the REST and GraphQL listings accept
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub api_url: String,
    pub strategy: Strategy,
    /// Ceiling on outbound requests per second across all repositories
    pub max_per_second: NonZeroU32,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub page_size: u32,
    pub max_in_flight: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            strategy: Strategy::default(),
            max_per_second: NonZeroU32::new(DEFAULT_MAX_PER_SECOND).unwrap_or(NonZeroU32::MIN),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            page_size: DEFAULT_PAGE_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl CollectorConfig {
    /// Defaults overridden by the environment (and a `.env` file, if any)
    ///
    /// Values are parsed but not range-checked; call `validate` once every
    /// override has been applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("GITHUB_API_URL") {
            config.api_url = url;
        }
        if let Some(strategy) = parse_var(&lookup, "CONTRIBUTIONS_STRATEGY")? {
            config.strategy = strategy;
        }
        if let Some(rate) = parse_var::<u32, _>(&lookup, "CONTRIBUTIONS_MAX_PER_SECOND")? {
            config.max_per_second = NonZeroU32::new(rate).ok_or_else(|| ConfigError::Zero {
                key: "CONTRIBUTIONS_MAX_PER_SECOND".to_string(),
            })?;
        }
        if let Some(attempts) = parse_var(&lookup, "CONTRIBUTIONS_MAX_ATTEMPTS")? {
            config.max_attempts = attempts;
        }
        if let Some(page_size) = parse_var(&lookup, "CONTRIBUTIONS_PAGE_SIZE")? {
            config.page_size = page_size;
        }
        if let Some(in_flight) = parse_var(&lookup, "CONTRIBUTIONS_MAX_IN_FLIGHT")? {
            config.max_in_flight = in_flight;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Zero {
                key: "max_attempts".to_string(),
            });
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::Zero {
                key: "max_in_flight".to_string(),
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                key: "page_size".to_string(),
                value: format!("{} (expected 1..={})", self.page_size, MAX_PAGE_SIZE),
            });
        }
        Ok(())
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.max_attempts, self.base_delay)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}
