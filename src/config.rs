//! Service configuration read from the environment

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::value_objects::Percentage;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Absent: the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Absent: events are only logged.
    pub nats_url: Option<String>,
    /// Upper bound for percentage discounts accepted by the API.
    pub max_discount_percentage: Percentage,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: None,
            database_max_connections: 10,
            nats_url: None,
            max_discount_percentage: Percentage::new(Decimal::from(50)).unwrap_or(Percentage::HUNDRED),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: cannot parse `{value}`")]
    Invalid { key: &'static str, value: String },

    #[error("MAX_DISCOUNT_PERCENTAGE must be between 0 and 100, got {0}")]
    DiscountOutOfRange(Decimal),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_discount: Decimal = parse(&non_empty, "MAX_DISCOUNT_PERCENTAGE")?
            .unwrap_or(defaults.max_discount_percentage.value());
        if max_discount < Decimal::ZERO || max_discount > Decimal::ONE_HUNDRED {
            return Err(ConfigError::DiscountOutOfRange(max_discount));
        }

        Ok(Self {
            port: parse(&non_empty, "PORT")?.unwrap_or(defaults.port),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parse(&non_empty, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.database_max_connections),
            nats_url: non_empty("NATS_URL"),
            max_discount_percentage: Percentage::new(max_discount)
                .map_err(|_| ConfigError::DiscountOutOfRange(max_discount))?,
        })
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|value| value.trim().parse::<T>().map_err(|_| ConfigError::Invalid { key, value }))
        .transpose()
}
