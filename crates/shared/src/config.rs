//! Application configuration management.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::types::money::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Balance and withdrawal rules.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Payout gateway credentials and defaults.
    pub payout: PayoutConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Whether `confirmed` (not yet `completed`) bookings count as withdrawable earnings.
    #[serde(default)]
    pub count_confirmed_bookings: bool,
    /// Upper bound on a single payout call, in seconds.
    #[serde(default = "default_payout_timeout")]
    pub payout_timeout_secs: u64,
    /// Upper bound on waiting for another withdrawal of the same user, in seconds.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_secs: u64,
}

fn default_payout_timeout() -> u64 {
    30
}

fn default_lock_timeout() -> u64 {
    // Must outlast one full payout call of the request ahead in line.
    45
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            count_confirmed_bookings: false,
            payout_timeout_secs: default_payout_timeout(),
            lock_timeout_secs: default_lock_timeout(),
        }
    }
}

impl LedgerConfig {
    /// Payout call timeout as a `Duration`.
    #[must_use]
    pub const fn payout_timeout(&self) -> Duration {
        Duration::from_secs(self.payout_timeout_secs)
    }

    /// Lock wait timeout as a `Duration`.
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

/// Payout gateway (MeSomb) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutConfig {
    /// Gateway base URL.
    #[serde(default = "default_payout_base_url")]
    pub base_url: String,
    /// Application key sent as `X-MeSomb-Application`.
    pub application_key: String,
    /// Access key used in the request signature credential.
    pub access_key: String,
    /// Secret key used to sign requests.
    pub secret_key: String,
    /// ISO country code of the payout market.
    #[serde(default = "default_country")]
    pub country: String,
    /// Payout currency.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Town reported in the payout location block.
    #[serde(default = "default_town")]
    pub town: String,
    /// Region reported in the payout location block.
    #[serde(default = "default_region")]
    pub region: String,
    /// Product label attached to payouts.
    #[serde(default = "default_product_name")]
    pub product_name: String,
}

fn default_payout_base_url() -> String {
    "https://mesomb.hachther.com".to_string()
}

fn default_country() -> String {
    "CM".to_string()
}

fn default_currency() -> Currency {
    Currency::Xaf
}

fn default_town() -> String {
    "Yaounde".to_string()
}

fn default_region() -> String {
    "Centre".to_string()
}

fn default_product_name() -> String {
    "Earnings withdrawal".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TANDEM").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings the deserializer cannot express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` naming the first offending key.
    pub fn validate(&self) -> AppResult<()> {
        let credentials = [
            ("payout.application_key", &self.payout.application_key),
            ("payout.access_key", &self.payout.access_key),
            ("payout.secret_key", &self.payout.secret_key),
        ];
        if let Some((key, _)) = credentials.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::Configuration(format!("{key} must not be empty")));
        }

        if self.ledger.payout_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "ledger.payout_timeout_secs must be positive".to_string(),
            ));
        }

        // A waiter must be able to outlast the payout call ahead of it.
        if self.ledger.lock_timeout_secs < self.ledger.payout_timeout_secs {
            return Err(AppError::Configuration(
                "ledger.lock_timeout_secs must be at least ledger.payout_timeout_secs".to_string(),
            ));
        }

        Ok(())
    }
}
