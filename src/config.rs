use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{Currency, ExchangeContext, MAX_EXCHANGE_RATE};
use crate::strategy::{KellyCalculator, RiskProfile, HIGH_RISK_FRACTION};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub bankroll: BankrollConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub staking: StakingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankrollConfig {
    /// Starting capital for accounts the directory does not know yet
    #[serde(default = "default_base_capital")]
    pub default_base_capital: Decimal,
    /// Accounting currency; only USD is supported
    #[serde(default)]
    pub internal_currency: Currency,
}

fn default_base_capital() -> Decimal {
    dec!(1000)
}

impl Default for BankrollConfig {
    fn default() -> Self {
        Self {
            default_base_capital: default_base_capital(),
            internal_currency: Currency::INTERNAL,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub currency: Currency,
    /// Display units per internal unit (COP per USD)
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: Decimal,
}

fn default_exchange_rate() -> Decimal {
    dec!(3734.50)
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            exchange_rate: default_exchange_rate(),
        }
    }
}

impl DisplayConfig {
    /// Exchange context for a session; an invalid rate falls back to identity
    pub fn exchange_context(&self) -> ExchangeContext {
        ExchangeContext::new(self.currency, self.exchange_rate).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StakingConfig {
    #[serde(default)]
    pub risk_profile: RiskProfile,
    #[serde(default = "default_true")]
    pub use_safety_margin: bool,
    /// Share of bankroll above which a stake is flagged as high risk
    #[serde(default = "default_high_risk_threshold")]
    pub high_risk_threshold: Decimal,
}

fn default_true() -> bool {
    true
}

fn default_high_risk_threshold() -> Decimal {
    HIGH_RISK_FRACTION
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            risk_profile: RiskProfile::default(),
            use_safety_margin: true,
            high_risk_threshold: HIGH_RISK_FRACTION,
        }
    }
}

impl StakingConfig {
    pub fn calculator(&self) -> KellyCalculator {
        KellyCalculator::new(self.risk_profile)
            .with_safety_margin(self.use_safety_margin)
            .with_high_risk_fraction(self.high_risk_threshold)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    /// Where ledgers and the account directory live
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured directory, else `<platform data dir>/betsmart`, else `./data`
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("betsmart"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

fn default_oracle_timeout() -> u64 {
    120
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_oracle_timeout(),
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rotated log files; console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("bankroll.default_base_capital", "1000")?
            .set_default("display.currency", "USD")?
            .set_default("display.exchange_rate", "3734.50")?
            .set_default("staking.risk_profile", "balanced")?
            .set_default("staking.use_safety_margin", true)?
            .set_default("oracle.timeout_secs", 120)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("BETSMART_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (BETSMART_DISPLAY__CURRENCY, etc.)
            .add_source(
                Environment::with_prefix("BETSMART")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !self.bankroll.internal_currency.is_internal() {
            errors.push(format!(
                "internal_currency must be {}",
                Currency::INTERNAL
            ));
        }

        if self.bankroll.default_base_capital < Decimal::ZERO {
            errors.push("default_base_capital cannot be negative".to_string());
        }

        if self.display.exchange_rate <= Decimal::ZERO {
            errors.push("exchange_rate must be positive".to_string());
        } else if self.display.exchange_rate > MAX_EXCHANGE_RATE {
            errors.push(format!("exchange_rate cannot exceed {}", MAX_EXCHANGE_RATE));
        }

        let threshold = self.staking.high_risk_threshold;
        if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
            errors.push("high_risk_threshold must be in (0, 1]".to_string());
        }

        if self.oracle.timeout_secs == 0 {
            errors.push("oracle timeout_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
