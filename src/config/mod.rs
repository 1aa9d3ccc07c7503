use alloy_primitives::{Address, U256};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

/// Config document compiled into the bundle. A browser build has no
/// filesystem, so the file is embedded and build-time env vars overlay it.
const EMBEDDED_CONFIG: &str = include_str!("../../flare-predict.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid contract address {0:?}")]
    InvalidAddress(String),
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("invalid log level {0:?}")]
    InvalidLevel(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractConfig {
    /// Deployed prediction market contract. Empty = not deployed yet.
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Display name shown in the wallet panel.
    #[serde(default = "default_network_name")]
    pub name: String,
    /// Native currency ticker appended to amounts.
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Optional public JSON-RPC endpoint for read-only calls.
    /// Empty = all reads go through the wallet.
    #[serde(default)]
    pub rpc_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// Minimum stake per bet, in ether units.
    #[serde(default = "default_min_bet")]
    pub min_bet: String,
    /// Interval for the optional periodic market refresh.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Wire `refresh_interval_ms` to a timer. Off by default.
    #[serde(default)]
    pub auto_refresh: bool,
    /// How often to poll for a transaction receipt while waiting.
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Delay between checks for an injected wallet at startup.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Checks after the first one before giving up.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    /// Reconnect silently when the wallet already authorized this page.
    #[serde(default = "default_true")]
    pub auto_connect: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_network_name() -> String {
    "Flare".to_string()
}
fn default_symbol() -> String {
    "FLR".to_string()
}
fn default_min_bet() -> String {
    "0.01".to_string()
}
fn default_refresh_interval_ms() -> u64 {
    30_000
}
fn default_receipt_poll_ms() -> u64 {
    1_000
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_poll_attempts() -> u32 {
    30
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network_name(),
            symbol: default_symbol(),
            rpc_url: String::new(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            min_bet: default_min_bet(),
            refresh_interval_ms: default_refresh_interval_ms(),
            auto_refresh: false,
            receipt_poll_ms: default_receipt_poll_ms(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_attempts: default_poll_attempts(),
            auto_connect: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contract: ContractConfig::default(),
            network: NetworkConfig::default(),
            market: MarketConfig::default(),
            wallet: WalletConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document and validate the typed fields.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the embedded config, then overlay build-time environment variables.
    pub fn embedded() -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(EMBEDDED_CONFIG)?;

        if let Some(address) = option_env!("FLARE_PREDICT_CONTRACT") {
            config.contract.address = address.to_string();
        }
        if let Some(url) = option_env!("FLARE_PREDICT_RPC_URL") {
            config.network.rpc_url = url.to_string();
        }
        if let Some(level) = option_env!("FLARE_PREDICT_LOG") {
            config.logging.level = level.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.settings()?;
        self.log_level()?;
        Ok(())
    }

    /// The configured contract, or `None` while it is not deployed.
    pub fn contract_address(&self) -> Result<Option<Address>, ConfigError> {
        let raw = self.contract.address.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        Address::from_str(raw)
            .map(Some)
            .map_err(|_| ConfigError::InvalidAddress(raw.to_string()))
    }

    pub fn min_bet_wei(&self) -> Result<U256, ConfigError> {
        crate::format::parse_amount(&self.market.min_bet)
            .ok_or_else(|| ConfigError::InvalidAmount(self.market.min_bet.clone()))
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.logging.level)
            .map_err(|_| ConfigError::InvalidLevel(self.logging.level.clone()))
    }

    pub fn rpc_url(&self) -> Option<&str> {
        let url = self.network.rpc_url.trim();
        (!url.is_empty()).then_some(url)
    }

    /// Typed, validated view of the config used at runtime.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        Ok(Settings {
            contract_address: self.contract_address()?,
            network_name: self.network.name.clone(),
            symbol: self.network.symbol.clone(),
            rpc_url: self.rpc_url().map(str::to_string),
            min_bet: self.min_bet_wei()?,
            min_bet_label: self.market.min_bet.trim().to_string(),
            refresh_interval: Duration::from_millis(self.market.refresh_interval_ms),
            auto_refresh: self.market.auto_refresh,
            receipt_poll: Duration::from_millis(self.market.receipt_poll_ms),
            wallet_poll_interval: Duration::from_millis(self.wallet.poll_interval_ms),
            wallet_poll_attempts: self.wallet.poll_attempts,
            auto_connect: self.wallet.auto_connect,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub contract_address: Option<Address>,
    pub network_name: String,
    pub symbol: String,
    pub rpc_url: Option<String>,
    pub min_bet: U256,
    /// `min_bet` as written in the config, for messages.
    pub min_bet_label: String,
    pub refresh_interval: Duration,
    pub auto_refresh: bool,
    pub receipt_poll: Duration,
    pub wallet_poll_interval: Duration,
    pub wallet_poll_attempts: u32,
    pub auto_connect: bool,
}
