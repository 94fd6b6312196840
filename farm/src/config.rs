//! Farm configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use dao_types::{AccountId, AssetId, Timestamp, TokenAmount, SECS_PER_DAY};
use dao_utils::LogFormat;

use crate::farm::Farm;
use crate::schedule::RewardSchedule;
use crate::sink::{RewardSink, TokenMinter};
use crate::FarmError;

/// Configuration for a farm and its governance token.
///
/// Token quantities are whole tokens; they are scaled to raw 18-decimal units
/// when the token and schedule are built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Hard cap of the governance token, equal to the total scheduled reward.
    #[serde(default = "default_max_supply")]
    pub max_supply: u64,

    /// Reward of the first period; each later period pays half the previous one.
    #[serde(default = "default_first_period_reward")]
    pub first_period_reward: u64,

    #[serde(default = "default_period_count")]
    pub period_count: usize,

    #[serde(default = "default_period_days")]
    pub period_days: u64,

    /// Unix seconds at which the first period starts; `0` means when the farm is built.
    #[serde(default)]
    pub schedule_start: u64,

    /// Account that holds the mint authority over the token.
    #[serde(default = "default_farm_account")]
    pub farm_account: String,

    /// Supported LP assets, as `0x`-prefixed addresses.
    #[serde(default)]
    pub assets: Vec<String>,

    /// `"human"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_token_symbol() -> String {
    "DAO".into()
}

fn default_max_supply() -> u64 {
    1_000_000
}

fn default_first_period_reward() -> u64 {
    500_000
}

fn default_period_count() -> usize {
    10
}

fn default_period_days() -> u64 {
    365
}

fn default_farm_account() -> String {
    "0x00000000000000000000000000000000000000fa".into()
}

fn default_log_format() -> String {
    "human".into()
}

fn default_log_level() -> String {
    "info".into()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl FarmConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, FarmError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| FarmError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, FarmError> {
        toml::from_str(s).map_err(|e| FarmError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, FarmError> {
        toml::to_string_pretty(self).map_err(|e| FarmError::Config(e.to_string()))
    }

    /// Token cap in raw units.
    pub fn max_supply_raw(&self) -> Result<u128, FarmError> {
        to_raw(self.max_supply)
    }

    pub fn parse_assets(&self) -> Result<Vec<AssetId>, FarmError> {
        self.assets
            .iter()
            .map(|a| AssetId::parse(a).map_err(|e| FarmError::Config(e.to_string())))
            .collect()
    }

    pub fn farm_account(&self) -> Result<AccountId, FarmError> {
        AccountId::parse(&self.farm_account).map_err(|e| FarmError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, FarmError> {
        self.log_format
            .parse()
            .map_err(|e: dao_utils::LoggingError| FarmError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber with the configured format and level.
    pub fn init_logging(&self) -> Result<(), FarmError> {
        dao_utils::init_logging(self.log_format()?, &self.log_level)
            .map_err(|e| FarmError::Config(e.to_string()))
    }

    /// The halving schedule described by this configuration.
    pub fn build_schedule(&self, now: Timestamp) -> Result<RewardSchedule, FarmError> {
        let start = if self.schedule_start == 0 {
            now
        } else {
            Timestamp::new(self.schedule_start)
        };
        let period_secs = self
            .period_days
            .checked_mul(SECS_PER_DAY)
            .ok_or_else(|| FarmError::Config(format!("period_days {} is too large", self.period_days)))?;
        RewardSchedule::halving(
            start,
            period_secs,
            self.period_count,
            to_raw(self.first_period_reward)?,
            self.max_supply_raw()?,
        )
    }

    /// A fresh token whose minter is the configured farm account.
    pub fn build_token(&self) -> Result<TokenMinter, FarmError> {
        TokenMinter::new(self.token_symbol.clone(), self.max_supply_raw()?, self.farm_account()?)
    }

    /// A farm paying into `sink` with the configured assets and schedule installed.
    pub fn build_farm<S: RewardSink>(&self, sink: S, now: Timestamp) -> Result<Farm<S>, FarmError> {
        let assets = self.parse_assets()?;
        let schedule = self.build_schedule(now)?;
        let mut farm = Farm::new(sink);
        farm.add_assets(&assets, now)?;
        farm.add_reward_periods(schedule, now)?;
        tracing::info!(
            symbol = %self.token_symbol,
            max_supply = %TokenAmount::new(self.max_supply_raw()?),
            assets = assets.len(),
            "farm built from config"
        );
        Ok(farm)
    }
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            token_symbol: default_token_symbol(),
            max_supply: default_max_supply(),
            first_period_reward: default_first_period_reward(),
            period_count: default_period_count(),
            period_days: default_period_days(),
            schedule_start: 0,
            farm_account: default_farm_account(),
            assets: Vec::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

fn to_raw(whole_tokens: u64) -> Result<u128, FarmError> {
    TokenAmount::from_tokens(whole_tokens as u128)
        .map(|a| a.raw())
        .ok_or(FarmError::Overflow)
}
