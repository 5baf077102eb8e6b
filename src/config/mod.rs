//! Pipeline configuration.
//!
//! Defaults carry the production thresholds; `from_env` applies overrides
//! from the process environment (load `.env` with `dotenvy` first).

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::indicators::MIN_CANDLES;
use crate::signals::confluence::ConfluenceMode;
use crate::signals::risk::PLATFORM_MAX_LEVERAGE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("{key} out of range: {reason}")]
    OutOfRange { key: String, reason: String },
}

/// Deployment environment (`production`, `sandbox`, ...). Defaults to sandbox.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT")
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SniperConfig {
    pub min_risk_reward: f64,
    /// LONG is rejected when the crowd is more long than this.
    pub max_long_short_ratio: f64,
    /// SHORT is rejected when the crowd is more short than this.
    pub min_long_short_ratio: f64,
    pub macro_timeframes: Vec<String>,
    pub alignment_timeframes: Vec<String>,
}

impl Default for SniperConfig {
    fn default() -> Self {
        Self {
            min_risk_reward: 2.5,
            max_long_short_ratio: 2.5,
            min_long_short_ratio: 0.4,
            macro_timeframes: vec!["1h".to_string(), "4h".to_string()],
            alignment_timeframes: ["5m", "15m", "1h", "4h"]
                .iter()
                .map(|tf| tf.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Never below the indicator engine's own minimum.
    pub min_candles: usize,
    /// Gate used by the standard generator; `Strict` or `Relaxed`.
    pub confluence_mode: ConfluenceMode,
    pub min_confidence: f64,
    pub signal_expiry_minutes: i64,
    pub max_leverage: u32,
    pub exchange: String,
    pub sniper: SniperConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_candles: MIN_CANDLES,
            confluence_mode: ConfluenceMode::Strict,
            min_confidence: 0.65,
            signal_expiry_minutes: 30,
            max_leverage: PLATFORM_MAX_LEVERAGE,
            exchange: "binance".to_string(),
            sniper: SniperConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = env_parse("SIGNAL_MIN_CONFIDENCE")? {
            config.min_confidence = v;
        }
        if let Some(v) = env_parse("SIGNAL_EXPIRY_MINUTES")? {
            config.signal_expiry_minutes = v;
        }
        if let Some(v) = env_parse("PLATFORM_MAX_LEVERAGE")? {
            config.max_leverage = v;
        }
        if let Ok(exchange) = env::var("SIGNAL_EXCHANGE") {
            config.exchange = exchange;
        }
        if let Some(v) = env_parse("SNIPER_MIN_RISK_REWARD")? {
            config.sniper.min_risk_reward = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_candles < MIN_CANDLES {
            return Err(out_of_range(
                "min_candles",
                &format!("must be at least {}", MIN_CANDLES),
            ));
        }
        if self.confluence_mode == ConfluenceMode::Sniper {
            return Err(out_of_range(
                "confluence_mode",
                "sniper confluence is reserved for the sniper orchestrator",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(out_of_range("SIGNAL_MIN_CONFIDENCE", "must be within [0, 1]"));
        }
        if self.signal_expiry_minutes <= 0 {
            return Err(out_of_range("SIGNAL_EXPIRY_MINUTES", "must be positive"));
        }
        if self.max_leverage == 0 || self.max_leverage > PLATFORM_MAX_LEVERAGE {
            return Err(out_of_range(
                "PLATFORM_MAX_LEVERAGE",
                &format!("must be within 1..={}", PLATFORM_MAX_LEVERAGE),
            ));
        }
        if self.sniper.min_risk_reward <= 0.0 {
            return Err(out_of_range("SNIPER_MIN_RISK_REWARD", "must be positive"));
        }
        if self.sniper.min_long_short_ratio >= self.sniper.max_long_short_ratio {
            return Err(out_of_range(
                "sniper.long_short_ratio",
                "minimum must be below maximum",
            ));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

fn out_of_range(key: &str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
