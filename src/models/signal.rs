use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::indicators::Bias;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalDirection {
    Long,
    Short,
}

impl SignalDirection {
    pub fn from_bias(bias: Bias) -> Option<Self> {
        match bias {
            Bias::Bullish => Some(SignalDirection::Long),
            Bias::Bearish => Some(SignalDirection::Short),
            Bias::Neutral => None,
        }
    }

    pub fn bias(self) -> Bias {
        match self {
            SignalDirection::Long => Bias::Bullish,
            SignalDirection::Short => Bias::Bearish,
        }
    }

    /// +1 for long, -1 for short. Multiplies a distance into a price offset.
    pub fn sign(self) -> f64 {
        match self {
            SignalDirection::Long => 1.0,
            SignalDirection::Short => -1.0,
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Long => write!(f, "LONG"),
            SignalDirection::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    VolumeSpike,
    DomImbalance,
    MacdCrossover,
    RsiExtreme,
    CandlePattern,
    Bos,
    Choch,
    StrongTrend,
    BollingerBreakout,
    StochRsi,
    AdxStrong,
}

impl TriggerKind {
    pub fn weight(self) -> u32 {
        match self {
            TriggerKind::Choch => 3,
            TriggerKind::VolumeSpike
            | TriggerKind::DomImbalance
            | TriggerKind::MacdCrossover
            | TriggerKind::CandlePattern
            | TriggerKind::Bos
            | TriggerKind::StrongTrend => 2,
            TriggerKind::RsiExtreme
            | TriggerKind::BollingerBreakout
            | TriggerKind::StochRsi
            | TriggerKind::AdxStrong => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::VolumeSpike => "volume_spike",
            TriggerKind::DomImbalance => "dom_imbalance",
            TriggerKind::MacdCrossover => "macd_crossover",
            TriggerKind::RsiExtreme => "rsi_extreme",
            TriggerKind::CandlePattern => "candle_pattern",
            TriggerKind::Bos => "bos",
            TriggerKind::Choch => "choch",
            TriggerKind::StrongTrend => "strong_trend",
            TriggerKind::BollingerBreakout => "bollinger_breakout",
            TriggerKind::StochRsi => "stoch_rsi",
            TriggerKind::AdxStrong => "adx_strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
    Standard,
    Sniper,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TakeProfit {
    pub price: f64,
    /// Share of the position closed at this level, in percent.
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingStop {
    pub enabled: bool,
    pub activation_price: f64,
    pub trail_distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub exchange: String,
    pub mode: SignalMode,
    pub direction: SignalDirection,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profits: [TakeProfit; 3],
    pub risk_reward: f64,
    pub confidence: f64,
    pub leverage: u32,
    pub timeframe: String,
    pub triggers: Vec<TriggerKind>,
    pub expires_at: DateTime<Utc>,
    pub trailing_stop: TrailingStop,
}

impl Signal {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn stop_distance(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }
}
