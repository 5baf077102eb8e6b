//! Market snapshots supplied by collaborators (order flow, order book,
//! higher timeframes, sentiment).

use serde::{Deserialize, Serialize};

use crate::models::indicators::Bias;
use crate::models::signal::SignalDirection;

/// Buy/sell pressure bucket reported by the volume and DOM feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PressureBucket {
    StrongBuy,
    Buy,
    #[default]
    Neutral,
    Sell,
    StrongSell,
}

impl PressureBucket {
    pub fn bias(self) -> Bias {
        match self {
            PressureBucket::StrongBuy | PressureBucket::Buy => Bias::Bullish,
            PressureBucket::StrongSell | PressureBucket::Sell => Bias::Bearish,
            PressureBucket::Neutral => Bias::Neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeData {
    pub volume_pressure: PressureBucket,
    pub delta: f64,
    pub buy_sell_ratio: f64,
    pub volume_spike: bool,
    pub cvd_direction: Bias,
}

impl Default for VolumeData {
    fn default() -> Self {
        Self {
            volume_pressure: PressureBucket::Neutral,
            delta: 0.0,
            buy_sell_ratio: 1.0,
            volume_spike: false,
            cvd_direction: Bias::Neutral,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomData {
    pub dom_signal: PressureBucket,
    /// Signed order book pressure, -100..100.
    pub pressure_score: f64,
    pub imbalance: f64,
    pub bid_walls: Vec<f64>,
    pub ask_walls: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentQuality {
    Perfect,
    Strong,
    Partial,
    Conflicting,
}

/// Multi-timeframe agreement as computed by the market context feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfAlignment {
    pub quality: AlignmentQuality,
    pub direction: Option<SignalDirection>,
    pub timeframes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentData {
    pub long_short_ratio: f64,
}
