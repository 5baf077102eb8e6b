//! Smart-money market structure models.

use serde::{Deserialize, Serialize};

use crate::models::indicators::Bias;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    pub direction: Bias,
    /// Index of the candle forming the block.
    pub index: usize,
    pub high: f64,
    pub low: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    pub direction: Bias,
    /// Index of the third candle of the gap.
    pub index: usize,
    pub top: f64,
    pub bottom: f64,
    pub size: f64,
}

/// Five-level ordinal structure bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StructureBias {
    StrongBearish,
    Bearish,
    #[default]
    Neutral,
    Bullish,
    StrongBullish,
}

impl StructureBias {
    pub fn from_score(score: i32) -> Self {
        if score >= 3 {
            StructureBias::StrongBullish
        } else if score >= 1 {
            StructureBias::Bullish
        } else if score <= -3 {
            StructureBias::StrongBearish
        } else if score <= -1 {
            StructureBias::Bearish
        } else {
            StructureBias::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StructureBias::StrongBearish => "strong_bearish",
            StructureBias::Bearish => "bearish",
            StructureBias::Neutral => "neutral",
            StructureBias::Bullish => "bullish",
            StructureBias::StrongBullish => "strong_bullish",
        }
    }

    /// Collapses the ordinal to a direction.
    pub fn direction(self) -> Bias {
        match self {
            StructureBias::StrongBullish | StructureBias::Bullish => Bias::Bullish,
            StructureBias::StrongBearish | StructureBias::Bearish => Bias::Bearish,
            StructureBias::Neutral => Bias::Neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureSnapshot {
    pub trend: Bias,
    pub bos: Option<Bias>,
    pub choch: Option<Bias>,
    pub order_blocks: Vec<OrderBlock>,
    pub fair_value_gaps: Vec<FairValueGap>,
    pub swing_highs: Vec<SwingPoint>,
    pub swing_lows: Vec<SwingPoint>,
    pub bias: StructureBias,
    pub bias_score: i32,
}

impl StructureSnapshot {
    pub fn neutral() -> Self {
        Self {
            trend: Bias::Neutral,
            bos: None,
            choch: None,
            order_blocks: Vec::new(),
            fair_value_gaps: Vec::new(),
            swing_highs: Vec::new(),
            swing_lows: Vec::new(),
            bias: StructureBias::Neutral,
            bias_score: 0,
        }
    }
}
