//! Additive confidence scoring.
//!
//! Every adjustment is computed from the inputs alone, never from another
//! adjustment, so the final value is the base plus an order-free sum.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::math;
use crate::models::indicators::{Bias, IndicatorSnapshot, OscillatorState, VolatilityLevel};
use crate::models::signal::SignalDirection;
use crate::models::structure::StructureSnapshot;
use crate::signals::confluence::{ConfluenceVerdict, TREND_FACTOR_THRESHOLD};

pub const STRONG_RISK_REWARD: f64 = 3.0;
pub const WEAK_RISK_REWARD: f64 = 1.5;
pub const MISMATCH_PENALTY: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    TrendAligned,
    TrendOpposed,
    SupertrendAligned,
    SupertrendOpposed,
    StructureAligned,
    StructureOpposed,
    BosConfirms,
    ChochConfirms,
    AdxTrending,
    MacdCrossConfirms,
    RsiExtremeConfirms,
    RiskRewardStrong,
    RiskRewardWeak,
    ConfluencePassed,
    MismatchedFactors,
    HighVolatility,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAdjustment {
    pub reason: AdjustmentReason,
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub base: f64,
    /// Clamped to [0, 1] and rounded to three decimals.
    pub value: f64,
    pub adjustments: Vec<ConfidenceAdjustment>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInputs<'a> {
    pub direction: SignalDirection,
    pub indicators: &'a IndicatorSnapshot,
    pub structure: &'a StructureSnapshot,
    pub confluence: &'a ConfluenceVerdict,
    pub risk_reward: f64,
}

pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn score(base: f64, inputs: &ConfidenceInputs<'_>) -> ConfidenceScore {
        let adjustments = Self::adjustments(inputs);
        for adjustment in &adjustments {
            debug!(
                reason = ?adjustment.reason,
                delta = adjustment.delta,
                "ConfidenceScorer: adjustment"
            );
        }

        let total: f64 = adjustments.iter().map(|a| a.delta).sum();
        let value = math::round_to((base + total).clamp(0.0, 1.0), 3);

        ConfidenceScore {
            base,
            value,
            adjustments,
        }
    }

    pub fn adjustments(inputs: &ConfidenceInputs<'_>) -> Vec<ConfidenceAdjustment> {
        use AdjustmentReason::*;

        let side = inputs.direction.bias();
        let against = side.opposite();
        let indicators = inputs.indicators;
        let structure = inputs.structure;

        let mut out = Vec::new();
        let mut push = |reason, delta| out.push(ConfidenceAdjustment { reason, delta });

        let trend = indicators.trend_score * side.sign();
        if trend > TREND_FACTOR_THRESHOLD {
            push(TrendAligned, 0.05);
        } else if trend < -TREND_FACTOR_THRESHOLD {
            push(TrendOpposed, -0.15);
        }

        if indicators.supertrend.direction == side {
            push(SupertrendAligned, 0.05);
        } else if indicators.supertrend.direction == against {
            push(SupertrendOpposed, -0.10);
        }

        let structure_side = structure.bias.direction();
        if structure_side == side {
            push(StructureAligned, 0.08);
        } else if structure_side == against {
            push(StructureOpposed, -0.10);
        }

        if structure.bos == Some(side) {
            push(BosConfirms, 0.03);
        }
        if structure.choch == Some(side) {
            push(ChochConfirms, 0.05);
        }

        if indicators.adx.strength.is_trending() {
            push(AdxTrending, 0.05);
        }

        if indicators.macd.crossover == Some(side) {
            push(MacdCrossConfirms, 0.03);
        }

        let rsi_agrees = matches!(
            (side, indicators.rsi.state),
            (Bias::Bullish, OscillatorState::Oversold) | (Bias::Bearish, OscillatorState::Overbought)
        );
        if rsi_agrees {
            push(RsiExtremeConfirms, 0.02);
        }

        if inputs.risk_reward >= STRONG_RISK_REWARD {
            push(RiskRewardStrong, 0.05);
        } else if inputs.risk_reward < WEAK_RISK_REWARD {
            push(RiskRewardWeak, -0.10);
        }

        if inputs.confluence.passed {
            push(ConfluencePassed, 0.05);
        }

        let mismatched = inputs.confluence.mismatched_factors.len();
        if mismatched > 0 {
            push(MismatchedFactors, -MISMATCH_PENALTY * mismatched as f64);
        }

        if indicators.atr.volatility == VolatilityLevel::High {
            push(HighVolatility, -0.03);
        }

        out
    }
}
