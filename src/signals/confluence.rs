//! Multi-factor confluence gating (strict, relaxed and sniper variants).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::indicators::{Bias, IndicatorSnapshot};
use crate::models::market::{DomData, VolumeData};
use crate::models::signal::SignalDirection;
use crate::models::structure::StructureSnapshot;

/// Trend score beyond which the trend factor takes a side.
pub const TREND_FACTOR_THRESHOLD: i32 = 30;

// Relaxed-mode weighting. Pinned values; tests assert them directly.
pub const RELAXED_ADX_BONUS: f64 = 0.5;
pub const RELAXED_MIN_SCORE: f64 = 3.0;
pub const RELAXED_DOMINANCE_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfluenceFactor {
    Trend,
    Supertrend,
    Volume,
    Dom,
    Structure,
    /// Only contributes in relaxed mode.
    Adx,
}

impl ConfluenceFactor {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfluenceFactor::Trend => "trend",
            ConfluenceFactor::Supertrend => "supertrend",
            ConfluenceFactor::Volume => "volume",
            ConfluenceFactor::Dom => "dom",
            ConfluenceFactor::Structure => "structure",
            ConfluenceFactor::Adx => "adx",
        }
    }

    /// Factors whose disagreement vetoes a three-match pass.
    pub fn is_load_bearing(self) -> bool {
        matches!(self, ConfluenceFactor::Structure | ConfluenceFactor::Volume)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfluenceMode {
    Strict,
    Relaxed,
    Sniper,
}

impl ConfluenceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfluenceMode::Strict => "strict",
            ConfluenceMode::Relaxed => "relaxed",
            ConfluenceMode::Sniper => "sniper",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfluenceVerdict {
    pub mode: ConfluenceMode,
    pub passed: bool,
    /// Dominant side; `None` when the sides tie.
    pub direction: Option<SignalDirection>,
    pub matched_factors: Vec<ConfluenceFactor>,
    pub mismatched_factors: Vec<ConfluenceFactor>,
    pub score: f64,
    pub bullish_score: f64,
    pub bearish_score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfluenceInputs<'a> {
    pub indicators: &'a IndicatorSnapshot,
    pub structure: &'a StructureSnapshot,
    pub volume: &'a VolumeData,
    pub dom: &'a DomData,
}

/// The shared five-factor vector.
pub fn factor_readings(inputs: &ConfluenceInputs<'_>) -> [(ConfluenceFactor, Bias); 5] {
    let trend = if inputs.indicators.trend_score > TREND_FACTOR_THRESHOLD {
        Bias::Bullish
    } else if inputs.indicators.trend_score < -TREND_FACTOR_THRESHOLD {
        Bias::Bearish
    } else {
        Bias::Neutral
    };

    [
        (ConfluenceFactor::Trend, trend),
        (ConfluenceFactor::Supertrend, inputs.indicators.supertrend.direction),
        (ConfluenceFactor::Volume, inputs.volume.volume_pressure.bias()),
        (ConfluenceFactor::Dom, inputs.dom.dom_signal.bias()),
        (ConfluenceFactor::Structure, inputs.structure.bias.direction()),
    ]
}

pub struct ConfluenceChecker;

impl ConfluenceChecker {
    pub fn check(mode: ConfluenceMode, inputs: &ConfluenceInputs<'_>) -> ConfluenceVerdict {
        let verdict = match mode {
            ConfluenceMode::Strict => Self::check_strict(inputs),
            ConfluenceMode::Relaxed => Self::check_relaxed(inputs),
            ConfluenceMode::Sniper => Self::check_sniper(inputs),
        };

        debug!(
            mode = ?verdict.mode,
            passed = verdict.passed,
            direction = ?verdict.direction,
            score = verdict.score,
            matched = ?verdict.matched_factors,
            mismatched = ?verdict.mismatched_factors,
            "ConfluenceChecker: verdict"
        );

        verdict
    }

    /// Pass with ≥4 matches and ≤1 mismatch, or exactly 3 matches and ≤2
    /// mismatches when neither mismatch is `structure` or `volume`.
    pub fn check_strict(inputs: &ConfluenceInputs<'_>) -> ConfluenceVerdict {
        strict_verdict(ConfluenceMode::Strict, &factor_readings(inputs))
    }

    /// Strict first; otherwise a weighted vote where a strong or extreme ADX
    /// adds `RELAXED_ADX_BONUS` to its side. Passes when the leading side
    /// scores at least `RELAXED_MIN_SCORE` and `RELAXED_DOMINANCE_RATIO`
    /// times the other side.
    pub fn check_relaxed(inputs: &ConfluenceInputs<'_>) -> ConfluenceVerdict {
        let readings = factor_readings(inputs);
        let strict = strict_verdict(ConfluenceMode::Relaxed, &readings);
        if strict.passed {
            return strict;
        }

        let adx = &inputs.indicators.adx;
        let adx_side = if adx.strength.is_trending() {
            adx.direction
        } else {
            Bias::Neutral
        };

        let side_score = |side: Bias| {
            let factors = readings.iter().filter(|(_, bias)| *bias == side).count() as f64;
            let bonus = if adx_side == side { RELAXED_ADX_BONUS } else { 0.0 };
            factors + bonus
        };
        let bullish_score = side_score(Bias::Bullish);
        let bearish_score = side_score(Bias::Bearish);

        let (side, best, other) = if bullish_score > bearish_score {
            (Bias::Bullish, bullish_score, bearish_score)
        } else if bearish_score > bullish_score {
            (Bias::Bearish, bearish_score, bullish_score)
        } else {
            return ConfluenceVerdict {
                bullish_score,
                bearish_score,
                ..tied_verdict(ConfluenceMode::Relaxed, &readings)
            };
        };

        let (mut matched, mismatched) = partition(&readings, side);
        if adx_side == side {
            matched.push(ConfluenceFactor::Adx);
        }

        ConfluenceVerdict {
            mode: ConfluenceMode::Relaxed,
            passed: best >= RELAXED_MIN_SCORE && best >= other * RELAXED_DOMINANCE_RATIO,
            direction: SignalDirection::from_bias(side),
            matched_factors: matched,
            mismatched_factors: mismatched,
            score: best,
            bullish_score,
            bearish_score,
        }
    }

    /// The strict core. The orchestrator layers structural, macro, MTF and
    /// sentiment gates on top.
    pub fn check_sniper(inputs: &ConfluenceInputs<'_>) -> ConfluenceVerdict {
        strict_verdict(ConfluenceMode::Sniper, &factor_readings(inputs))
    }
}

fn strict_verdict(mode: ConfluenceMode, readings: &[(ConfluenceFactor, Bias)]) -> ConfluenceVerdict {
    let count = |side: Bias| readings.iter().filter(|(_, bias)| *bias == side).count();
    let bullish = count(Bias::Bullish);
    let bearish = count(Bias::Bearish);

    let side = if bullish > bearish {
        Bias::Bullish
    } else if bearish > bullish {
        Bias::Bearish
    } else {
        return tied_verdict(mode, readings);
    };

    let (matched, mismatched) = partition(readings, side);
    let passed = strict_rule(matched.len(), &mismatched);

    ConfluenceVerdict {
        mode,
        passed,
        direction: SignalDirection::from_bias(side),
        score: matched.len() as f64,
        matched_factors: matched,
        mismatched_factors: mismatched,
        bullish_score: bullish as f64,
        bearish_score: bearish as f64,
    }
}

pub fn strict_rule(matches: usize, mismatched: &[ConfluenceFactor]) -> bool {
    if matches >= 4 && mismatched.len() <= 1 {
        return true;
    }
    matches == 3
        && mismatched.len() <= 2
        && !mismatched.iter().any(|factor| factor.is_load_bearing())
}

fn partition(
    readings: &[(ConfluenceFactor, Bias)],
    side: Bias,
) -> (Vec<ConfluenceFactor>, Vec<ConfluenceFactor>) {
    let matched = readings
        .iter()
        .filter(|(_, bias)| *bias == side)
        .map(|(factor, _)| *factor)
        .collect();
    let mismatched = readings
        .iter()
        .filter(|(_, bias)| *bias != side)
        .map(|(factor, _)| *factor)
        .collect();
    (matched, mismatched)
}

fn tied_verdict(mode: ConfluenceMode, readings: &[(ConfluenceFactor, Bias)]) -> ConfluenceVerdict {
    let side_count = |side: Bias| readings.iter().filter(|(_, bias)| *bias == side).count() as f64;
    ConfluenceVerdict {
        mode,
        passed: false,
        direction: None,
        matched_factors: Vec::new(),
        mismatched_factors: readings.iter().map(|(factor, _)| *factor).collect(),
        score: 0.0,
        bullish_score: side_count(Bias::Bullish),
        bearish_score: side_count(Bias::Bearish),
    }
}
