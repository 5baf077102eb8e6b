//! Trigger detection: discrete reasons to act on the current bar.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::patterns::is_strong;
use crate::models::indicators::{Bias, BollingerPosition, IndicatorSnapshot, OscillatorState};
use crate::models::market::{DomData, VolumeData};
use crate::models::signal::SignalDirection;
pub use crate::models::signal::TriggerKind;
use crate::models::structure::StructureSnapshot;

pub const DOM_IMBALANCE_THRESHOLD: f64 = 50.0;
pub const STRONG_TREND_THRESHOLD: i32 = 60;
/// Accumulated weight a side needs to claim the direction.
pub const MIN_DIRECTION_WEIGHT: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStrength {
    Weak,
    Moderate,
    Strong,
}

impl TriggerStrength {
    pub fn from_total(total: u32) -> Self {
        if total < 4 {
            TriggerStrength::Weak
        } else if total < 7 {
            TriggerStrength::Moderate
        } else {
            TriggerStrength::Strong
        }
    }

    /// Added to the generator's base confidence.
    pub fn confidence_bonus(self) -> f64 {
        match self {
            TriggerStrength::Strong => 0.10,
            TriggerStrength::Moderate => 0.05,
            TriggerStrength::Weak => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub polarity: Bias,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerVerdict {
    pub triggered: bool,
    pub triggers: Vec<Trigger>,
    pub direction: Option<SignalDirection>,
    pub strength: TriggerStrength,
    pub bullish_weight: u32,
    pub bearish_weight: u32,
}

impl TriggerVerdict {
    pub fn kinds(&self) -> Vec<TriggerKind> {
        self.triggers.iter().map(|t| t.kind).collect()
    }

    pub fn contains(&self, kind: TriggerKind) -> bool {
        self.triggers.iter().any(|t| t.kind == kind)
    }
}

pub struct TriggerSystem;

impl TriggerSystem {
    pub fn detect(
        indicators: &IndicatorSnapshot,
        structure: &StructureSnapshot,
        volume: &VolumeData,
        dom: &DomData,
    ) -> TriggerVerdict {
        let mut fired: Vec<(TriggerKind, Bias)> = Vec::new();

        if volume.volume_spike {
            let polarity = match volume.volume_pressure.bias() {
                Bias::Neutral => volume.cvd_direction,
                bias => bias,
            };
            fired.push((TriggerKind::VolumeSpike, polarity));
        }

        if dom.pressure_score.abs() > DOM_IMBALANCE_THRESHOLD {
            let polarity = if dom.pressure_score > 0.0 {
                Bias::Bullish
            } else {
                Bias::Bearish
            };
            fired.push((TriggerKind::DomImbalance, polarity));
        }

        if let Some(cross) = indicators.macd.crossover {
            fired.push((TriggerKind::MacdCrossover, cross));
        }

        match indicators.rsi.state {
            OscillatorState::Oversold => fired.push((TriggerKind::RsiExtreme, Bias::Bullish)),
            OscillatorState::Overbought => fired.push((TriggerKind::RsiExtreme, Bias::Bearish)),
            OscillatorState::Neutral => {}
        }

        if let Some(pattern) = indicators.patterns.iter().copied().find(|p| is_strong(*p)) {
            fired.push((TriggerKind::CandlePattern, pattern.bias()));
        }

        if let Some(bos) = structure.bos {
            fired.push((TriggerKind::Bos, bos));
        }

        if let Some(choch) = structure.choch {
            fired.push((TriggerKind::Choch, choch));
        }

        if indicators.trend_score.abs() > STRONG_TREND_THRESHOLD {
            let polarity = if indicators.trend_score > 0 {
                Bias::Bullish
            } else {
                Bias::Bearish
            };
            fired.push((TriggerKind::StrongTrend, polarity));
        }

        match indicators.bollinger.position {
            BollingerPosition::AboveUpper => {
                fired.push((TriggerKind::BollingerBreakout, Bias::Bullish))
            }
            BollingerPosition::BelowLower => {
                fired.push((TriggerKind::BollingerBreakout, Bias::Bearish))
            }
            _ => {}
        }

        match indicators.stoch_rsi.state {
            OscillatorState::Oversold => fired.push((TriggerKind::StochRsi, Bias::Bullish)),
            OscillatorState::Overbought => fired.push((TriggerKind::StochRsi, Bias::Bearish)),
            OscillatorState::Neutral => {}
        }

        if indicators.adx.strength.is_trending() {
            fired.push((TriggerKind::AdxStrong, indicators.adx.direction));
        }

        let verdict = Self::summarize(fired);

        debug!(
            triggered = verdict.triggered,
            direction = ?verdict.direction,
            strength = ?verdict.strength,
            bullish = verdict.bullish_weight,
            bearish = verdict.bearish_weight,
            kinds = ?verdict.kinds(),
            "TriggerSystem: evaluated {} triggers",
            verdict.triggers.len()
        );

        verdict
    }

    /// Accumulate weights per side and derive direction and strength.
    pub fn summarize(fired: Vec<(TriggerKind, Bias)>) -> TriggerVerdict {
        let mut bullish_weight = 0;
        let mut bearish_weight = 0;
        let triggers: Vec<Trigger> = fired
            .into_iter()
            .map(|(kind, polarity)| {
                let weight = kind.weight();
                match polarity {
                    Bias::Bullish => bullish_weight += weight,
                    Bias::Bearish => bearish_weight += weight,
                    Bias::Neutral => {}
                }
                Trigger {
                    kind,
                    polarity,
                    weight,
                }
            })
            .collect();

        let direction = if bullish_weight > bearish_weight && bullish_weight >= MIN_DIRECTION_WEIGHT {
            Some(SignalDirection::Long)
        } else if bearish_weight > bullish_weight && bearish_weight >= MIN_DIRECTION_WEIGHT {
            Some(SignalDirection::Short)
        } else {
            None
        };

        TriggerVerdict {
            triggered: !triggers.is_empty(),
            triggers,
            direction,
            strength: TriggerStrength::from_total(bullish_weight + bearish_weight),
            bullish_weight,
            bearish_weight,
        }
    }
}
