//! Standard signal pipeline.
//!
//! `START → INDICATORS → STRUCTURE → CONFLUENCE → TRIGGERS → LEVELS →
//! CONFIDENCE → VALIDATE → EMIT`. Any gate can end the run with a typed
//! [`Rejection`]; whatever was computed up to that point is returned in
//! [`Diagnostics`] either way.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::indicators::{IndicatorEngine, IndicatorError};
use crate::models::indicators::{Candle, IndicatorSnapshot};
use crate::models::market::{AlignmentQuality, DomData, MtfAlignment, SentimentData, VolumeData};
use crate::models::signal::{Signal, SignalDirection, SignalMode};
use crate::models::structure::StructureSnapshot;
use crate::signals::confidence::{ConfidenceInputs, ConfidenceScore, ConfidenceScorer};
use crate::signals::confluence::{
    ConfluenceChecker, ConfluenceInputs, ConfluenceMode, ConfluenceVerdict,
};
use crate::signals::id::SignalIdSequence;
use crate::signals::levels::{PriceLevels, STANDARD_PLAN};
use crate::signals::risk::{RiskAssessment, RiskManager, RiskValidation, RiskViolation};
use crate::signals::sniper::{MacroTrend, SniperLevel};
use crate::signals::triggers::{TriggerSystem, TriggerVerdict};
use crate::structure::StructureAnalyzer;

pub const STANDARD_BASE_CONFIDENCE: f64 = 0.70;
pub const STANDARD_SCORE_WEIGHT: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Start,
    Indicators,
    Structure,
    Confluence,
    Triggers,
    Levels,
    Confidence,
    Validate,
    Emit,
    Sniper(SniperLevel),
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Start => "start",
            PipelineStage::Indicators => "indicators",
            PipelineStage::Structure => "structure",
            PipelineStage::Confluence => "confluence",
            PipelineStage::Triggers => "triggers",
            PipelineStage::Levels => "levels",
            PipelineStage::Confidence => "confidence",
            PipelineStage::Validate => "validate",
            PipelineStage::Emit => "emit",
            PipelineStage::Sniper(level) => level.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("insufficient candles: {actual} supplied, at least {required} required")]
    InsufficientCandles { required: usize, actual: usize },

    #[error("indicator computation failed: {message}")]
    IndicatorFailure { message: String },

    #[error("structure analysis failed: {message}")]
    StructureFailure { message: String },

    #[error("{} confluence failed: {matched} matched, {mismatched} mismatched", .mode.as_str())]
    ConfluenceFailed {
        mode: ConfluenceMode,
        matched: usize,
        mismatched: usize,
    },

    #[error("no triggers fired")]
    NoTriggers,

    #[error("confluence produced no direction")]
    UndefinedDirection,

    #[error("trigger direction {} conflicts with confluence direction {confluence}", direction_label(.triggers))]
    DirectionConflict {
        confluence: SignalDirection,
        triggers: Option<SignalDirection>,
    },

    #[error("confidence {confidence:.3} below threshold {threshold:.2}")]
    LowConfidence { confidence: f64, threshold: f64 },

    #[error("risk validation failed: {}", join_violations(.violations))]
    RiskRejected { violations: Vec<RiskViolation> },

    #[error("sniper level 1: no BOS or CHoCH confirming {direction}")]
    MissingStructureConfirmation { direction: SignalDirection },

    #[error("sniper level 2: {timeframe} macro trend opposes {direction}")]
    MacroTrendOpposed {
        timeframe: String,
        direction: SignalDirection,
    },

    #[error("sniper level 3: risk:reward {ratio:.2} below {min:.2}")]
    RiskRewardTooLow { ratio: f64, min: f64 },

    #[error("sniper level 4: timeframes not aligned ({quality:?}, direction {})", direction_label(.aligned))]
    TimeframesNotAligned {
        quality: AlignmentQuality,
        aligned: Option<SignalDirection>,
    },

    #[error("sniper level 5: long/short ratio {ratio:.2} too crowded for {direction} (limit {limit:.2})")]
    CrowdedSentiment {
        direction: SignalDirection,
        ratio: f64,
        limit: f64,
    },
}

fn direction_label(direction: &Option<SignalDirection>) -> String {
    direction.map_or_else(|| "none".to_string(), |d| d.to_string())
}

fn join_violations(violations: &[RiskViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("rejected at {}: {reason}", .stage.as_str())]
pub struct Rejection {
    pub stage: PipelineStage,
    pub reason: RejectReason,
}

impl Rejection {
    pub fn new(stage: PipelineStage, reason: RejectReason) -> Self {
        Self { stage, reason }
    }
}

/// Snapshots computed before the run ended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub indicators: Option<IndicatorSnapshot>,
    pub structure: Option<StructureSnapshot>,
    pub confluence: Option<ConfluenceVerdict>,
    pub triggers: Option<TriggerVerdict>,
    pub risk: Option<RiskAssessment>,
    pub levels: Option<PriceLevels>,
    pub confidence: Option<ConfidenceScore>,
    pub validation: Option<RiskValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub macro_trends: Vec<MacroTrend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<MtfAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub outcome: Result<Signal, Rejection>,
    pub diagnostics: Diagnostics,
}

impl Evaluation {
    pub fn signal(&self) -> Option<&Signal> {
        self.outcome.as_ref().ok()
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        self.outcome.as_ref().err()
    }

    pub fn is_emitted(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// One symbol/timeframe window plus the order-flow snapshots for its last bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRequest {
    pub symbol: String,
    pub timeframe: String,
    pub candles: Vec<Candle>,
    #[serde(default)]
    pub volume: VolumeData,
    #[serde(default)]
    pub dom: DomData,
}

impl SignalRequest {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            candles,
            volume: VolumeData::default(),
            dom: DomData::default(),
        }
    }

    pub fn with_volume(mut self, volume: VolumeData) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_dom(mut self, dom: DomData) -> Self {
        self.dom = dom;
        self
    }
}

/// Everything the confidence and validation stages need about a candidate.
pub(crate) struct Candidate<'a> {
    pub mode: SignalMode,
    pub direction: SignalDirection,
    pub base_confidence: f64,
    pub indicators: &'a IndicatorSnapshot,
    pub structure: &'a StructureSnapshot,
    pub confluence: &'a ConfluenceVerdict,
    pub triggers: &'a TriggerVerdict,
    pub risk: &'a RiskAssessment,
    pub levels: PriceLevels,
}

#[derive(Debug, Clone)]
pub struct SignalGenerator {
    config: PipelineConfig,
    sequence: Arc<SignalIdSequence>,
    risk: RiskManager,
}

impl SignalGenerator {
    pub fn new(config: PipelineConfig, sequence: Arc<SignalIdSequence>) -> Self {
        let risk = RiskManager::new(config.max_leverage);
        Self {
            config,
            sequence,
            risk,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn risk_manager(&self) -> &RiskManager {
        &self.risk
    }

    pub fn evaluate(&self, request: &SignalRequest) -> Evaluation {
        self.evaluate_at(request, Utc::now())
    }

    pub fn evaluate_at(&self, request: &SignalRequest, now: DateTime<Utc>) -> Evaluation {
        let mut diagnostics = Diagnostics::default();
        let outcome = self.run(request, now, &mut diagnostics);

        if let Err(rejection) = &outcome {
            debug!(
                symbol = %request.symbol,
                stage = ?rejection.stage,
                reason = %rejection.reason,
                "SignalGenerator: rejected"
            );
        }

        Evaluation {
            outcome,
            diagnostics,
        }
    }

    /// Rejects anything below the configured minimum confidence.
    pub fn confidence_gate(&self, confidence: f64) -> Result<(), RejectReason> {
        if confidence < self.config.min_confidence {
            return Err(RejectReason::LowConfidence {
                confidence,
                threshold: self.config.min_confidence,
            });
        }
        Ok(())
    }

    fn run(
        &self,
        request: &SignalRequest,
        now: DateTime<Utc>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Signal, Rejection> {
        let (indicators, structure) = self.analyze(&request.candles, diagnostics)?;

        let inputs = ConfluenceInputs {
            indicators: &indicators,
            structure: &structure,
            volume: &request.volume,
            dom: &request.dom,
        };
        let confluence = ConfluenceChecker::check(self.config.confluence_mode, &inputs);
        diagnostics.confluence = Some(confluence.clone());

        let triggers =
            TriggerSystem::detect(&indicators, &structure, &request.volume, &request.dom);
        diagnostics.triggers = Some(triggers.clone());

        let direction = directional_gate(&confluence, &triggers)
            .map_err(|(stage, reason)| Rejection::new(stage, reason))?;

        let risk = self.risk.assess(&indicators);
        diagnostics.risk = Some(risk.clone());
        let levels = STANDARD_PLAN.compute(direction, indicators.price, &indicators.atr);
        diagnostics.levels = Some(levels);
        debug!(
            direction = %direction,
            entry = levels.entry,
            stop = levels.stop_loss,
            risk_reward = levels.risk_reward,
            "SignalGenerator: levels placed"
        );

        let base_confidence = STANDARD_BASE_CONFIDENCE
            + confluence.score * STANDARD_SCORE_WEIGHT
            + triggers.strength.confidence_bonus();

        self.finish(
            Candidate {
                mode: SignalMode::Standard,
                direction,
                base_confidence,
                indicators: &indicators,
                structure: &structure,
                confluence: &confluence,
                triggers: &triggers,
                risk: &risk,
                levels,
            },
            request,
            now,
            diagnostics,
        )
    }

    /// START, INDICATORS and STRUCTURE: shared by both pipelines.
    pub(crate) fn analyze(
        &self,
        candles: &[Candle],
        diagnostics: &mut Diagnostics,
    ) -> Result<(IndicatorSnapshot, StructureSnapshot), Rejection> {
        if candles.len() < self.config.min_candles {
            return Err(Rejection::new(
                PipelineStage::Start,
                RejectReason::InsufficientCandles {
                    required: self.config.min_candles,
                    actual: candles.len(),
                },
            ));
        }

        let indicators = IndicatorEngine::compute(candles)
            .map_err(|e| Rejection::new(PipelineStage::Indicators, indicator_reason(e)))?;
        diagnostics.indicators = Some(indicators.clone());

        let structure = StructureAnalyzer::analyze(candles).map_err(|e| {
            Rejection::new(
                PipelineStage::Structure,
                RejectReason::StructureFailure {
                    message: e.to_string(),
                },
            )
        })?;
        diagnostics.structure = Some(structure.clone());

        Ok((indicators, structure))
    }

    /// CONFIDENCE, VALIDATE and EMIT.
    pub(crate) fn finish(
        &self,
        candidate: Candidate<'_>,
        request: &SignalRequest,
        now: DateTime<Utc>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Signal, Rejection> {
        let levels = candidate.levels;
        let score = ConfidenceScorer::score(
            candidate.base_confidence,
            &ConfidenceInputs {
                direction: candidate.direction,
                indicators: candidate.indicators,
                structure: candidate.structure,
                confluence: candidate.confluence,
                risk_reward: levels.risk_reward,
            },
        );
        let confidence = score.value;
        diagnostics.confidence = Some(score);

        self.confidence_gate(confidence)
            .map_err(|reason| Rejection::new(PipelineStage::Confidence, reason))?;

        let leverage = candidate.risk.recommended_leverage;
        let validation = self.risk.validate_signal(
            candidate.direction,
            levels.entry,
            levels.stop_loss,
            &levels.take_profits,
            leverage,
            candidate.risk.recommended_leverage,
        );
        for warning in &validation.warnings {
            debug!(symbol = %request.symbol, warning = %warning, "SignalGenerator: risk warning");
        }
        diagnostics.validation = Some(validation.clone());

        if !validation.is_valid() {
            return Err(Rejection::new(
                PipelineStage::Validate,
                RejectReason::RiskRejected {
                    violations: validation.errors,
                },
            ));
        }

        let signal = Signal {
            id: self.sequence.next_id(now),
            timestamp: now,
            symbol: request.symbol.clone(),
            exchange: self.config.exchange.clone(),
            mode: candidate.mode,
            direction: candidate.direction,
            entry_price: levels.entry,
            stop_loss: levels.stop_loss,
            take_profits: levels.take_profits,
            risk_reward: levels.risk_reward,
            confidence,
            leverage,
            timeframe: request.timeframe.clone(),
            triggers: candidate.triggers.kinds(),
            expires_at: now + Duration::minutes(self.config.signal_expiry_minutes),
            trailing_stop: levels.trailing_stop(),
        };

        info!(
            id = %signal.id,
            symbol = %signal.symbol,
            mode = ?signal.mode,
            direction = %signal.direction,
            entry = signal.entry_price,
            stop = signal.stop_loss,
            confidence = signal.confidence,
            leverage = signal.leverage,
            "SignalGenerator: signal emitted"
        );

        Ok(signal)
    }
}

/// Confluence must pass, at least one trigger must fire, and the trigger
/// side must match the confluence side.
pub(crate) fn directional_gate(
    confluence: &ConfluenceVerdict,
    triggers: &TriggerVerdict,
) -> Result<SignalDirection, (PipelineStage, RejectReason)> {
    if !confluence.passed {
        return Err((
            PipelineStage::Confluence,
            RejectReason::ConfluenceFailed {
                mode: confluence.mode,
                matched: confluence.matched_factors.len(),
                mismatched: confluence.mismatched_factors.len(),
            },
        ));
    }
    if !triggers.triggered {
        return Err((PipelineStage::Triggers, RejectReason::NoTriggers));
    }
    let Some(direction) = confluence.direction else {
        return Err((PipelineStage::Confluence, RejectReason::UndefinedDirection));
    };
    if triggers.direction != Some(direction) {
        return Err((
            PipelineStage::Triggers,
            RejectReason::DirectionConflict {
                confluence: direction,
                triggers: triggers.direction,
            },
        ));
    }
    Ok(direction)
}

fn indicator_reason(error: IndicatorError) -> RejectReason {
    match error {
        IndicatorError::InsufficientData { required, actual } => {
            RejectReason::InsufficientCandles { required, actual }
        }
        other => RejectReason::IndicatorFailure {
            message: other.to_string(),
        },
    }
}
