//! Sniper mode: the standard analysis behind five fail-fast gates.
//!
//! 1. sniper confluence, trigger agreement and a BOS or CHoCH on the same side
//! 2. macro trend on the higher timeframes must not oppose
//! 3. risk:reward from the sniper level plan
//! 4. perfect multi-timeframe alignment in the same direction
//! 5. retail sentiment must not be crowded on the same side
//!
//! Gates 2 and 5 depend on collaborators and are the only suspension
//! points. A missing or failing collaborator lets its gate pass.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::indicators::IndicatorEngine;
use crate::models::indicators::Bias;
use crate::models::market::{AlignmentQuality, MtfAlignment, SentimentData};
use crate::models::signal::{Signal, SignalDirection, SignalMode};
use crate::services::market_context::{MarketContextSource, SentimentSource};
use crate::signals::confluence::{ConfluenceChecker, ConfluenceInputs, ConfluenceMode};
use crate::signals::generator::{
    directional_gate, Candidate, Diagnostics, Evaluation, PipelineStage, RejectReason, Rejection,
    SignalGenerator, SignalRequest,
};
use crate::signals::levels::SNIPER_PLAN;
use crate::signals::triggers::TriggerSystem;

pub const SNIPER_BASE_CONFIDENCE: f64 = 0.85;
pub const SNIPER_SCORE_WEIGHT: f64 = 0.03;
/// Trend score a higher timeframe needs before it counts as directional.
pub const MACRO_TREND_THRESHOLD: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SniperLevel {
    Confirmation,
    MacroTrend,
    RiskReward,
    Alignment,
    Sentiment,
}

impl SniperLevel {
    pub fn number(self) -> u8 {
        match self {
            SniperLevel::Confirmation => 1,
            SniperLevel::MacroTrend => 2,
            SniperLevel::RiskReward => 3,
            SniperLevel::Alignment => 4,
            SniperLevel::Sentiment => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SniperLevel::Confirmation => "sniper level 1 (confirmation)",
            SniperLevel::MacroTrend => "sniper level 2 (macro trend)",
            SniperLevel::RiskReward => "sniper level 3 (risk:reward)",
            SniperLevel::Alignment => "sniper level 4 (alignment)",
            SniperLevel::Sentiment => "sniper level 5 (sentiment)",
        }
    }
}

/// Trend read for one higher timeframe. `trend_score` is `None` when the
/// timeframe could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroTrend {
    pub timeframe: String,
    pub trend_score: Option<i32>,
    pub bias: Bias,
}

impl MacroTrend {
    fn unavailable(timeframe: &str) -> Self {
        Self {
            timeframe: timeframe.to_string(),
            trend_score: None,
            bias: Bias::Neutral,
        }
    }
}

fn reject(level: SniperLevel, reason: RejectReason) -> Rejection {
    Rejection::new(PipelineStage::Sniper(level), reason)
}

pub struct SniperOrchestrator {
    generator: SignalGenerator,
    market: Option<Arc<dyn MarketContextSource>>,
    sentiment: Option<Arc<dyn SentimentSource>>,
}

impl SniperOrchestrator {
    pub fn new(generator: SignalGenerator) -> Self {
        Self {
            generator,
            market: None,
            sentiment: None,
        }
    }

    pub fn with_market_context(mut self, source: Arc<dyn MarketContextSource>) -> Self {
        self.market = Some(source);
        self
    }

    pub fn with_sentiment(mut self, source: Arc<dyn SentimentSource>) -> Self {
        self.sentiment = Some(source);
        self
    }

    pub async fn evaluate(&self, request: &SignalRequest) -> Evaluation {
        self.evaluate_at(request, Utc::now()).await
    }

    pub async fn evaluate_at(&self, request: &SignalRequest, now: DateTime<Utc>) -> Evaluation {
        let mut diagnostics = Diagnostics::default();
        let outcome = self.run(request, now, &mut diagnostics).await;

        if let Err(rejection) = &outcome {
            debug!(
                symbol = %request.symbol,
                stage = ?rejection.stage,
                reason = %rejection.reason,
                "SniperOrchestrator: rejected"
            );
        }

        Evaluation {
            outcome,
            diagnostics,
        }
    }

    async fn run(
        &self,
        request: &SignalRequest,
        now: DateTime<Utc>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Signal, Rejection> {
        let config = self.generator.config();
        let (indicators, structure) = self.generator.analyze(&request.candles, diagnostics)?;

        // Level 1
        let inputs = ConfluenceInputs {
            indicators: &indicators,
            structure: &structure,
            volume: &request.volume,
            dom: &request.dom,
        };
        let confluence = ConfluenceChecker::check(ConfluenceMode::Sniper, &inputs);
        diagnostics.confluence = Some(confluence.clone());
        let triggers =
            TriggerSystem::detect(&indicators, &structure, &request.volume, &request.dom);
        diagnostics.triggers = Some(triggers.clone());

        let direction = directional_gate(&confluence, &triggers)
            .map_err(|(_, reason)| reject(SniperLevel::Confirmation, reason))?;
        let side = direction.bias();
        if structure.bos != Some(side) && structure.choch != Some(side) {
            return Err(reject(
                SniperLevel::Confirmation,
                RejectReason::MissingStructureConfirmation { direction },
            ));
        }
        debug!(symbol = %request.symbol, direction = %direction, "SniperOrchestrator: level 1 passed");

        // Macro candles and MTF alignment are fetched together.
        let (macro_trends, alignment) = self.fetch_market_context(&request.symbol).await;
        diagnostics.macro_trends = macro_trends.clone();
        diagnostics.alignment = alignment.clone();

        // Level 2
        if let Some(opposing) = macro_trends.iter().find(|m| m.bias == side.opposite()) {
            return Err(reject(
                SniperLevel::MacroTrend,
                RejectReason::MacroTrendOpposed {
                    timeframe: opposing.timeframe.clone(),
                    direction,
                },
            ));
        }

        // Level 3. The stock plan always clears the default floor.
        let risk = self.generator.risk_manager().assess(&indicators);
        diagnostics.risk = Some(risk.clone());
        let levels = SNIPER_PLAN.compute(direction, indicators.price, &indicators.atr);
        diagnostics.levels = Some(levels);
        if levels.risk_reward < config.sniper.min_risk_reward {
            return Err(reject(
                SniperLevel::RiskReward,
                RejectReason::RiskRewardTooLow {
                    ratio: levels.risk_reward,
                    min: config.sniper.min_risk_reward,
                },
            ));
        }

        // Level 4
        if let Some(alignment) = &alignment {
            if alignment.quality != AlignmentQuality::Perfect
                || alignment.direction != Some(direction)
            {
                return Err(reject(
                    SniperLevel::Alignment,
                    RejectReason::TimeframesNotAligned {
                        quality: alignment.quality,
                        aligned: alignment.direction,
                    },
                ));
            }
        }

        // Level 5
        if let Some(sentiment) = self.fetch_sentiment(&request.symbol).await {
            diagnostics.sentiment = Some(sentiment);
            let sniper = &config.sniper;
            let ratio = sentiment.long_short_ratio;
            let crowded = match direction {
                SignalDirection::Long if ratio > sniper.max_long_short_ratio => {
                    Some(sniper.max_long_short_ratio)
                }
                SignalDirection::Short if ratio < sniper.min_long_short_ratio => {
                    Some(sniper.min_long_short_ratio)
                }
                _ => None,
            };
            if let Some(limit) = crowded {
                return Err(reject(
                    SniperLevel::Sentiment,
                    RejectReason::CrowdedSentiment {
                        direction,
                        ratio,
                        limit,
                    },
                ));
            }
        }

        let base_confidence = SNIPER_BASE_CONFIDENCE + confluence.score * SNIPER_SCORE_WEIGHT;
        self.generator.finish(
            Candidate {
                mode: SignalMode::Sniper,
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

    async fn fetch_market_context(&self, symbol: &str) -> (Vec<MacroTrend>, Option<MtfAlignment>) {
        let Some(market) = &self.market else {
            warn!(symbol, "SniperOrchestrator: no market context source, macro and MTF checks pass through");
            return (Vec::new(), None);
        };

        let sniper = &self.generator.config().sniper;
        let macro_reads = join_all(
            sniper
                .macro_timeframes
                .iter()
                .map(|timeframe| self.macro_trend(market.as_ref(), symbol, timeframe)),
        );
        let alignment = market.timeframe_alignment(symbol, &sniper.alignment_timeframes);
        let (macro_trends, alignment) = tokio::join!(macro_reads, alignment);

        let alignment = match alignment {
            Ok(alignment) => Some(alignment),
            Err(e) => {
                warn!(symbol, error = %e, "SniperOrchestrator: MTF alignment unavailable, passing through");
                None
            }
        };

        (macro_trends, alignment)
    }

    async fn macro_trend(
        &self,
        market: &dyn MarketContextSource,
        symbol: &str,
        timeframe: &str,
    ) -> MacroTrend {
        let candles = match market.macro_candles(symbol, timeframe).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(symbol, timeframe, error = %e, "SniperOrchestrator: macro candles unavailable, passing through");
                return MacroTrend::unavailable(timeframe);
            }
        };

        match IndicatorEngine::compute(&candles) {
            Ok(snapshot) => {
                let bias = if snapshot.trend_score > MACRO_TREND_THRESHOLD {
                    Bias::Bullish
                } else if snapshot.trend_score < -MACRO_TREND_THRESHOLD {
                    Bias::Bearish
                } else {
                    Bias::Neutral
                };
                MacroTrend {
                    timeframe: timeframe.to_string(),
                    trend_score: Some(snapshot.trend_score),
                    bias,
                }
            }
            Err(e) => {
                warn!(symbol, timeframe, error = %e, "SniperOrchestrator: macro trend not computable, passing through");
                MacroTrend::unavailable(timeframe)
            }
        }
    }

    async fn fetch_sentiment(&self, symbol: &str) -> Option<SentimentData> {
        let Some(source) = &self.sentiment else {
            warn!(symbol, "SniperOrchestrator: no sentiment source, sentiment check passes through");
            return None;
        };

        match source.sentiment(symbol).await {
            Ok(sentiment) => Some(sentiment),
            Err(e) => {
                warn!(symbol, error = %e, "SniperOrchestrator: sentiment unavailable, passing through");
                None
            }
        }
    }
}
