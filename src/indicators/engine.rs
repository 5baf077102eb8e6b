//! Indicator engine: one pass over a candle window into an `IndicatorSnapshot`.

use tracing::debug;

use crate::common::math;
use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{
    calculate_cci, calculate_macd_default, calculate_mfi, calculate_rsi_default,
    calculate_stoch_rsi_default, calculate_williams_r,
};
use crate::indicators::patterns::detect_patterns;
use crate::indicators::trend::{
    calculate_adx_default, calculate_ema_set, calculate_sma_set, calculate_supertrend_default,
    ema_alignment_score,
};
use crate::indicators::validation::{ensure_finite, validate_candles};
use crate::indicators::volatility::{calculate_atr_default, calculate_bollinger_bands_default};
use crate::indicators::volume::{calculate_obv, calculate_vwap};
use crate::models::indicators::{Bias, Candle, IndicatorSnapshot, OscillatorState};

pub const MIN_CANDLES: usize = 50;

const SCORE_BOUND: f64 = 100.0;

pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Compute every indicator for the window.
    ///
    /// Fewer than `MIN_CANDLES` candles yields `InsufficientData`; malformed
    /// candles or non-finite results yield an error instead of a snapshot.
    pub fn compute(candles: &[Candle]) -> Result<IndicatorSnapshot, IndicatorError> {
        validate_candles(candles, MIN_CANDLES)?;

        let price = candles[candles.len() - 1].close;
        let missing = |name: &str| IndicatorError::Computation(format!("{} unavailable", name));

        let ema = calculate_ema_set(candles);
        let sma = calculate_sma_set(candles);
        let supertrend = calculate_supertrend_default(candles).ok_or_else(|| missing("supertrend"))?;
        let adx = calculate_adx_default(candles).ok_or_else(|| missing("adx"))?;
        let rsi = calculate_rsi_default(candles).ok_or_else(|| missing("rsi"))?;
        let macd = calculate_macd_default(candles).ok_or_else(|| missing("macd"))?;
        let stoch_rsi = calculate_stoch_rsi_default(candles).ok_or_else(|| missing("stoch_rsi"))?;
        let cci = calculate_cci(candles, 20).ok_or_else(|| missing("cci"))?;
        let williams_r = calculate_williams_r(candles, 14).ok_or_else(|| missing("williams_r"))?;
        let mfi = calculate_mfi(candles, 14).ok_or_else(|| missing("mfi"))?;
        let bollinger = calculate_bollinger_bands_default(candles).ok_or_else(|| missing("bollinger"))?;
        let atr = calculate_atr_default(candles).ok_or_else(|| missing("atr"))?;
        let vwap = calculate_vwap(candles).ok_or_else(|| missing("vwap"))?;
        let obv = calculate_obv(candles).ok_or_else(|| missing("obv"))?;

        let mut snapshot = IndicatorSnapshot {
            price,
            trend_score: 0,
            momentum_score: 0.0,
            ema,
            sma,
            supertrend,
            adx,
            rsi,
            macd,
            stoch_rsi,
            cci,
            williams_r,
            mfi,
            bollinger,
            atr,
            vwap,
            obv,
            patterns: detect_patterns(candles),
        };

        for (name, value) in [
            ("supertrend", snapshot.supertrend.value),
            ("adx", snapshot.adx.value),
            ("rsi", snapshot.rsi.value),
            ("macd", snapshot.macd.histogram),
            ("stoch_rsi", snapshot.stoch_rsi.k),
            ("cci", snapshot.cci.value),
            ("williams_r", snapshot.williams_r.value),
            ("mfi", snapshot.mfi.value),
            ("bollinger", snapshot.bollinger.middle),
            ("atr", snapshot.atr.value),
            ("vwap", snapshot.vwap.value),
            ("obv", snapshot.obv.value),
        ] {
            ensure_finite(name, value)?;
        }

        snapshot.trend_score = trend_score(&snapshot);
        snapshot.momentum_score = momentum_score(&snapshot);

        debug!(
            price,
            trend_score = snapshot.trend_score,
            momentum_score = snapshot.momentum_score,
            rsi = snapshot.rsi.value,
            atr_pct = snapshot.atr.pct,
            "IndicatorEngine: computed snapshot over {} candles",
            candles.len()
        );

        Ok(snapshot)
    }
}

/// Signed weighted trend score, clamped to [-100, 100].
///
/// ±5 per EMA (price above/below), ±15 Supertrend, ±10 ADX direction,
/// ±10 MACD direction, ±5 VWAP position.
pub fn trend_score(snapshot: &IndicatorSnapshot) -> i32 {
    let score = ema_alignment_score(&snapshot.ema, snapshot.price)
        + 15 * snapshot.supertrend.direction.sign()
        + 10 * snapshot.adx.direction.sign()
        + 10 * snapshot.macd.direction.sign()
        + 5 * snapshot.vwap.position.sign();
    score.clamp(-100, 100)
}

/// Momentum score, clamped to [-100, 100] and rounded to one decimal.
///
/// (RSI - 50) × 1.5, ±15 StochRSI extreme, ±20 MACD crossover, ±10 CCI
/// extreme. Overbought readings push up, oversold readings push down.
pub fn momentum_score(snapshot: &IndicatorSnapshot) -> f64 {
    let mut score = (snapshot.rsi.value - 50.0) * 1.5;
    score += 15.0 * extreme_sign(snapshot.stoch_rsi.state);
    score += match snapshot.macd.crossover {
        Some(Bias::Bullish) => 20.0,
        Some(Bias::Bearish) => -20.0,
        _ => 0.0,
    };
    score += 10.0 * extreme_sign(snapshot.cci.state);
    math::round_to(score.clamp(-SCORE_BOUND, SCORE_BOUND), 1)
}

fn extreme_sign(state: OscillatorState) -> f64 {
    match state {
        OscillatorState::Overbought => 1.0,
        OscillatorState::Oversold => -1.0,
        OscillatorState::Neutral => 0.0,
    }
}
