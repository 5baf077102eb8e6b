//! ATR (Average True Range) indicator

use crate::common::math;
use crate::models::indicators::{AtrReading, Candle, VolatilityLevel};

/// Wilder-smoothed true range, one value per bar once `period` ranges exist.
pub fn atr_series(candles: &[Candle], period: u32) -> Vec<f64> {
    if candles.len() < 2 {
        return Vec::new();
    }
    let tr_values: Vec<f64> = candles
        .windows(2)
        .map(|pair| math::true_range(pair[1].high, pair[1].low, pair[0].close))
        .collect();
    math::wilder_series(&tr_values, period as usize)
}

/// Calculate ATR (Average True Range)
///
/// Also reports ATR as a percentage of the last close and the volatility
/// bucket (>2% high, >1% moderate, else low).
pub fn calculate_atr(candles: &[Candle], period: u32) -> Option<AtrReading> {
    let value = atr_series(candles, period).last().copied()?;
    let price = candles.last()?.close;
    let pct = if price > 0.0 { value / price * 100.0 } else { 0.0 };

    Some(AtrReading {
        value,
        pct,
        volatility: VolatilityLevel::from_atr_pct(pct),
    })
}

/// Calculate ATR with default period (14)
pub fn calculate_atr_default(candles: &[Candle]) -> Option<AtrReading> {
    calculate_atr(candles, 14)
}
