//! RSI (Relative Strength Index) indicator

use crate::models::indicators::{Candle, OscillatorState, RsiReading};

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// RSI with Wilder's smoothing, one value per bar from bar `period` on.
///
/// RSI = 100 - (100 / (1 + RS)), RS = Average Gain / Average Loss.
/// A window without any movement reads 50.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let p = period as f64;

    let mut avg_gain = changes[..period].iter().filter(|c| **c > 0.0).sum::<f64>() / p;
    let mut avg_loss = changes[..period]
        .iter()
        .filter(|c| **c < 0.0)
        .map(|c| c.abs())
        .sum::<f64>()
        / p;

    let mut out = Vec::with_capacity(changes.len() - period + 1);
    out.push(rsi_from_averages(avg_gain, avg_loss));

    for &change in &changes[period..] {
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        out.push(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

pub fn rsi_state(value: f64) -> OscillatorState {
    if value <= RSI_OVERSOLD {
        OscillatorState::Oversold
    } else if value >= RSI_OVERBOUGHT {
        OscillatorState::Overbought
    } else {
        OscillatorState::Neutral
    }
}

/// Calculate RSI indicator along with the previous bar's value
pub fn calculate_rsi(candles: &[Candle], period: u32) -> Option<RsiReading> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let series = rsi_series(&closes, period as usize);
    let value = *series.last()?;
    let previous = if series.len() >= 2 {
        series[series.len() - 2]
    } else {
        value
    };

    Some(RsiReading {
        value,
        state: rsi_state(value),
        previous,
    })
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(candles: &[Candle]) -> Option<RsiReading> {
    calculate_rsi(candles, 14)
}
