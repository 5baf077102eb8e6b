//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::models::indicators::{Bias, Candle, MacdReading};

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
///
/// A crossover is reported when the histogram changes sign between the last
/// two bars.
pub fn calculate_macd(
    candles: &[Candle],
    fast_period: u32,
    slow_period: u32,
    signal_period: u32,
) -> Option<MacdReading> {
    let (fast, slow, signal) = (
        fast_period as usize,
        slow_period as usize,
        signal_period as usize,
    );
    if fast == 0 || fast >= slow || candles.len() < slow + signal {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast_ema = math::ema_series(&closes, fast);
    let slow_ema = math::ema_series(&closes, slow);

    // Align both series on the bars where the slow EMA exists.
    let offset = slow - fast;
    let macd_values: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast_ema[i + offset] - slow_value)
        .collect();

    let signal_values = math::ema_series(&macd_values, signal);
    let signal_offset = signal - 1;
    let histogram: Vec<f64> = signal_values
        .iter()
        .enumerate()
        .map(|(i, s)| macd_values[i + signal_offset] - s)
        .collect();

    if histogram.len() < 2 {
        return None;
    }

    let line = *macd_values.last()?;
    let signal_line = *signal_values.last()?;
    let last = histogram[histogram.len() - 1];
    let prev = histogram[histogram.len() - 2];

    let direction = if last > 0.0 {
        Bias::Bullish
    } else if last < 0.0 {
        Bias::Bearish
    } else {
        Bias::Neutral
    };

    let crossover = if prev <= 0.0 && last > 0.0 {
        Some(Bias::Bullish)
    } else if prev >= 0.0 && last < 0.0 {
        Some(Bias::Bearish)
    } else {
        None
    };

    Some(MacdReading {
        line,
        signal: signal_line,
        histogram: last,
        direction,
        crossover,
    })
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(candles: &[Candle]) -> Option<MacdReading> {
    calculate_macd(candles, 12, 26, 9)
}
