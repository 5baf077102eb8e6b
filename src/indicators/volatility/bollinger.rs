//! Bollinger Bands indicator

use crate::common::math;
use crate::models::indicators::{BollingerPosition, BollingerReading, Candle};

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * standard deviation)
/// Lower Band = Middle - (std_dev * standard deviation)
pub fn calculate_bollinger_bands(
    candles: &[Candle],
    period: u32,
    std_dev: f64,
) -> Option<BollingerReading> {
    if candles.len() < period as usize {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let middle = math::sma(&closes, period as usize)?;
    let std = math::standard_deviation(&closes, period as usize)?;

    let upper = middle + (std_dev * std);
    let lower = middle - (std_dev * std);
    let bandwidth = if middle > 0.0 {
        (upper - lower) / middle * 100.0
    } else {
        0.0
    };

    let price = candles.last()?.close;
    let position = if price > upper {
        BollingerPosition::AboveUpper
    } else if price < lower {
        BollingerPosition::BelowLower
    } else if price >= middle {
        BollingerPosition::UpperHalf
    } else {
        BollingerPosition::LowerHalf
    };

    Some(BollingerReading {
        upper,
        middle,
        lower,
        bandwidth,
        position,
    })
}

/// Calculate Bollinger Bands with default parameters (20 SMA, 2σ)
pub fn calculate_bollinger_bands_default(candles: &[Candle]) -> Option<BollingerReading> {
    calculate_bollinger_bands(candles, 20, 2.0)
}
