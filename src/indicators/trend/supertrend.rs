//! SuperTrend indicator

use crate::indicators::volatility::atr::atr_series;
use crate::models::indicators::{Bias, Candle, SupertrendReading};

/// Calculate SuperTrend indicator
///
/// Built from the last two ATR values and the high/low/close of the final
/// two bars. The previous bar's bands decide a breakout; inside the bands
/// the close relative to the current bar's midpoint decides the direction.
pub fn calculate_supertrend(
    candles: &[Candle],
    period: u32,
    multiplier: f64,
) -> Option<SupertrendReading> {
    let atr = atr_series(candles, period);
    if atr.len() < 2 {
        return None;
    }

    let prev = &candles[candles.len() - 2];
    let cur = candles.last()?;
    let prev_atr = atr[atr.len() - 2];
    let cur_atr = atr[atr.len() - 1];

    let prev_hl2 = (prev.high + prev.low) / 2.0;
    let prev_upper = prev_hl2 + multiplier * prev_atr;
    let prev_lower = prev_hl2 - multiplier * prev_atr;

    let hl2 = (cur.high + cur.low) / 2.0;
    let basic_upper = hl2 + multiplier * cur_atr;
    let basic_lower = hl2 - multiplier * cur_atr;

    let upper_band = if basic_upper < prev_upper || prev.close > prev_upper {
        basic_upper
    } else {
        prev_upper
    };
    let lower_band = if basic_lower > prev_lower || prev.close < prev_lower {
        basic_lower
    } else {
        prev_lower
    };

    let direction = if cur.close > prev_upper {
        Bias::Bullish
    } else if cur.close < prev_lower {
        Bias::Bearish
    } else if cur.close >= hl2 {
        Bias::Bullish
    } else {
        Bias::Bearish
    };

    let value = if direction == Bias::Bullish {
        lower_band
    } else {
        upper_band
    };

    Some(SupertrendReading { direction, value })
}

/// Calculate SuperTrend with default parameters (10, 3)
pub fn calculate_supertrend_default(candles: &[Candle]) -> Option<SupertrendReading> {
    calculate_supertrend(candles, 10, 3.0)
}
