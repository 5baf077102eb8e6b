//! Volume indicators: VWAP, OBV

use crate::models::indicators::{Bias, Candle, ObvReading, ObvTrend, VwapReading};

pub const OBV_TREND_LOOKBACK: usize = 20;

/// Volume-weighted average typical price over the whole window.
pub fn calculate_vwap(candles: &[Candle]) -> Option<VwapReading> {
    let price = candles.last()?.close;
    let total_volume: f64 = candles.iter().map(|c| c.volume).sum();

    let value = if total_volume > 0.0 {
        candles
            .iter()
            .map(|c| c.typical_price() * c.volume)
            .sum::<f64>()
            / total_volume
    } else {
        candles.iter().map(Candle::typical_price).sum::<f64>() / candles.len() as f64
    };

    let position = if price > value {
        Bias::Bullish
    } else if price < value {
        Bias::Bearish
    } else {
        Bias::Neutral
    };

    Some(VwapReading { value, position })
}

/// On-balance volume, with its trend over the last `OBV_TREND_LOOKBACK` bars.
pub fn calculate_obv(candles: &[Candle]) -> Option<ObvReading> {
    if candles.len() < 2 {
        return None;
    }

    let mut series = Vec::with_capacity(candles.len());
    series.push(0.0);
    for pair in candles.windows(2) {
        let prev = series[series.len() - 1];
        let next = if pair[1].close > pair[0].close {
            prev + pair[1].volume
        } else if pair[1].close < pair[0].close {
            prev - pair[1].volume
        } else {
            prev
        };
        series.push(next);
    }

    let value = series[series.len() - 1];
    let lookback = OBV_TREND_LOOKBACK.min(series.len() - 1);
    let reference = series[series.len() - 1 - lookback];
    let trend = if value > reference {
        ObvTrend::Rising
    } else if value < reference {
        ObvTrend::Falling
    } else {
        ObvTrend::Flat
    };

    Some(ObvReading { value, trend })
}
