//! ADX (Average Directional Index) indicator

use crate::common::math;
use crate::models::indicators::{AdxReading, AdxStrength, Bias, Candle};

/// Calculate ADX indicator
///
/// TR, +DM and -DM are Wilder-smoothed into +DI/-DI, and ADX is the
/// Wilder-smoothed DX series. Needs roughly `2 * period` candles.
pub fn calculate_adx(candles: &[Candle], period: u32) -> Option<AdxReading> {
    let period = period as usize;
    if period == 0 || candles.len() < 2 * period {
        return None;
    }

    let mut tr_values = Vec::with_capacity(candles.len() - 1);
    let mut plus_dm_values = Vec::with_capacity(candles.len() - 1);
    let mut minus_dm_values = Vec::with_capacity(candles.len() - 1);

    for pair in candles.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        tr_values.push(math::true_range(cur.high, cur.low, prev.close));

        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;
        plus_dm_values.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm_values.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
    }

    let smoothed_tr = math::wilder_series(&tr_values, period);
    let smoothed_plus = math::wilder_series(&plus_dm_values, period);
    let smoothed_minus = math::wilder_series(&minus_dm_values, period);

    let mut dx_values = Vec::with_capacity(smoothed_tr.len());
    let mut plus_di = 0.0;
    let mut minus_di = 0.0;
    for i in 0..smoothed_tr.len() {
        let tr = smoothed_tr[i];
        plus_di = if tr > 0.0 { 100.0 * smoothed_plus[i] / tr } else { 0.0 };
        minus_di = if tr > 0.0 { 100.0 * smoothed_minus[i] / tr } else { 0.0 };
        let di_sum = plus_di + minus_di;
        dx_values.push(if di_sum > 0.0 {
            100.0 * (plus_di - minus_di).abs() / di_sum
        } else {
            0.0
        });
    }

    let value = math::wilder_series(&dx_values, period).last().copied()?;

    let direction = if plus_di > minus_di {
        Bias::Bullish
    } else if minus_di > plus_di {
        Bias::Bearish
    } else {
        Bias::Neutral
    };

    Some(AdxReading {
        value,
        plus_di,
        minus_di,
        strength: AdxStrength::from_value(value),
        direction,
    })
}

/// Calculate ADX with default period (14)
pub fn calculate_adx_default(candles: &[Candle]) -> Option<AdxReading> {
    calculate_adx(candles, 14)
}
