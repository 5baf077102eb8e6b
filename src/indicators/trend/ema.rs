//! EMA and SMA moving averages

use crate::common::math;
use crate::models::indicators::{Bias, Candle, EmaLevel, EmaSet, SmaSet};

fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Calculate EMA for a specific period, with the last close's position
pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<EmaLevel> {
    if candles.len() < period as usize {
        return None;
    }

    let value = math::ema(&closes(candles), period as usize)?;
    let price = candles.last()?.close;

    Some(EmaLevel {
        period,
        value,
        price_above: price > value,
    })
}

/// EMA 9/21/50/200. Periods longer than the window are left empty.
pub fn calculate_ema_set(candles: &[Candle]) -> EmaSet {
    EmaSet {
        ema9: calculate_ema(candles, 9),
        ema21: calculate_ema(candles, 21),
        ema50: calculate_ema(candles, 50),
        ema200: calculate_ema(candles, 200),
    }
}

pub fn calculate_sma(candles: &[Candle], period: u32) -> Option<f64> {
    math::sma(&closes(candles), period as usize)
}

pub fn calculate_sma_set(candles: &[Candle]) -> SmaSet {
    SmaSet {
        sma20: calculate_sma(candles, 20),
        sma50: calculate_sma(candles, 50),
        sma200: calculate_sma(candles, 200),
    }
}

/// Fast EMA above/below slow EMA
pub fn check_ema_cross(candles: &[Candle], fast_period: u32, slow_period: u32) -> Option<Bias> {
    let fast = calculate_ema(candles, fast_period)?;
    let slow = calculate_ema(candles, slow_period)?;

    Some(if fast.value > slow.value {
        Bias::Bullish
    } else if fast.value < slow.value {
        Bias::Bearish
    } else {
        Bias::Neutral
    })
}

/// Score contribution of price vs each available EMA (±5 each).
pub fn ema_alignment_score(emas: &EmaSet, price: f64) -> i32 {
    emas.levels()
        .map(|level| {
            if price > level.value {
                5
            } else if price < level.value {
                -5
            } else {
                0
            }
        })
        .sum()
}
