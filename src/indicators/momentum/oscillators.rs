//! Bounded oscillators: StochRSI, CCI, Williams %R, MFI

use crate::common::math;
use crate::indicators::momentum::rsi::rsi_series;
use crate::models::indicators::{Candle, OscillatorReading, OscillatorState, StochRsiReading};

pub const STOCH_RSI_OVERSOLD: f64 = 20.0;
pub const STOCH_RSI_OVERBOUGHT: f64 = 80.0;
pub const CCI_OVERSOLD: f64 = -100.0;
pub const CCI_OVERBOUGHT: f64 = 100.0;
pub const WILLIAMS_R_OVERSOLD: f64 = -80.0;
pub const WILLIAMS_R_OVERBOUGHT: f64 = -20.0;
pub const MFI_OVERSOLD: f64 = 20.0;
pub const MFI_OVERBOUGHT: f64 = 80.0;

/// Stochastic of RSI. K is the SMA(k_smooth) of the raw stochastic, D the
/// SMA(d_smooth) of K. A flat RSI window reads 50.
pub fn calculate_stoch_rsi(
    candles: &[Candle],
    rsi_period: u32,
    stoch_period: u32,
    k_smooth: u32,
    d_smooth: u32,
) -> Option<StochRsiReading> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let rsi = rsi_series(&closes, rsi_period as usize);
    let stoch_period = stoch_period as usize;
    if stoch_period == 0 || rsi.len() < stoch_period {
        return None;
    }

    let raw: Vec<f64> = rsi
        .windows(stoch_period)
        .map(|w| {
            let min = w.iter().copied().fold(f64::INFINITY, f64::min);
            let max = w.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let last = w[w.len() - 1];
            if max > min {
                (last - min) / (max - min) * 100.0
            } else {
                50.0
            }
        })
        .collect();

    let k_series = math::sma_series(&raw, k_smooth as usize);
    let d_series = math::sma_series(&k_series, d_smooth as usize);
    let k = *k_series.last()?;
    let d = *d_series.last()?;

    let state = if k < STOCH_RSI_OVERSOLD {
        OscillatorState::Oversold
    } else if k > STOCH_RSI_OVERBOUGHT {
        OscillatorState::Overbought
    } else {
        OscillatorState::Neutral
    };

    Some(StochRsiReading { k, d, state })
}

pub fn calculate_stoch_rsi_default(candles: &[Candle]) -> Option<StochRsiReading> {
    calculate_stoch_rsi(candles, 14, 14, 3, 3)
}

/// Commodity Channel Index on typical price.
pub fn calculate_cci(candles: &[Candle], period: u32) -> Option<OscillatorReading> {
    let period = period as usize;
    if period == 0 || candles.len() < period {
        return None;
    }

    let typical: Vec<f64> = candles[candles.len() - period..]
        .iter()
        .map(Candle::typical_price)
        .collect();
    let mean = typical.iter().sum::<f64>() / period as f64;
    let mean_deviation = typical.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;
    let last = typical[typical.len() - 1];

    let value = if mean_deviation > 0.0 {
        (last - mean) / (0.015 * mean_deviation)
    } else {
        0.0
    };

    let state = if value < CCI_OVERSOLD {
        OscillatorState::Oversold
    } else if value > CCI_OVERBOUGHT {
        OscillatorState::Overbought
    } else {
        OscillatorState::Neutral
    };

    Some(OscillatorReading { value, state })
}

pub fn calculate_williams_r(candles: &[Candle], period: u32) -> Option<OscillatorReading> {
    let period = period as usize;
    if period == 0 || candles.len() < period {
        return None;
    }

    let window = &candles[candles.len() - period..];
    let highest = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let close = window[window.len() - 1].close;

    let value = if highest > lowest {
        (highest - close) / (highest - lowest) * -100.0
    } else {
        -50.0
    };

    let state = if value <= WILLIAMS_R_OVERSOLD {
        OscillatorState::Oversold
    } else if value >= WILLIAMS_R_OVERBOUGHT {
        OscillatorState::Overbought
    } else {
        OscillatorState::Neutral
    };

    Some(OscillatorReading { value, state })
}

/// Money Flow Index: volume-weighted RSI on typical price.
pub fn calculate_mfi(candles: &[Candle], period: u32) -> Option<OscillatorReading> {
    let period = period as usize;
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let window = &candles[candles.len() - period - 1..];
    let mut positive = 0.0;
    let mut negative = 0.0;
    for pair in window.windows(2) {
        let prev_tp = pair[0].typical_price();
        let tp = pair[1].typical_price();
        let flow = tp * pair[1].volume;
        if tp > prev_tp {
            positive += flow;
        } else if tp < prev_tp {
            negative += flow;
        }
    }

    let value = if negative == 0.0 {
        if positive == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + positive / negative)
    };

    let state = if value <= MFI_OVERSOLD {
        OscillatorState::Oversold
    } else if value >= MFI_OVERBOUGHT {
        OscillatorState::Overbought
    } else {
        OscillatorState::Neutral
    };

    Some(OscillatorReading { value, state })
}
