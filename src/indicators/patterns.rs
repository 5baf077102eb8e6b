//! Candlestick pattern recognition on the final bars of a window.

use crate::models::indicators::{Candle, CandlePattern};

const DOJI_BODY_RATIO: f64 = 0.1;
const STAR_BODY_RATIO: f64 = 0.3;

/// Patterns strong enough to act on. Doji is indecision and excluded.
pub const STRONG_PATTERNS: [CandlePattern; 8] = [
    CandlePattern::BullishEngulfing,
    CandlePattern::BearishEngulfing,
    CandlePattern::Hammer,
    CandlePattern::ShootingStar,
    CandlePattern::MorningStar,
    CandlePattern::EveningStar,
    CandlePattern::ThreeWhiteSoldiers,
    CandlePattern::ThreeBlackCrows,
];

pub fn is_strong(pattern: CandlePattern) -> bool {
    STRONG_PATTERNS.contains(&pattern)
}

/// Patterns completed by the last candle.
pub fn detect_patterns(candles: &[Candle]) -> Vec<CandlePattern> {
    let mut found = Vec::new();
    let Some(last) = candles.last() else {
        return found;
    };

    if is_doji(last) {
        found.push(CandlePattern::Doji);
    }
    if is_hammer(last) {
        found.push(CandlePattern::Hammer);
    }
    if is_shooting_star(last) {
        found.push(CandlePattern::ShootingStar);
    }

    if candles.len() >= 2 {
        let prev = &candles[candles.len() - 2];
        if prev.is_bearish()
            && last.is_bullish()
            && last.open <= prev.close
            && last.close >= prev.open
            && last.body() > prev.body()
        {
            found.push(CandlePattern::BullishEngulfing);
        }
        if prev.is_bullish()
            && last.is_bearish()
            && last.open >= prev.close
            && last.close <= prev.open
            && last.body() > prev.body()
        {
            found.push(CandlePattern::BearishEngulfing);
        }
    }

    if candles.len() >= 3 {
        let three = &candles[candles.len() - 3..];
        let (first, middle) = (&three[0], &three[1]);
        let first_mid = (first.open + first.close) / 2.0;
        let small_middle = middle.body() <= first.body() * STAR_BODY_RATIO;

        if first.is_bearish() && small_middle && last.is_bullish() && last.close > first_mid {
            found.push(CandlePattern::MorningStar);
        }
        if first.is_bullish() && small_middle && last.is_bearish() && last.close < first_mid {
            found.push(CandlePattern::EveningStar);
        }

        let soldiers = three.windows(2).all(|w| {
            w[0].is_bullish()
                && w[1].is_bullish()
                && w[1].close > w[0].close
                && w[1].open > w[0].open
                && w[1].open <= w[0].close
        });
        if soldiers {
            found.push(CandlePattern::ThreeWhiteSoldiers);
        }

        let crows = three.windows(2).all(|w| {
            w[0].is_bearish()
                && w[1].is_bearish()
                && w[1].close < w[0].close
                && w[1].open < w[0].open
                && w[1].open >= w[0].close
        });
        if crows {
            found.push(CandlePattern::ThreeBlackCrows);
        }
    }

    found
}

fn is_doji(candle: &Candle) -> bool {
    let range = candle.range();
    range > 0.0 && candle.body() <= range * DOJI_BODY_RATIO
}

fn is_hammer(candle: &Candle) -> bool {
    let body = candle.body();
    body > candle.range() * DOJI_BODY_RATIO
        && candle.lower_wick() >= 2.0 * body
        && candle.upper_wick() <= 0.5 * body
}

fn is_shooting_star(candle: &Candle) -> bool {
    let body = candle.body();
    body > candle.range() * DOJI_BODY_RATIO
        && candle.upper_wick() >= 2.0 * body
        && candle.lower_wick() <= 0.5 * body
}
