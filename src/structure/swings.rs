//! Swing point detection

use crate::models::indicators::Candle;
use crate::models::structure::SwingPoint;

/// Bars on each side a swing must dominate.
pub const SWING_WINDOW: usize = 5;

/// A bar is a swing high iff its high is strictly greater than every other
/// high within `window` bars on both sides.
pub fn find_swing_highs(candles: &[Candle], window: usize) -> Vec<SwingPoint> {
    find_swings(candles, window, |c| c.high, |candidate, other| candidate > other)
}

/// Mirror of [`find_swing_highs`] on lows.
pub fn find_swing_lows(candles: &[Candle], window: usize) -> Vec<SwingPoint> {
    find_swings(candles, window, |c| c.low, |candidate, other| candidate < other)
}

fn find_swings(
    candles: &[Candle],
    window: usize,
    value: impl Fn(&Candle) -> f64,
    dominates: impl Fn(f64, f64) -> bool,
) -> Vec<SwingPoint> {
    if window == 0 || candles.len() < 2 * window + 1 {
        return Vec::new();
    }

    (window..candles.len() - window)
        .filter_map(|i| {
            let price = value(&candles[i]);
            let is_swing = (i - window..=i + window)
                .filter(|&j| j != i)
                .all(|j| dominates(price, value(&candles[j])));
            is_swing.then_some(SwingPoint { index: i, price })
        })
        .collect()
}

/// The last `n` items of a slice (fewer if the slice is shorter).
pub fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}
