//! Unit tests for ATR indicator

use perptrix_signals::indicators::volatility::{atr_series, calculate_atr, calculate_atr_default};
use perptrix_signals::models::{Candle, VolatilityLevel};

fn constant_range(count: usize, range: f64) -> Vec<Candle> {
    let half = range / 2.0;
    vec![Candle::new(100.0, 100.0 + half, 100.0 - half, 100.0, 10.0); count]
}

#[test]
fn test_atr_insufficient_data() {
    assert!(calculate_atr_default(&constant_range(14, 1.0)).is_none());
    assert_eq!(atr_series(&constant_range(15, 1.0), 14).len(), 1);
}

#[test]
fn test_atr_volatility_buckets() {
    let high = calculate_atr_default(&constant_range(30, 3.0)).unwrap();
    assert!((high.value - 3.0).abs() < 1e-9);
    assert!((high.pct - 3.0).abs() < 1e-9);
    assert_eq!(high.volatility, VolatilityLevel::High);

    let moderate = calculate_atr_default(&constant_range(30, 1.5)).unwrap();
    assert_eq!(moderate.volatility, VolatilityLevel::Moderate);

    let low = calculate_atr_default(&constant_range(30, 0.4)).unwrap();
    assert_eq!(low.volatility, VolatilityLevel::Low);
}

#[test]
fn test_atr_includes_gaps() {
    let mut candles = constant_range(20, 1.0);
    candles.push(Candle::new(110.0, 110.5, 109.5, 110.0, 10.0));

    let series = atr_series(&candles, 14);
    let last = series[series.len() - 1];
    let prev = series[series.len() - 2];
    // Gap from 100 to 110.5 is a true range of 10.5
    assert!((last - (prev * 13.0 + 10.5) / 14.0).abs() < 1e-9);
    assert!(calculate_atr(&candles, 14).unwrap().value > 1.0);
}
