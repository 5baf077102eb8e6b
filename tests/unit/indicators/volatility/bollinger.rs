//! Unit tests for Bollinger Bands indicator

use perptrix_signals::indicators::volatility::{
    calculate_bollinger_bands, calculate_bollinger_bands_default,
};
use perptrix_signals::models::{BollingerPosition, Candle};

use crate::fixtures::flat_candles;

#[test]
fn test_bollinger_insufficient_data() {
    assert!(calculate_bollinger_bands_default(&flat_candles(19, 100.0)).is_none());
}

#[test]
fn test_flat_window_collapses_bands() {
    let bands = calculate_bollinger_bands_default(&flat_candles(30, 100.0)).unwrap();
    assert_eq!(bands.upper, 100.0);
    assert_eq!(bands.lower, 100.0);
    assert_eq!(bands.bandwidth, 0.0);
    assert_eq!(bands.position, BollingerPosition::UpperHalf);
}

#[test]
fn test_spike_closes_outside_bands() {
    let mut up = flat_candles(30, 100.0);
    up.push(Candle::new(100.0, 110.0, 100.0, 110.0, 100.0));
    let bands = calculate_bollinger_bands(&up, 20, 2.0).unwrap();
    assert_eq!(bands.position, BollingerPosition::AboveUpper);
    assert!((bands.middle - 100.5).abs() < 1e-9);
    assert!(bands.bandwidth > 0.0);

    let mut down = flat_candles(30, 100.0);
    down.push(Candle::new(100.0, 100.0, 90.0, 90.0, 100.0));
    let bands = calculate_bollinger_bands(&down, 20, 2.0).unwrap();
    assert_eq!(bands.position, BollingerPosition::BelowLower);
}
