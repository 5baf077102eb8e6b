//! Unit tests for RSI indicator

use perptrix_signals::indicators::momentum::{calculate_rsi, calculate_rsi_default, rsi_state};
use perptrix_signals::models::OscillatorState;

use crate::fixtures::{falling_candles, flat_candles, rising_candles};

#[test]
fn test_rsi_needs_period_plus_one_closes() {
    assert!(calculate_rsi_default(&rising_candles(14, 100.0)).is_none());
    assert!(calculate_rsi_default(&rising_candles(15, 100.0)).is_some());
    assert!(calculate_rsi(&rising_candles(30, 100.0), 0).is_none());
}

#[test]
fn test_rsi_extremes() {
    let up = calculate_rsi_default(&rising_candles(40, 100.0)).unwrap();
    assert_eq!(up.value, 100.0);
    assert_eq!(up.state, OscillatorState::Overbought);

    let down = calculate_rsi_default(&falling_candles(40, 200.0)).unwrap();
    assert_eq!(down.value, 0.0);
    assert_eq!(down.state, OscillatorState::Oversold);
}

#[test]
fn test_rsi_flat_window_reads_fifty() {
    let rsi = calculate_rsi_default(&flat_candles(40, 100.0)).unwrap();
    assert_eq!(rsi.value, 50.0);
    assert_eq!(rsi.previous, 50.0);
    assert_eq!(rsi.state, OscillatorState::Neutral);
}

#[test]
fn test_rsi_state_boundaries() {
    assert_eq!(rsi_state(30.0), OscillatorState::Oversold);
    assert_eq!(rsi_state(30.1), OscillatorState::Neutral);
    assert_eq!(rsi_state(69.9), OscillatorState::Neutral);
    assert_eq!(rsi_state(70.0), OscillatorState::Overbought);
}
