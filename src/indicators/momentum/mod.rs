//! Momentum indicators: RSI, MACD and bounded oscillators

pub mod macd;
pub mod oscillators;
pub mod rsi;

pub use macd::*;
pub use oscillators::*;
pub use rsi::*;
