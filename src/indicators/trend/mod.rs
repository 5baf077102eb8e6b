//! Trend indicators: EMA/SMA, ADX, SuperTrend

pub mod adx;
pub mod ema;
pub mod supertrend;

pub use adx::*;
pub use ema::*;
pub use supertrend::*;
