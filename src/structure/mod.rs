//! Market structure analysis

pub mod analyzer;
pub mod swings;

pub use analyzer::*;
pub use swings::{find_swing_highs, find_swing_lows, SWING_WINDOW};
