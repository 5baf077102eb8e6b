//! Perptrix signal decision core.
//!
//! Candles go in; a directional `Signal` or a typed `Rejection` comes out,
//! together with every snapshot computed along the way.

pub mod common;
pub mod config;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod services;
pub mod signals;
pub mod structure;

pub use config::PipelineConfig;
pub use models::{Candle, Signal, SignalDirection};
pub use signals::{Evaluation, SignalGenerator, SignalRequest, SniperOrchestrator};
