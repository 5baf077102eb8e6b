//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod market;
pub mod signal;
pub mod structure;

pub use indicators::{
    AdxStrength, Bias, BollingerPosition, Candle, CandlePattern, IndicatorSnapshot, ObvTrend,
    OscillatorState, VolatilityLevel,
};
pub use market::{AlignmentQuality, DomData, MtfAlignment, PressureBucket, SentimentData, VolumeData};
pub use signal::{Signal, SignalDirection, SignalMode, TakeProfit, TrailingStop, TriggerKind};
pub use structure::{FairValueGap, OrderBlock, StructureBias, StructureSnapshot, SwingPoint};
