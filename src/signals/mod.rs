//! Signal decision pipeline: gating, triggers, risk, confidence and the two
//! pipeline drivers.

pub mod confidence;
pub mod confluence;
pub mod generator;
pub mod id;
pub mod levels;
pub mod risk;
pub mod sniper;
pub mod triggers;

pub use confidence::{ConfidenceScore, ConfidenceScorer};
pub use confluence::{ConfluenceChecker, ConfluenceMode, ConfluenceVerdict};
pub use generator::{
    Diagnostics, Evaluation, PipelineStage, RejectReason, Rejection, SignalGenerator,
    SignalRequest,
};
pub use id::SignalIdSequence;
pub use risk::RiskManager;
pub use sniper::{SniperLevel, SniperOrchestrator};
pub use triggers::{TriggerKind, TriggerSystem, TriggerVerdict};
