pub mod engine;
pub mod error;
pub mod patterns;
pub mod validation;

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use engine::{IndicatorEngine, MIN_CANDLES};
pub use error::IndicatorError;
pub use validation::*;
