use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: {actual} candles, need at least {required}")]
    InsufficientData { required: usize, actual: usize },

    #[error("invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: String },

    #[error("indicator computation failed: {0}")]
    Computation(String),
}

impl IndicatorError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            IndicatorError::InsufficientData { .. } => "insufficient_data",
            IndicatorError::InvalidCandle { .. } => "invalid_candle",
            IndicatorError::Computation(_) => "computation_error",
        }
    }
}
