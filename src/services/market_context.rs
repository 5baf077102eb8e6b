//! Collaborator seams for the sniper pipeline: higher-timeframe candles,
//! multi-timeframe alignment and retail sentiment.
//!
//! Implementations own transport, caching and retries. Timeouts are the
//! caller's concern; the orchestrator treats any error as "unavailable".

use thiserror::Error;

use crate::models::indicators::Candle;
use crate::models::market::{MtfAlignment, SentimentData};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0} data unavailable")]
    Unavailable(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("upstream error: {0}")]
    Upstream(String),
}

#[async_trait::async_trait]
pub trait MarketContextSource: Send + Sync {
    /// Candles for `symbol` on a higher `timeframe` (e.g. "1h", "4h"), oldest first.
    async fn macro_candles(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>, SourceError>;

    async fn timeframe_alignment(
        &self,
        symbol: &str,
        timeframes: &[String],
    ) -> Result<MtfAlignment, SourceError>;
}

#[async_trait::async_trait]
pub trait SentimentSource: Send + Sync {
    async fn sentiment(&self, symbol: &str) -> Result<SentimentData, SourceError>;
}
