pub mod market_context;

pub use market_context::{MarketContextSource, SentimentSource, SourceError};
