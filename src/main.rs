//! Perptrix signal evaluator
//!
//! Runs the standard pipeline over a JSON array of candles (oldest first)
//! with neutral volume and order book input, and prints the evaluation.
//!
//! Usage: `perptrix-signals <candles.json> [symbol] [timeframe]`

use dotenvy::dotenv;
use perptrix_signals::config::{get_environment, PipelineConfig};
use perptrix_signals::logging;
use perptrix_signals::models::Candle;
use perptrix_signals::signals::{SignalGenerator, SignalIdSequence, SignalRequest};
use std::env;
use std::fs;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: perptrix-signals <candles.json> [symbol] [timeframe]")?;
    let symbol = args.next().unwrap_or_else(|| "BTCUSDT".to_string());
    let timeframe = args.next().unwrap_or_else(|| "15m".to_string());

    let config = PipelineConfig::from_env()?;
    info!(environment = %get_environment(), path = %path, "Starting perptrix-signals");

    let raw = fs::read_to_string(&path)?;
    let candles: Vec<Candle> = serde_json::from_str(&raw)?;
    info!(symbol = %symbol, timeframe = %timeframe, candles = candles.len(), "Loaded candles");

    let generator = SignalGenerator::new(config, Arc::new(SignalIdSequence::new()));
    let evaluation = generator.evaluate(&SignalRequest::new(symbol, timeframe, candles));

    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}
