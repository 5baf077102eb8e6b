//! Standard pipeline from candles to signal or rejection

use std::sync::Arc;

use chrono::Duration;
use perptrix_signals::config::PipelineConfig;
use perptrix_signals::models::{SignalDirection, SignalMode};
use perptrix_signals::signals::{
    ConfluenceMode, PipelineStage, RejectReason, SignalGenerator, SignalIdSequence,
    SignalRequest, TriggerKind,
};

use crate::fixtures::{
    ask_heavy_dom, bid_heavy_dom, buying_volume, downtrend_candles, flat_candles, selling_volume,
    stalling_uptrend_candles, uptrend_candles,
};
use crate::test_utils::{fixed_now, generator};

fn long_request() -> SignalRequest {
    SignalRequest::new("BTCUSDT", "15m", uptrend_candles())
        .with_volume(buying_volume())
        .with_dom(bid_heavy_dom())
}

#[test]
fn test_uptrend_emits_long() {
    let now = fixed_now();
    let evaluation = generator(PipelineConfig::default()).evaluate_at(&long_request(), now);

    let signal = evaluation.signal().expect("long signal");
    assert_eq!(signal.direction, SignalDirection::Long);
    assert_eq!(signal.mode, SignalMode::Standard);
    assert_eq!(signal.symbol, "BTCUSDT");
    assert_eq!(signal.timeframe, "15m");
    assert_eq!(signal.exchange, "binance");
    assert_eq!(signal.id, "sig_20240307_001");
    assert_eq!(signal.timestamp, now);
    assert_eq!(signal.expires_at, now + Duration::minutes(30));

    assert!((signal.entry_price - 108.3).abs() < 1e-9);
    let tps = &signal.take_profits;
    assert!(signal.stop_loss < signal.entry_price);
    assert!(signal.entry_price < tps[0].price);
    assert!(tps[0].price < tps[1].price && tps[1].price < tps[2].price);
    assert_eq!(tps.iter().map(|tp| tp.percentage).sum::<f64>(), 100.0);

    // Moderate volatility caps the stop at 0.8% of entry
    assert!((signal.stop_distance() - 108.3 * 0.008).abs() < 1e-9);
    assert!((signal.risk_reward - 3.045).abs() < 1e-9);
    assert_eq!(signal.confidence, 1.0);
    assert_eq!(signal.leverage, 10);

    assert_eq!(
        signal.triggers,
        vec![TriggerKind::MacdCrossover, TriggerKind::CandlePattern, TriggerKind::Bos]
    );
    assert!(signal.trailing_stop.enabled);
    assert_eq!(signal.trailing_stop.activation_price, tps[0].price);
    assert!((signal.trailing_stop.trail_distance - signal.stop_distance()).abs() < 1e-9);
    assert!(!signal.is_expired(now));
    assert!(signal.is_expired(now + Duration::minutes(30)));
}

#[test]
fn test_diagnostics_accompany_emitted_signal() {
    let evaluation = generator(PipelineConfig::default()).evaluate_at(&long_request(), fixed_now());
    let diagnostics = &evaluation.diagnostics;

    let confluence = diagnostics.confluence.as_ref().unwrap();
    assert!(confluence.passed);
    assert_eq!(confluence.direction, Some(SignalDirection::Long));
    assert_eq!(confluence.matched_factors.len(), 5);

    assert_eq!(diagnostics.indicators.as_ref().unwrap().trend_score, 55);
    assert!(diagnostics.structure.is_some());
    assert_eq!(diagnostics.risk.as_ref().unwrap().recommended_leverage, 10);
    assert!(diagnostics.validation.as_ref().unwrap().is_valid());
    assert_eq!(diagnostics.confidence.as_ref().unwrap().value, 1.0);
    assert!(diagnostics.macro_trends.is_empty());
}

#[test]
fn test_ids_follow_shared_sequence() {
    let sequence = Arc::new(SignalIdSequence::new());
    let first = SignalGenerator::new(PipelineConfig::default(), sequence.clone());
    let second = SignalGenerator::new(PipelineConfig::default(), sequence);

    let a = first.evaluate_at(&long_request(), fixed_now());
    let b = second.evaluate_at(&long_request(), fixed_now());
    assert_eq!(a.signal().unwrap().id, "sig_20240307_001");
    assert_eq!(b.signal().unwrap().id, "sig_20240307_002");
}

#[test]
fn test_downtrend_emits_short() {
    let request = SignalRequest::new("ETHUSDT", "1h", downtrend_candles())
        .with_volume(selling_volume())
        .with_dom(ask_heavy_dom());
    let evaluation = generator(PipelineConfig::default()).evaluate_at(&request, fixed_now());

    let signal = evaluation.signal().expect("short signal");
    assert_eq!(signal.direction, SignalDirection::Short);
    assert!((signal.entry_price - 111.7).abs() < 1e-9);
    let tps = &signal.take_profits;
    assert!(signal.stop_loss > signal.entry_price);
    assert!(signal.entry_price > tps[0].price);
    assert!(tps[0].price > tps[1].price && tps[1].price > tps[2].price);
    assert_eq!(signal.confidence, 1.0);
    assert!(signal.triggers.contains(&TriggerKind::MacdCrossover));
}

#[test]
fn test_short_window_rejected() {
    let candles = uptrend_candles()[..49].to_vec();
    let request = SignalRequest::new("BTCUSDT", "15m", candles).with_volume(buying_volume());
    let evaluation = generator(PipelineConfig::default()).evaluate_at(&request, fixed_now());

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, PipelineStage::Start);
    assert_eq!(
        rejection.reason,
        RejectReason::InsufficientCandles {
            required: 50,
            actual: 49
        }
    );
    assert!(rejection.reason.to_string().contains("candles"));
    assert!(evaluation.diagnostics.indicators.is_none());
}

#[test]
fn test_invalid_candle_rejected_at_indicators() {
    let mut candles = uptrend_candles();
    candles[30].high = candles[30].low - 1.0;
    let request = SignalRequest::new("BTCUSDT", "15m", candles);
    let evaluation = generator(PipelineConfig::default()).evaluate_at(&request, fixed_now());

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, PipelineStage::Indicators);
    assert!(matches!(rejection.reason, RejectReason::IndicatorFailure { .. }));
}

#[test]
fn test_missing_order_flow_fails_confluence() {
    let request = SignalRequest::new("BTCUSDT", "15m", uptrend_candles());
    let evaluation = generator(PipelineConfig::default()).evaluate_at(&request, fixed_now());

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, PipelineStage::Confluence);
    assert_eq!(
        rejection.reason,
        RejectReason::ConfluenceFailed {
            mode: ConfluenceMode::Strict,
            matched: 3,
            mismatched: 2
        }
    );
    assert_eq!(
        rejection.reason.to_string(),
        "strict confluence failed: 3 matched, 2 mismatched"
    );

    // Everything computed up to the failing gate is still reported
    let diagnostics = &evaluation.diagnostics;
    assert!(diagnostics.indicators.is_some());
    assert!(diagnostics.structure.is_some());
    assert!(diagnostics.triggers.is_some());
    assert!(diagnostics.levels.is_none());
    assert!(diagnostics.confidence.is_none());
}

#[test]
fn test_relaxed_mode_accepts_weighted_majority() {
    let config = PipelineConfig {
        confluence_mode: ConfluenceMode::Relaxed,
        ..PipelineConfig::default()
    };
    let request = SignalRequest::new("BTCUSDT", "15m", uptrend_candles());
    let evaluation = generator(config).evaluate_at(&request, fixed_now());

    let signal = evaluation.signal().expect("relaxed signal");
    assert_eq!(signal.direction, SignalDirection::Long);
    let confluence = evaluation.diagnostics.confluence.unwrap();
    assert_eq!(confluence.mode, ConfluenceMode::Relaxed);
    assert_eq!(confluence.score, 3.0);
}

#[test]
fn test_flat_market_rejected() {
    let request = SignalRequest::new("BTCUSDT", "15m", flat_candles(60, 100.0));
    let evaluation = generator(PipelineConfig::default()).evaluate_at(&request, fixed_now());

    assert!(!evaluation.is_emitted());
    assert_eq!(evaluation.rejection().unwrap().stage, PipelineStage::Confluence);
}

#[test]
fn test_stalling_uptrend_confidence() {
    let request = SignalRequest::new("BTCUSDT", "15m", stalling_uptrend_candles())
        .with_volume(buying_volume())
        .with_dom(bid_heavy_dom());

    let evaluation = generator(PipelineConfig::default()).evaluate_at(&request, fixed_now());
    let signal = evaluation.signal().expect("signal at default threshold");
    assert_eq!(signal.confidence, 0.92);
    assert_eq!(signal.triggers, vec![TriggerKind::Bos]);

    let strict = PipelineConfig {
        min_confidence: 0.95,
        ..PipelineConfig::default()
    };
    let evaluation = generator(strict).evaluate_at(&request, fixed_now());
    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, PipelineStage::Confidence);
    assert_eq!(
        rejection.reason,
        RejectReason::LowConfidence {
            confidence: 0.92,
            threshold: 0.95
        }
    );
    assert_eq!(
        rejection.reason.to_string(),
        "confidence 0.920 below threshold 0.95"
    );
    assert!(evaluation.diagnostics.levels.is_some());
    assert_eq!(evaluation.diagnostics.confidence.unwrap().value, 0.92);
    assert!(evaluation.diagnostics.validation.is_none());
}

#[test]
fn test_evaluation_serializes() {
    let generator = generator(PipelineConfig::default());

    let emitted = generator.evaluate_at(&long_request(), fixed_now());
    let json = serde_json::to_value(&emitted).unwrap();
    assert_eq!(json["outcome"]["Ok"]["direction"], "LONG");
    assert_eq!(json["outcome"]["Ok"]["mode"], "standard");
    assert_eq!(json["outcome"]["Ok"]["triggers"][0], "macd_crossover");
    assert!(json["diagnostics"].get("macro_trends").is_none());

    let short = SignalRequest::new("BTCUSDT", "15m", flat_candles(10, 100.0));
    let rejected = generator.evaluate_at(&short, fixed_now());
    let json = serde_json::to_value(&rejected).unwrap();
    assert_eq!(json["outcome"]["Err"]["stage"], "start");
    assert_eq!(json["outcome"]["Err"]["reason"]["kind"], "insufficient_candles");
    assert_eq!(json["outcome"]["Err"]["reason"]["actual"], 10);
}
