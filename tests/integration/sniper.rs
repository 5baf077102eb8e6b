//! Sniper pipeline against counting market-context and sentiment stubs

use perptrix_signals::config::PipelineConfig;
use perptrix_signals::models::{AlignmentQuality, SignalDirection, SignalMode};
use perptrix_signals::signals::{
    PipelineStage, RejectReason, SignalRequest, SniperLevel,
};

use crate::fixtures::{
    ask_heavy_dom, bid_heavy_dom, buying_volume, downtrend_candles, rising_candles,
    selling_volume, uptrend_candles,
};
use crate::test_utils::{
    alignment, fixed_now, sniper, sniper_with_config, MockMarketContext, MockSentiment,
};

fn long_request() -> SignalRequest {
    SignalRequest::new("BTCUSDT", "15m", uptrend_candles())
        .with_volume(buying_volume())
        .with_dom(bid_heavy_dom())
}

fn short_request() -> SignalRequest {
    SignalRequest::new("BTCUSDT", "15m", downtrend_candles())
        .with_volume(selling_volume())
        .with_dom(ask_heavy_dom())
}

fn stage(level: SniperLevel) -> PipelineStage {
    PipelineStage::Sniper(level)
}

#[tokio::test]
async fn test_sniper_emits_when_every_level_passes() {
    let market = MockMarketContext::new(
        Some(uptrend_candles()),
        Some(alignment(AlignmentQuality::Perfect, Some(SignalDirection::Long))),
    );
    let sentiment = MockSentiment::new(Some(1.2));
    let orchestrator = sniper(Some(market.clone()), Some(sentiment.clone()));

    let evaluation = orchestrator.evaluate_at(&long_request(), fixed_now()).await;

    let signal = evaluation.signal().expect("sniper signal");
    assert_eq!(signal.mode, SignalMode::Sniper);
    assert_eq!(signal.direction, SignalDirection::Long);
    // Sniper plan: stop capped at 0.7% of entry, targets at 2.5/3.5/5.0R
    assert!((signal.stop_distance() - 108.3 * 0.007).abs() < 1e-9);
    assert!((signal.risk_reward - 3.475).abs() < 1e-9);
    assert_eq!(signal.confidence, 1.0);

    // One candle request per macro timeframe, one alignment request
    assert_eq!(market.candle_calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(market.alignment_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(sentiment.calls(), 1);

    let macro_trends = &evaluation.diagnostics.macro_trends;
    let timeframes: Vec<&str> = macro_trends.iter().map(|m| m.timeframe.as_str()).collect();
    assert_eq!(timeframes, vec!["1h", "4h"]);
    assert!(macro_trends.iter().all(|m| m.trend_score == Some(55)));
    assert!(evaluation.diagnostics.alignment.is_some());
    assert!(evaluation.diagnostics.sentiment.is_some());
}

#[tokio::test]
async fn test_level_one_failure_skips_collaborators() {
    let market = MockMarketContext::new(Some(uptrend_candles()), None);
    let sentiment = MockSentiment::new(Some(1.0));
    let orchestrator = sniper(Some(market.clone()), Some(sentiment.clone()));

    // No order flow: volume disagrees with the trend
    let request = SignalRequest::new("BTCUSDT", "15m", uptrend_candles());
    let evaluation = orchestrator.evaluate_at(&request, fixed_now()).await;

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, stage(SniperLevel::Confirmation));
    assert!(matches!(rejection.reason, RejectReason::ConfluenceFailed { .. }));
    assert!(rejection
        .to_string()
        .starts_with("rejected at sniper level 1 (confirmation): "));
    assert_eq!(market.calls(), 0);
    assert_eq!(sentiment.calls(), 0);
}

#[tokio::test]
async fn test_level_one_requires_structure_break() {
    // A straight line never forms swings, so there is nothing to break
    let request = SignalRequest::new("BTCUSDT", "15m", rising_candles(60, 100.0))
        .with_volume(buying_volume())
        .with_dom(bid_heavy_dom());
    let market = MockMarketContext::new(None, None);
    let evaluation = sniper(Some(market.clone()), None)
        .evaluate_at(&request, fixed_now())
        .await;

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, stage(SniperLevel::Confirmation));
    assert_eq!(market.calls(), 0);
}

#[tokio::test]
async fn test_opposing_macro_trend_rejects() {
    let market = MockMarketContext::new(
        Some(downtrend_candles()),
        Some(alignment(AlignmentQuality::Perfect, Some(SignalDirection::Long))),
    );
    let sentiment = MockSentiment::new(Some(1.0));
    let evaluation = sniper(Some(market.clone()), Some(sentiment.clone()))
        .evaluate_at(&long_request(), fixed_now())
        .await;

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, stage(SniperLevel::MacroTrend));
    assert_eq!(
        rejection.reason,
        RejectReason::MacroTrendOpposed {
            timeframe: "1h".to_string(),
            direction: SignalDirection::Long
        }
    );
    // Alignment was fetched alongside the macro candles; sentiment never was
    assert_eq!(market.calls(), 3);
    assert_eq!(sentiment.calls(), 0);
}

#[tokio::test]
async fn test_risk_reward_floor() {
    let mut config = PipelineConfig::default();
    config.sniper.min_risk_reward = 4.0;
    let market = MockMarketContext::new(Some(uptrend_candles()), None);
    let evaluation = sniper_with_config(config, Some(market), None)
        .evaluate_at(&long_request(), fixed_now())
        .await;

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, stage(SniperLevel::RiskReward));
    match &rejection.reason {
        RejectReason::RiskRewardTooLow { ratio, min } => {
            assert!((ratio - 3.475).abs() < 1e-9);
            assert_eq!(*min, 4.0);
        }
        other => panic!("unexpected reason: {other:?}"),
    }
    assert!(evaluation.diagnostics.levels.is_some());
}

#[tokio::test]
async fn test_imperfect_alignment_rejects() {
    let market = MockMarketContext::new(
        Some(uptrend_candles()),
        Some(alignment(AlignmentQuality::Strong, Some(SignalDirection::Long))),
    );
    let evaluation = sniper(Some(market), None)
        .evaluate_at(&long_request(), fixed_now())
        .await;

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, stage(SniperLevel::Alignment));
    assert_eq!(
        rejection.reason,
        RejectReason::TimeframesNotAligned {
            quality: AlignmentQuality::Strong,
            aligned: Some(SignalDirection::Long)
        }
    );
}

#[tokio::test]
async fn test_perfect_alignment_on_the_other_side_rejects() {
    let market = MockMarketContext::new(
        None,
        Some(alignment(AlignmentQuality::Perfect, Some(SignalDirection::Short))),
    );
    let evaluation = sniper(Some(market), None)
        .evaluate_at(&long_request(), fixed_now())
        .await;

    assert_eq!(
        evaluation.rejection().unwrap().stage,
        stage(SniperLevel::Alignment)
    );
}

#[tokio::test]
async fn test_crowded_longs_reject() {
    let market = MockMarketContext::new(
        Some(uptrend_candles()),
        Some(alignment(AlignmentQuality::Perfect, Some(SignalDirection::Long))),
    );
    let sentiment = MockSentiment::new(Some(3.0));
    let evaluation = sniper(Some(market), Some(sentiment))
        .evaluate_at(&long_request(), fixed_now())
        .await;

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, stage(SniperLevel::Sentiment));
    assert_eq!(
        rejection.reason,
        RejectReason::CrowdedSentiment {
            direction: SignalDirection::Long,
            ratio: 3.0,
            limit: 2.5
        }
    );
    assert!(rejection.reason.to_string().starts_with("sniper level 5"));
}

#[tokio::test]
async fn test_crowded_shorts_reject() {
    let market = MockMarketContext::new(
        Some(downtrend_candles()),
        Some(alignment(AlignmentQuality::Perfect, Some(SignalDirection::Short))),
    );
    let sentiment = MockSentiment::new(Some(0.3));
    let evaluation = sniper(Some(market), Some(sentiment))
        .evaluate_at(&short_request(), fixed_now())
        .await;

    let rejection = evaluation.rejection().unwrap();
    assert_eq!(rejection.stage, stage(SniperLevel::Sentiment));
    assert!(matches!(
        rejection.reason,
        RejectReason::CrowdedSentiment { limit, .. } if limit == 0.4
    ));
}

#[tokio::test]
async fn test_short_passes_with_balanced_sentiment() {
    let market = MockMarketContext::new(
        Some(downtrend_candles()),
        Some(alignment(AlignmentQuality::Perfect, Some(SignalDirection::Short))),
    );
    let sentiment = MockSentiment::new(Some(2.0));
    let evaluation = sniper(Some(market), Some(sentiment))
        .evaluate_at(&short_request(), fixed_now())
        .await;

    let signal = evaluation.signal().expect("short sniper signal");
    assert_eq!(signal.direction, SignalDirection::Short);
    assert_eq!(signal.mode, SignalMode::Sniper);
}

#[tokio::test]
async fn test_missing_collaborators_pass_through() {
    let evaluation = sniper(None, None)
        .evaluate_at(&long_request(), fixed_now())
        .await;

    let signal = evaluation.signal().expect("signal without collaborators");
    assert_eq!(signal.mode, SignalMode::Sniper);
    assert!(evaluation.diagnostics.macro_trends.is_empty());
    assert!(evaluation.diagnostics.alignment.is_none());
    assert!(evaluation.diagnostics.sentiment.is_none());
}

#[tokio::test]
async fn test_failing_collaborators_pass_through() {
    let market = MockMarketContext::new(None, None);
    let sentiment = MockSentiment::new(None);
    let evaluation = sniper(Some(market.clone()), Some(sentiment.clone()))
        .evaluate_at(&long_request(), fixed_now())
        .await;

    assert!(evaluation.is_emitted());
    assert_eq!(market.calls(), 3);
    assert_eq!(sentiment.calls(), 1);
    assert!(evaluation
        .diagnostics
        .macro_trends
        .iter()
        .all(|m| m.trend_score.is_none()));
}

#[tokio::test]
async fn test_short_macro_history_is_unavailable() {
    let market = MockMarketContext::new(Some(uptrend_candles()[..20].to_vec()), None);
    let evaluation = sniper(Some(market), None)
        .evaluate_at(&short_request(), fixed_now())
        .await;

    // An unreadable higher timeframe cannot oppose the trade
    assert!(evaluation.is_emitted());
    assert_eq!(evaluation.diagnostics.macro_trends.len(), 2);
}
