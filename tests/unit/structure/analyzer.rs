//! Unit tests for market structure analysis

use perptrix_signals::indicators::IndicatorError;
use perptrix_signals::models::{Bias, Candle, StructureBias, SwingPoint};
use perptrix_signals::structure::{
    bias_score, detect_bos, detect_choch, detect_fair_value_gaps, detect_order_blocks,
    detect_trend, find_swing_highs, StructureAnalyzer, SWING_WINDOW,
};

use crate::fixtures::{downtrend_candles, flat_candles, uptrend_candles};

fn swings(points: &[(usize, f64)]) -> Vec<SwingPoint> {
    points
        .iter()
        .map(|&(index, price)| SwingPoint { index, price })
        .collect()
}

#[test]
fn test_structure_requires_thirty_candles() {
    let err = StructureAnalyzer::analyze(&flat_candles(29, 100.0)).unwrap_err();
    assert!(matches!(
        err,
        IndicatorError::InsufficientData {
            required: 30,
            actual: 29
        }
    ));
}

#[test]
fn test_uptrend_structure() {
    let structure = StructureAnalyzer::analyze(&uptrend_candles()).unwrap();

    let highs: Vec<usize> = structure.swing_highs.iter().map(|s| s.index).collect();
    assert_eq!(highs, vec![11, 20, 29, 38, 47]);
    assert!((structure.swing_highs[4].price - 108.2).abs() < 1e-9);

    // Six swing lows exist, only the latest five are kept
    let lows: Vec<usize> = structure.swing_lows.iter().map(|s| s.index).collect();
    assert_eq!(lows, vec![15, 24, 33, 42, 51]);

    assert_eq!(structure.trend, Bias::Bullish);
    assert_eq!(structure.bos, Some(Bias::Bullish));
    assert_eq!(structure.choch, None);
    assert_eq!(structure.bias_score, 3);
    assert_eq!(structure.bias, StructureBias::StrongBullish);

    let block = structure.order_blocks.last().unwrap();
    assert_eq!(block.direction, Bias::Bullish);
    assert_eq!(block.index, 58);
    assert!((block.high - 106.25).abs() < 1e-9);
    assert!((block.low - 105.1).abs() < 1e-9);
}

#[test]
fn test_downtrend_structure_mirrors() {
    let structure = StructureAnalyzer::analyze(&downtrend_candles()).unwrap();
    assert_eq!(structure.trend, Bias::Bearish);
    assert_eq!(structure.bos, Some(Bias::Bearish));
    assert_eq!(structure.bias, StructureBias::StrongBearish);
}

#[test]
fn test_flat_window_has_no_swings() {
    let candles = flat_candles(40, 100.0);
    assert!(find_swing_highs(&candles, SWING_WINDOW).is_empty());

    let structure = StructureAnalyzer::analyze(&candles).unwrap();
    assert_eq!(structure.trend, Bias::Neutral);
    assert_eq!(structure.bias, StructureBias::Neutral);
    assert!(structure.order_blocks.is_empty());
}

#[test]
fn test_detect_trend() {
    let rising_highs = swings(&[(5, 100.0), (10, 102.0), (15, 104.0)]);
    let rising_lows = swings(&[(3, 95.0), (8, 96.0), (13, 97.0)]);
    assert_eq!(detect_trend(&rising_highs, &rising_lows), Bias::Bullish);

    let falling_highs = swings(&[(5, 104.0), (10, 102.0), (15, 100.0)]);
    let falling_lows = swings(&[(3, 97.0), (8, 96.0), (13, 95.0)]);
    assert_eq!(detect_trend(&falling_highs, &falling_lows), Bias::Bearish);

    // Higher highs with lower lows is a broadening range
    assert_eq!(detect_trend(&rising_highs, &falling_lows), Bias::Neutral);
    assert_eq!(detect_trend(&[], &[]), Bias::Neutral);
}

#[test]
fn test_detect_trend_prefers_bullish() {
    // Both sides show a higher and a lower swing
    let highs = swings(&[(5, 100.0), (10, 102.0), (15, 101.0)]);
    let lows = swings(&[(3, 95.0), (8, 96.0), (13, 94.0)]);
    assert_eq!(detect_trend(&highs, &lows), Bias::Bullish);
}

#[test]
fn test_detect_bos() {
    let highs = swings(&[(5, 105.0)]);
    let lows = swings(&[(3, 95.0)]);

    let breakout = vec![
        Candle::new(100.0, 101.0, 99.0, 100.0, 1.0),
        Candle::new(100.0, 106.0, 99.0, 105.5, 1.0),
        Candle::new(105.5, 106.0, 104.0, 104.5, 1.0),
    ];
    assert_eq!(detect_bos(&breakout, &highs, &lows), Some(Bias::Bullish));

    // Newest close wins when the window holds both breaks
    let both = vec![
        Candle::new(100.0, 106.0, 99.0, 105.5, 1.0),
        Candle::new(105.5, 106.0, 94.0, 94.5, 1.0),
    ];
    assert_eq!(detect_bos(&both, &highs, &lows), Some(Bias::Bearish));

    let inside = vec![Candle::new(100.0, 101.0, 99.0, 100.0, 1.0); 3];
    assert_eq!(detect_bos(&inside, &highs, &lows), None);
}

#[test]
fn test_detect_choch() {
    let highs = swings(&[(4, 110.0), (9, 112.0), (14, 114.0)]);
    let lows = swings(&[(2, 100.0), (7, 98.0), (12, 101.0)]);
    let breakdown = vec![Candle::new(99.0, 99.5, 94.0, 95.0, 1.0)];

    assert_eq!(detect_choch(&breakdown, Bias::Bullish, &highs, &lows), Some(Bias::Bearish));
    assert_eq!(detect_choch(&breakdown, Bias::Neutral, &highs, &lows), None);

    let holding = vec![Candle::new(100.0, 100.5, 99.0, 99.0, 1.0)];
    assert_eq!(detect_choch(&holding, Bias::Bullish, &highs, &lows), None);

    let reclaim = vec![Candle::new(110.0, 113.5, 109.0, 113.0, 1.0)];
    assert_eq!(detect_choch(&reclaim, Bias::Bearish, &highs, &lows), Some(Bias::Bullish));
}

#[test]
fn test_bias_score() {
    assert_eq!(bias_score(Bias::Bullish, Some(Bias::Bullish), None), 3);
    assert_eq!(bias_score(Bias::Bullish, None, Some(Bias::Bearish)), 0);
    assert_eq!(bias_score(Bias::Bearish, Some(Bias::Bearish), Some(Bias::Bearish)), -5);
    assert_eq!(StructureBias::from_score(3), StructureBias::StrongBullish);
    assert_eq!(StructureBias::from_score(1), StructureBias::Bullish);
    assert_eq!(StructureBias::from_score(0), StructureBias::Neutral);
    assert_eq!(StructureBias::from_score(-2), StructureBias::Bearish);
    assert_eq!(StructureBias::from_score(-3), StructureBias::StrongBearish);
}

#[test]
fn test_order_blocks_and_fair_value_gaps() {
    let candles = vec![
        Candle::new(101.0, 101.2, 99.8, 100.0, 1.0),
        Candle::new(100.0, 104.0, 99.9, 103.5, 1.0),
        Candle::new(103.5, 105.0, 102.0, 104.5, 1.0),
    ];

    let blocks = detect_order_blocks(&candles);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].direction, Bias::Bullish);
    assert_eq!(blocks[0].index, 0);
    assert_eq!(blocks[0].high, 101.2);

    let gaps = detect_fair_value_gaps(&candles);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].direction, Bias::Bullish);
    assert_eq!(gaps[0].index, 2);
    assert!((gaps[0].size - 0.8).abs() < 1e-9);
}
