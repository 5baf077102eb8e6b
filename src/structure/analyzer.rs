//! Smart-money structure analysis: trend, BOS/CHoCH, order blocks, FVGs.

use tracing::debug;

use crate::indicators::error::IndicatorError;
use crate::indicators::validation::validate_candles;
use crate::models::indicators::{Bias, Candle};
use crate::models::structure::{
    FairValueGap, OrderBlock, StructureBias, StructureSnapshot, SwingPoint,
};
use crate::structure::swings::{find_swing_highs, find_swing_lows, tail, SWING_WINDOW};

pub const MIN_STRUCTURE_CANDLES: usize = 30;

/// Recent items kept per category in the snapshot.
pub const MAX_TRACKED: usize = 5;

const TREND_SWINGS: usize = 3;
const BOS_CLOSES: usize = 3;
const ORDER_BLOCK_BODY_RATIO: f64 = 2.0;

pub struct StructureAnalyzer;

impl StructureAnalyzer {
    pub fn analyze(candles: &[Candle]) -> Result<StructureSnapshot, IndicatorError> {
        validate_candles(candles, MIN_STRUCTURE_CANDLES)?;

        let swing_highs = find_swing_highs(candles, SWING_WINDOW);
        let swing_lows = find_swing_lows(candles, SWING_WINDOW);

        let trend = detect_trend(&swing_highs, &swing_lows);
        let bos = detect_bos(candles, &swing_highs, &swing_lows);
        let choch = detect_choch(candles, trend, &swing_highs, &swing_lows);

        let bias_score = bias_score(trend, bos, choch);
        let bias = StructureBias::from_score(bias_score);

        debug!(
            trend = ?trend,
            bos = ?bos,
            choch = ?choch,
            bias = bias.as_str(),
            swing_highs = swing_highs.len(),
            swing_lows = swing_lows.len(),
            "StructureAnalyzer: analyzed {} candles",
            candles.len()
        );

        Ok(StructureSnapshot {
            trend,
            bos,
            choch,
            order_blocks: tail(&detect_order_blocks(candles), MAX_TRACKED).to_vec(),
            fair_value_gaps: tail(&detect_fair_value_gaps(candles), MAX_TRACKED).to_vec(),
            swing_highs: tail(&swing_highs, MAX_TRACKED).to_vec(),
            swing_lows: tail(&swing_lows, MAX_TRACKED).to_vec(),
            bias,
            bias_score,
        })
    }
}

/// Bullish when the last three swing highs and lows show at least one
/// higher high and one higher low; bearish for a lower high and a lower low.
/// Bullish is checked first.
pub fn detect_trend(swing_highs: &[SwingPoint], swing_lows: &[SwingPoint]) -> Bias {
    let highs = tail(swing_highs, TREND_SWINGS);
    let lows = tail(swing_lows, TREND_SWINGS);

    let higher_high = highs.windows(2).any(|w| w[1].price > w[0].price);
    let lower_high = highs.windows(2).any(|w| w[1].price < w[0].price);
    let higher_low = lows.windows(2).any(|w| w[1].price > w[0].price);
    let lower_low = lows.windows(2).any(|w| w[1].price < w[0].price);

    if higher_high && higher_low {
        Bias::Bullish
    } else if lower_high && lower_low {
        Bias::Bearish
    } else {
        Bias::Neutral
    }
}

/// Break of structure: the most recent swing high (low) taken out by one of
/// the last three closes. The newest close is checked first.
pub fn detect_bos(
    candles: &[Candle],
    swing_highs: &[SwingPoint],
    swing_lows: &[SwingPoint],
) -> Option<Bias> {
    let last_high = swing_highs.last();
    let last_low = swing_lows.last();

    tail(candles, BOS_CLOSES).iter().rev().find_map(|candle| {
        if last_high.is_some_and(|high| candle.close > high.price) {
            Some(Bias::Bullish)
        } else if last_low.is_some_and(|low| candle.close < low.price) {
            Some(Bias::Bearish)
        } else {
            None
        }
    })
}

/// Change of character: the last close beyond the second-most-recent swing
/// against the prevailing trend.
pub fn detect_choch(
    candles: &[Candle],
    trend: Bias,
    swing_highs: &[SwingPoint],
    swing_lows: &[SwingPoint],
) -> Option<Bias> {
    let close = candles.last()?.close;
    let second_last = |swings: &[SwingPoint]| {
        (swings.len() >= 2).then(|| swings[swings.len() - 2].price)
    };

    match trend {
        Bias::Bullish => second_last(swing_lows)
            .filter(|low| close < *low)
            .map(|_| Bias::Bearish),
        Bias::Bearish => second_last(swing_highs)
            .filter(|high| close > *high)
            .map(|_| Bias::Bullish),
        Bias::Neutral => None,
    }
}

/// A candle followed by an opposite-colored candle with more than twice its
/// body. The zone is the earlier candle's range.
pub fn detect_order_blocks(candles: &[Candle]) -> Vec<OrderBlock> {
    candles
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let (base, impulse) = (&pair[0], &pair[1]);
            if impulse.body() <= ORDER_BLOCK_BODY_RATIO * base.body() {
                return None;
            }
            let direction = if base.is_bearish() && impulse.is_bullish() {
                Bias::Bullish
            } else if base.is_bullish() && impulse.is_bearish() {
                Bias::Bearish
            } else {
                return None;
            };
            Some(OrderBlock {
                direction,
                index: i,
                high: base.high,
                low: base.low,
            })
        })
        .collect()
}

/// Three-bar gaps: bar N's low above bar N-2's high (bullish) or bar N's
/// high below bar N-2's low (bearish).
pub fn detect_fair_value_gaps(candles: &[Candle]) -> Vec<FairValueGap> {
    candles
        .windows(3)
        .enumerate()
        .filter_map(|(i, bars)| {
            let (first, third) = (&bars[0], &bars[2]);
            let (direction, top, bottom) = if third.low > first.high {
                (Bias::Bullish, third.low, first.high)
            } else if third.high < first.low {
                (Bias::Bearish, first.low, third.high)
            } else {
                return None;
            };
            Some(FairValueGap {
                direction,
                index: i + 2,
                top,
                bottom,
                size: top - bottom,
            })
        })
        .collect()
}

/// +2 trend, +1 BOS, +2 CHoCH; bearish readings mirror.
pub fn bias_score(trend: Bias, bos: Option<Bias>, choch: Option<Bias>) -> i32 {
    2 * trend.sign() + bos.map_or(0, Bias::sign) + 2 * choch.map_or(0, Bias::sign)
}
