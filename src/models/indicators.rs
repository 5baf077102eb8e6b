use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }
}

/// Directional reading shared by indicators, structure and factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl Bias {
    pub fn sign(self) -> i32 {
        match self {
            Bias::Bullish => 1,
            Bias::Bearish => -1,
            Bias::Neutral => 0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Bias::Bullish => Bias::Bearish,
            Bias::Bearish => Bias::Bullish,
            Bias::Neutral => Bias::Neutral,
        }
    }
}

/// Oversold/overbought classification for bounded oscillators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OscillatorState {
    Oversold,
    Overbought,
    #[default]
    Neutral,
}

impl OscillatorState {
    pub fn is_extreme(self) -> bool {
        !matches!(self, OscillatorState::Neutral)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaLevel {
    pub period: u32,
    pub value: f64,
    pub price_above: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmaSet {
    pub ema9: Option<EmaLevel>,
    pub ema21: Option<EmaLevel>,
    pub ema50: Option<EmaLevel>,
    pub ema200: Option<EmaLevel>,
}

impl EmaSet {
    pub fn levels(&self) -> impl Iterator<Item = &EmaLevel> {
        [&self.ema9, &self.ema21, &self.ema50, &self.ema200]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmaSet {
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SupertrendReading {
    pub direction: Bias,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdxStrength {
    #[default]
    Weak,
    Moderate,
    Strong,
    Extreme,
}

impl AdxStrength {
    pub fn from_value(adx: f64) -> Self {
        if adx < 25.0 {
            AdxStrength::Weak
        } else if adx < 50.0 {
            AdxStrength::Moderate
        } else if adx < 75.0 {
            AdxStrength::Strong
        } else {
            AdxStrength::Extreme
        }
    }

    /// Strong or extreme trend strength.
    pub fn is_trending(self) -> bool {
        matches!(self, AdxStrength::Strong | AdxStrength::Extreme)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AdxReading {
    pub value: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub strength: AdxStrength,
    pub direction: Bias,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub state: OscillatorState,
    pub previous: f64,
}

impl Default for RsiReading {
    fn default() -> Self {
        Self {
            value: 50.0,
            state: OscillatorState::Neutral,
            previous: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MacdReading {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
    pub direction: Bias,
    /// Set when the histogram changed sign on the last bar.
    pub crossover: Option<Bias>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochRsiReading {
    pub k: f64,
    pub d: f64,
    pub state: OscillatorState,
}

impl Default for StochRsiReading {
    fn default() -> Self {
        Self {
            k: 50.0,
            d: 50.0,
            state: OscillatorState::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OscillatorReading {
    pub value: f64,
    pub state: OscillatorState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BollingerPosition {
    AboveUpper,
    #[default]
    UpperHalf,
    LowerHalf,
    BelowLower,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Band width as a percentage of the middle band.
    pub bandwidth: f64,
    pub position: BollingerPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    #[default]
    Low,
    Moderate,
    High,
}

impl VolatilityLevel {
    pub fn from_atr_pct(atr_pct: f64) -> Self {
        if atr_pct > 2.0 {
            VolatilityLevel::High
        } else if atr_pct > 1.0 {
            VolatilityLevel::Moderate
        } else {
            VolatilityLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AtrReading {
    pub value: f64,
    /// ATR as a percentage of the last close.
    pub pct: f64,
    pub volatility: VolatilityLevel,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VwapReading {
    pub value: f64,
    pub position: Bias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObvTrend {
    Rising,
    Falling,
    #[default]
    Flat,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ObvReading {
    pub value: f64,
    pub trend: ObvTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlePattern {
    BullishEngulfing,
    BearishEngulfing,
    Hammer,
    ShootingStar,
    Doji,
    MorningStar,
    EveningStar,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
}

impl CandlePattern {
    pub fn bias(self) -> Bias {
        match self {
            CandlePattern::BullishEngulfing
            | CandlePattern::Hammer
            | CandlePattern::MorningStar
            | CandlePattern::ThreeWhiteSoldiers => Bias::Bullish,
            CandlePattern::BearishEngulfing
            | CandlePattern::ShootingStar
            | CandlePattern::EveningStar
            | CandlePattern::ThreeBlackCrows => Bias::Bearish,
            CandlePattern::Doji => Bias::Neutral,
        }
    }
}

/// Every indicator reading derived from one candle window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub trend_score: i32,
    pub momentum_score: f64,
    pub ema: EmaSet,
    pub sma: SmaSet,
    pub supertrend: SupertrendReading,
    pub adx: AdxReading,
    pub rsi: RsiReading,
    pub macd: MacdReading,
    pub stoch_rsi: StochRsiReading,
    pub cci: OscillatorReading,
    pub williams_r: OscillatorReading,
    pub mfi: OscillatorReading,
    pub bollinger: BollingerReading,
    pub atr: AtrReading,
    pub vwap: VwapReading,
    pub obv: ObvReading,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<CandlePattern>,
}

impl IndicatorSnapshot {
    /// Zero-value snapshot: every score neutral, no levels.
    pub fn neutral(price: f64) -> Self {
        Self {
            price,
            trend_score: 0,
            momentum_score: 0.0,
            ema: EmaSet::default(),
            sma: SmaSet::default(),
            supertrend: SupertrendReading {
                direction: Bias::Neutral,
                value: price,
            },
            adx: AdxReading::default(),
            rsi: RsiReading::default(),
            macd: MacdReading::default(),
            stoch_rsi: StochRsiReading::default(),
            cci: OscillatorReading::default(),
            williams_r: OscillatorReading {
                value: -50.0,
                state: OscillatorState::Neutral,
            },
            mfi: OscillatorReading {
                value: 50.0,
                state: OscillatorState::Neutral,
            },
            bollinger: BollingerReading {
                upper: price,
                middle: price,
                lower: price,
                bandwidth: 0.0,
                position: BollingerPosition::UpperHalf,
            },
            atr: AtrReading::default(),
            vwap: VwapReading {
                value: price,
                position: Bias::Neutral,
            },
            obv: ObvReading::default(),
            patterns: Vec::new(),
        }
    }
}
