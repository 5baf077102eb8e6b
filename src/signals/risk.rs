//! Volatility-driven leverage, position sizing and stop/target validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::indicators::{IndicatorSnapshot, VolatilityLevel};
use crate::models::signal::{SignalDirection, TakeProfit};

pub const PLATFORM_MAX_LEVERAGE: u32 = 20;
pub const MAX_STOP_DISTANCE_PCT: f64 = 10.0;
pub const MIN_STOP_DISTANCE_PCT: f64 = 0.2;
pub const MIN_HEALTHY_RISK_REWARD: f64 = 1.5;

/// Share of the `entry / leverage` distance at which liquidation is estimated.
const LIQUIDATION_BUFFER: f64 = 0.9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub recommended_leverage: u32,
    pub max_leverage: u32,
    pub atr_pct: f64,
    pub volatility_level: VolatilityLevel,
    /// Account share to risk per trade, in percent.
    pub risk_per_trade: f64,
    pub max_position_size_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSize {
    pub risk_amount: f64,
    pub contracts: f64,
    pub notional: f64,
    pub margin: f64,
    pub liquidation_price: f64,
}

/// Hard failures: the signal must not be emitted.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum RiskViolation {
    #[error("stop distance {pct:.2}% exceeds {max}% of entry")]
    StopTooWide { pct: f64, max: f64 },
    #[error("stop loss equals entry")]
    ZeroStopDistance,
    #[error("stop loss {stop} on the wrong side of entry {entry} for {direction}")]
    StopWrongSide {
        direction: SignalDirection,
        entry: f64,
        stop: f64,
    },
    #[error("no take-profit levels supplied")]
    NoTakeProfits,
    #[error("take-profit {price} on the wrong side of entry {entry} for {direction}")]
    TakeProfitWrongSide {
        direction: SignalDirection,
        entry: f64,
        price: f64,
    },
}

/// Soft findings: logged and reported, not blocking.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum RiskWarning {
    #[error("stop distance {pct:.3}% is tighter than {min}%")]
    StopTooTight { pct: f64, min: f64 },
    #[error("leverage {leverage}x exceeds recommended {recommended}x")]
    LeverageAboveRecommended { leverage: u32, recommended: u32 },
    #[error("risk:reward {ratio:.2} below {min}")]
    LowRiskReward { ratio: f64, min: f64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskValidation {
    pub errors: Vec<RiskViolation>,
    pub warnings: Vec<RiskWarning>,
}

impl RiskValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RiskManager {
    max_leverage: u32,
}

impl Default for RiskManager {
    fn default() -> Self {
        Self::new(PLATFORM_MAX_LEVERAGE)
    }
}

impl RiskManager {
    /// `max_leverage` can lower, never raise, the platform cap.
    pub fn new(max_leverage: u32) -> Self {
        Self {
            max_leverage: max_leverage.clamp(1, PLATFORM_MAX_LEVERAGE),
        }
    }

    pub fn max_leverage(&self) -> u32 {
        self.max_leverage
    }

    /// Step function from ATR% to leverage.
    pub fn suggest_leverage(&self, atr_pct: f64) -> u32 {
        let leverage = if atr_pct >= 3.0 {
            3
        } else if atr_pct >= 2.0 {
            5
        } else if atr_pct >= 1.5 {
            8
        } else if atr_pct >= 1.0 {
            10
        } else if atr_pct >= 0.5 {
            15
        } else {
            20
        };
        leverage.min(self.max_leverage)
    }

    pub fn assess(&self, indicators: &IndicatorSnapshot) -> RiskAssessment {
        let atr_pct = indicators.atr.pct;
        let recommended_leverage = self.suggest_leverage(atr_pct);
        let volatility_level = indicators.atr.volatility;
        let (risk_per_trade, max_position_size_pct) = match volatility_level {
            VolatilityLevel::High => (0.5, 10.0),
            VolatilityLevel::Moderate => (1.0, 20.0),
            VolatilityLevel::Low => (1.5, 30.0),
        };

        RiskAssessment {
            recommended_leverage,
            max_leverage: (recommended_leverage * 2).min(self.max_leverage),
            atr_pct,
            volatility_level,
            risk_per_trade,
            max_position_size_pct,
        }
    }

    /// Contracts sized so hitting the stop loses `risk_pct` of `balance`.
    /// `None` when the stop distance or leverage is zero.
    pub fn position_size(
        &self,
        balance: f64,
        risk_pct: f64,
        direction: SignalDirection,
        entry: f64,
        stop: f64,
        leverage: u32,
    ) -> Option<PositionSize> {
        let stop_distance = (entry - stop).abs();
        if stop_distance <= 0.0 || leverage == 0 {
            return None;
        }

        let risk_amount = balance * risk_pct / 100.0;
        let contracts = risk_amount / stop_distance;
        let notional = contracts * entry;
        let margin = notional / leverage as f64;
        let liquidation_distance = entry / leverage as f64 * LIQUIDATION_BUFFER;
        let liquidation_price = entry - direction.sign() * liquidation_distance;

        Some(PositionSize {
            risk_amount,
            contracts,
            notional,
            margin,
            liquidation_price,
        })
    }

    /// Allocation-weighted mean reward distance over the stop distance.
    pub fn risk_reward(entry: f64, stop: f64, take_profits: &[TakeProfit]) -> f64 {
        let risk = (entry - stop).abs();
        let total_pct: f64 = take_profits.iter().map(|tp| tp.percentage).sum();
        if risk <= 0.0 || total_pct <= 0.0 {
            return 0.0;
        }
        let weighted_reward: f64 = take_profits
            .iter()
            .map(|tp| (tp.price - entry).abs() * tp.percentage)
            .sum::<f64>()
            / total_pct;
        weighted_reward / risk
    }

    pub fn validate_signal(
        &self,
        direction: SignalDirection,
        entry: f64,
        stop: f64,
        take_profits: &[TakeProfit],
        leverage: u32,
        recommended_leverage: u32,
    ) -> RiskValidation {
        let mut validation = RiskValidation::default();
        let sign = direction.sign();
        let stop_distance = (entry - stop).abs();
        let stop_pct = if entry > 0.0 {
            stop_distance / entry * 100.0
        } else {
            0.0
        };

        if stop_distance == 0.0 {
            validation.errors.push(RiskViolation::ZeroStopDistance);
        } else if (stop - entry) * sign > 0.0 {
            validation.errors.push(RiskViolation::StopWrongSide {
                direction,
                entry,
                stop,
            });
        }

        if stop_pct > MAX_STOP_DISTANCE_PCT {
            validation.errors.push(RiskViolation::StopTooWide {
                pct: stop_pct,
                max: MAX_STOP_DISTANCE_PCT,
            });
        }

        if take_profits.is_empty() {
            validation.errors.push(RiskViolation::NoTakeProfits);
        }
        for tp in take_profits {
            if (tp.price - entry) * sign <= 0.0 {
                validation.errors.push(RiskViolation::TakeProfitWrongSide {
                    direction,
                    entry,
                    price: tp.price,
                });
            }
        }

        if stop_distance > 0.0 && stop_pct < MIN_STOP_DISTANCE_PCT {
            validation.warnings.push(RiskWarning::StopTooTight {
                pct: stop_pct,
                min: MIN_STOP_DISTANCE_PCT,
            });
        }
        if leverage > recommended_leverage {
            validation.warnings.push(RiskWarning::LeverageAboveRecommended {
                leverage,
                recommended: recommended_leverage,
            });
        }
        let ratio = Self::risk_reward(entry, stop, take_profits);
        if !take_profits.is_empty() && ratio < MIN_HEALTHY_RISK_REWARD {
            validation.warnings.push(RiskWarning::LowRiskReward {
                ratio,
                min: MIN_HEALTHY_RISK_REWARD,
            });
        }

        validation
    }
}
