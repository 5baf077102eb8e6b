//! Stop-loss and take-profit placement from ATR.

use serde::{Deserialize, Serialize};

use crate::models::indicators::{AtrReading, VolatilityLevel};
use crate::models::signal::{SignalDirection, TakeProfit, TrailingStop};
use crate::signals::risk::RiskManager;

/// How far the stop sits and where the three targets land, in multiples
/// of the stop distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelPlan {
    pub atr_multiplier: f64,
    /// Stop caps as a percent of entry for high, moderate and low volatility.
    pub stop_cap_pct: [f64; 3],
    pub reward_multiples: [f64; 3],
    pub allocations: [f64; 3],
}

pub const STANDARD_PLAN: LevelPlan = LevelPlan {
    atr_multiplier: 1.5,
    stop_cap_pct: [0.6, 0.8, 1.0],
    reward_multiples: [2.0, 3.2, 4.5],
    allocations: [40.0, 35.0, 25.0],
};

/// Blends to a fixed 3.475 R:R for any entry and ATR, above the default
/// sniper floor of 2.5. The level 3 gate only bites when the floor is raised
/// or the plan is changed.
pub const SNIPER_PLAN: LevelPlan = LevelPlan {
    atr_multiplier: 1.5,
    stop_cap_pct: [0.5, 0.7, 1.0],
    reward_multiples: [2.5, 3.5, 5.0],
    allocations: [40.0, 35.0, 25.0],
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub stop_distance: f64,
    pub take_profits: [TakeProfit; 3],
    pub risk_reward: f64,
}

impl PriceLevels {
    /// Activates at the first target and trails by the stop distance.
    pub fn trailing_stop(&self) -> TrailingStop {
        TrailingStop {
            enabled: true,
            activation_price: self.take_profits[0].price,
            trail_distance: self.stop_distance,
        }
    }
}

impl LevelPlan {
    pub fn stop_cap(&self, volatility: VolatilityLevel) -> f64 {
        match volatility {
            VolatilityLevel::High => self.stop_cap_pct[0],
            VolatilityLevel::Moderate => self.stop_cap_pct[1],
            VolatilityLevel::Low => self.stop_cap_pct[2],
        }
    }

    /// R:R of every level set this plan produces: allocation-weighted mean
    /// of the reward multiples.
    pub fn planned_risk_reward(&self) -> f64 {
        let allocated: f64 = self.allocations.iter().sum();
        if allocated <= 0.0 {
            return 0.0;
        }
        self.reward_multiples
            .iter()
            .zip(self.allocations.iter())
            .map(|(multiple, allocation)| multiple * allocation)
            .sum::<f64>()
            / allocated
    }

    pub fn stop_distance(&self, entry: f64, atr: &AtrReading) -> f64 {
        let by_atr = atr.value * self.atr_multiplier;
        let cap = entry * self.stop_cap(atr.volatility) / 100.0;
        by_atr.min(cap)
    }

    pub fn compute(&self, direction: SignalDirection, entry: f64, atr: &AtrReading) -> PriceLevels {
        let sign = direction.sign();
        let stop_distance = self.stop_distance(entry, atr);
        let stop_loss = entry - sign * stop_distance;

        let mut take_profits = [TakeProfit {
            price: entry,
            percentage: 0.0,
        }; 3];
        for (tp, (multiple, allocation)) in take_profits
            .iter_mut()
            .zip(self.reward_multiples.iter().zip(self.allocations.iter()))
        {
            tp.price = entry + sign * stop_distance * multiple;
            tp.percentage = *allocation;
        }

        PriceLevels {
            entry,
            stop_loss,
            stop_distance,
            take_profits,
            risk_reward: RiskManager::risk_reward(entry, stop_loss, &take_profits),
        }
    }
}
