use crate::indicators::error::IndicatorError;
use crate::models::indicators::Candle;

pub fn validate_price(index: usize, name: &str, price: f64) -> Result<(), IndicatorError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(IndicatorError::InvalidCandle {
            index,
            reason: format!("{} must be a positive finite number, got {}", name, price),
        });
    }
    Ok(())
}

pub fn validate_candle(index: usize, candle: &Candle) -> Result<(), IndicatorError> {
    validate_price(index, "open", candle.open)?;
    validate_price(index, "high", candle.high)?;
    validate_price(index, "low", candle.low)?;
    validate_price(index, "close", candle.close)?;

    if !candle.volume.is_finite() || candle.volume < 0.0 {
        return Err(IndicatorError::InvalidCandle {
            index,
            reason: format!("volume must be non-negative, got {}", candle.volume),
        });
    }
    if candle.high < candle.low {
        return Err(IndicatorError::InvalidCandle {
            index,
            reason: format!("high {} below low {}", candle.high, candle.low),
        });
    }
    Ok(())
}

/// Checks window length and every candle's sanity.
pub fn validate_candles(candles: &[Candle], required: usize) -> Result<(), IndicatorError> {
    if candles.len() < required {
        return Err(IndicatorError::InsufficientData {
            required,
            actual: candles.len(),
        });
    }
    candles
        .iter()
        .enumerate()
        .try_for_each(|(index, candle)| validate_candle(index, candle))
}

pub fn ensure_finite(name: &str, value: f64) -> Result<f64, IndicatorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IndicatorError::Computation(format!("{} is not finite", name)))
    }
}
