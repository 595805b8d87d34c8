//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//! Seed: EMA[0] = x[0] (adjust=false semantics; no SMA seed).

use super::IndicatorError;

/// Compute the EMA over `values` and return the most recent value.
///
/// Requires at least `period` points.
pub fn ema(values: &[f64], period: usize) -> Result<f64, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::Calculation(
            "EMA period must be >= 1".into(),
        ));
    }
    if values.len() < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            available: values.len(),
        });
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut current = values[0];
    for &value in &values[1..] {
        current = alpha * value + (1.0 - alpha) * current;
    }

    if !current.is_finite() {
        return Err(IndicatorError::Calculation(format!(
            "EMA({period}) produced a non-finite value"
        )));
    }
    Ok(current)
}
