//! Average True Range (ATR).
//!
//! True range: max(high-low, |high-prev_close|, |low-prev_close|), defined
//! from the second bar on. ATR is the EMA of the true-range series, with the
//! same first-value seeding as every other EMA here.

use super::ema::ema;
use super::IndicatorError;

/// Default ATR period.
pub const ATR_PERIOD: usize = 14;

/// True-range series. Entry `i` covers the bar at index `i + 1` of the
/// inputs; the first bar has no previous close and contributes nothing.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    (1..highs.len().min(lows.len()).min(closes.len()))
        .map(|i| {
            let high = highs[i];
            let low = lows[i];
            let prev_close = closes[i - 1];
            (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs())
        })
        .collect()
}

/// Compute the ATR over aligned high/low/close series and return the most
/// recent value.
///
/// Requires `period + 1` aligned triples (the extra point supplies the first
/// previous close).
pub fn atr(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<f64, IndicatorError> {
    if highs.len() != lows.len() || lows.len() != closes.len() {
        return Err(IndicatorError::Calculation(format!(
            "misaligned OHLC series: {} highs, {} lows, {} closes",
            highs.len(),
            lows.len(),
            closes.len()
        )));
    }
    if closes.len() < period + 1 {
        return Err(IndicatorError::InsufficientData {
            required: period + 1,
            available: closes.len(),
        });
    }

    let tr = true_range(highs, lows, closes);
    let value = ema(&tr, period)?;
    if !value.is_finite() || value < 0.0 {
        return Err(IndicatorError::Calculation(format!(
            "ATR({period}) produced an invalid value: {value}"
        )));
    }
    Ok(value)
}
