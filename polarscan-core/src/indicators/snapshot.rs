//! Per-bar indicator snapshot — the signal engine's entire view of a bar.

use serde::{Deserialize, Serialize};

use super::atr::{atr, ATR_PERIOD};
use super::ema::ema;
use super::IndicatorError;

/// EMA periods computed for every snapshot, shortest first.
pub const EMA_PERIODS: [usize; 5] = [5, 8, 13, 21, 50];

/// Points required before any snapshot can be produced: the longest EMA
/// period plus one extra bar for the ATR's previous close.
pub const SNAPSHOT_MIN_LEN: usize = 51;

/// EMA, ATR, and ATR-band values for a single bar.
///
/// Derived from the price history ending at that bar and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema5: f64,
    pub ema8: f64,
    pub ema13: f64,
    pub ema21: f64,
    pub ema50: f64,
    pub atr: f64,
    /// `close - atr * multiplier`
    pub atr_long_line: f64,
    /// `close + atr * multiplier`
    pub atr_short_line: f64,
}

/// ATR bands around the close: `(long_line, short_line)`.
pub fn atr_bands(close: f64, atr: f64, multiplier: f64) -> Result<(f64, f64), IndicatorError> {
    if close <= 0.0 || atr < 0.0 || multiplier <= 0.0 {
        return Err(IndicatorError::Calculation(format!(
            "invalid band inputs: close={close}, atr={atr}, multiplier={multiplier}"
        )));
    }
    Ok((close - atr * multiplier, close + atr * multiplier))
}

/// Compute the full snapshot for the series ending at the last element.
///
/// Sufficiency for every indicator is checked up front, so a failure never
/// leaves a partially computed snapshot behind.
pub fn compute_snapshot(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    atr_multiplier: f64,
) -> Result<IndicatorSnapshot, IndicatorError> {
    if highs.len() != lows.len() || lows.len() != closes.len() {
        return Err(IndicatorError::Calculation(format!(
            "misaligned OHLC series: {} highs, {} lows, {} closes",
            highs.len(),
            lows.len(),
            closes.len()
        )));
    }
    if closes.len() < SNAPSHOT_MIN_LEN {
        return Err(IndicatorError::InsufficientData {
            required: SNAPSHOT_MIN_LEN,
            available: closes.len(),
        });
    }

    let ema5 = ema(closes, EMA_PERIODS[0])?;
    let ema8 = ema(closes, EMA_PERIODS[1])?;
    let ema13 = ema(closes, EMA_PERIODS[2])?;
    let ema21 = ema(closes, EMA_PERIODS[3])?;
    let ema50 = ema(closes, EMA_PERIODS[4])?;
    let atr = atr(highs, lows, closes, ATR_PERIOD)?;

    let close = closes[closes.len() - 1];
    let (atr_long_line, atr_short_line) = atr_bands(close, atr, atr_multiplier)?;

    Ok(IndicatorSnapshot {
        ema5,
        ema8,
        ema13,
        ema21,
        ema50,
        atr,
        atr_long_line,
        atr_short_line,
    })
}
