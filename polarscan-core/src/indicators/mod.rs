//! Indicator engine — EMA, ATR, and ATR-band computations.
//!
//! Pure functions over numeric slices, most-recent value last. Every entry
//! point either returns a finite value or an `IndicatorError`; there is no
//! NaN padding, since a snapshot is produced whole or not at all.

pub mod atr;
pub mod ema;
pub mod snapshot;

pub use atr::{atr, true_range, ATR_PERIOD};
pub use ema::ema;
pub use snapshot::{atr_bands, compute_snapshot, IndicatorSnapshot, EMA_PERIODS, SNAPSHOT_MIN_LEN};

use thiserror::Error;

/// Errors from indicator computation.
///
/// Both variants are recoverable: `InsufficientData` means wait for more
/// bars, `Calculation` means skip this bar or symbol.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("calculation error: {0}")]
    Calculation(String),
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;
