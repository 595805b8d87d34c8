//! Algorithm settings — validated at construction, immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported bar granularities for the higher-timeframe confirmation series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "2m")]
    M2,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M2 => "2m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection of an out-of-range parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{name} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Raw, unvalidated parameter set. Mirrors the algorithm table of a run
/// config file; `AlgorithmSettings::new` is the only way to turn it into
/// something the engines accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmParams {
    pub atr_multiplier: f64,
    pub ema5_rising_threshold: f64,
    pub ema8_rising_threshold: f64,
    pub ema21_rising_threshold: f64,
    pub volatility_filter: f64,
    pub fomo_filter: f64,
    pub higher_timeframe: Timeframe,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            atr_multiplier: 2.0,
            ema5_rising_threshold: 0.02,
            ema8_rising_threshold: 0.01,
            ema21_rising_threshold: 0.005,
            volatility_filter: 1.5,
            fomo_filter: 1.0,
            higher_timeframe: Timeframe::M15,
        }
    }
}

/// Validated algorithm settings. One instance applies to a whole scan or a
/// whole backtest run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmSettings {
    atr_multiplier: f64,
    ema5_rising_threshold: f64,
    ema8_rising_threshold: f64,
    ema21_rising_threshold: f64,
    volatility_filter: f64,
    fomo_filter: f64,
    higher_timeframe: Timeframe,
}

impl AlgorithmSettings {
    /// Validate `params` and freeze them. Out-of-range values are rejected
    /// here, not at point of use.
    pub fn new(params: AlgorithmParams) -> Result<Self, SettingsError> {
        check_range("atr_multiplier", params.atr_multiplier, 0.5, 10.0)?;
        check_range(
            "ema5_rising_threshold",
            params.ema5_rising_threshold,
            0.001,
            0.1,
        )?;
        check_range(
            "ema8_rising_threshold",
            params.ema8_rising_threshold,
            0.001,
            0.1,
        )?;
        check_range(
            "ema21_rising_threshold",
            params.ema21_rising_threshold,
            0.001,
            0.1,
        )?;
        check_range("volatility_filter", params.volatility_filter, 0.1, 5.0)?;
        check_range("fomo_filter", params.fomo_filter, 0.1, 3.0)?;

        Ok(Self {
            atr_multiplier: params.atr_multiplier,
            ema5_rising_threshold: params.ema5_rising_threshold,
            ema8_rising_threshold: params.ema8_rising_threshold,
            ema21_rising_threshold: params.ema21_rising_threshold,
            volatility_filter: params.volatility_filter,
            fomo_filter: params.fomo_filter,
            higher_timeframe: params.higher_timeframe,
        })
    }

    pub fn atr_multiplier(&self) -> f64 {
        self.atr_multiplier
    }

    pub fn ema5_rising_threshold(&self) -> f64 {
        self.ema5_rising_threshold
    }

    pub fn ema8_rising_threshold(&self) -> f64 {
        self.ema8_rising_threshold
    }

    pub fn ema21_rising_threshold(&self) -> f64 {
        self.ema21_rising_threshold
    }

    pub fn volatility_filter(&self) -> f64 {
        self.volatility_filter
    }

    pub fn fomo_filter(&self) -> f64 {
        self.fomo_filter
    }

    pub fn higher_timeframe(&self) -> Timeframe {
        self.higher_timeframe
    }
}

impl Default for AlgorithmSettings {
    fn default() -> Self {
        Self {
            atr_multiplier: 2.0,
            ema5_rising_threshold: 0.02,
            ema8_rising_threshold: 0.01,
            ema21_rising_threshold: 0.005,
            volatility_filter: 1.5,
            fomo_filter: 1.0,
            higher_timeframe: Timeframe::M15,
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), SettingsError> {
    if !value.is_finite() || value < min || value > max {
        return Err(SettingsError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
