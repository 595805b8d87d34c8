//! The rule set — a closed enum of conditions, each checked independently.
//!
//! Every check returns `Ok(())` when the condition holds and `Err(reason)`
//! when it does not. A value that cannot be computed (zero denominator,
//! non-finite percent change) also maps to `Err`, so one bad indicator never
//! aborts evaluation of the remaining conditions.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, PriceBar};
use crate::indicators::IndicatorSnapshot;
use crate::settings::AlgorithmSettings;

/// Identifier for each rule in the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    PolarFormation,
    EmaPositioning,
    RisingEmas,
    FomoFilter,
    VolatilityFilter,
    HtfConfirmation,
}

impl Condition {
    /// The five conditions evaluated on every bar; HTF confirmation joins
    /// only when a higher-timeframe context is supplied.
    pub const BASE: [Condition; 5] = [
        Condition::PolarFormation,
        Condition::EmaPositioning,
        Condition::RisingEmas,
        Condition::FomoFilter,
        Condition::VolatilityFilter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Condition::PolarFormation => "polar_formation",
            Condition::EmaPositioning => "ema_positioning",
            Condition::RisingEmas => "rising_emas",
            Condition::FomoFilter => "fomo_filter",
            Condition::VolatilityFilter => "volatility_filter",
            Condition::HtfConfirmation => "htf_confirmation",
        }
    }
}

/// A condition that did not hold, with the measured values that rejected it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub condition: Condition,
    pub reason: String,
}

/// Candle shape versus the EMA stack: a bullish close above both anchors for
/// long, the mirror for short.
pub(super) fn polar_formation(
    direction: Direction,
    bar: &PriceBar,
    snapshot: &IndicatorSnapshot,
) -> Result<(), String> {
    match direction {
        Direction::Long => {
            if bar.is_bullish() && bar.close > snapshot.ema8 && bar.close > snapshot.ema21 {
                Ok(())
            } else {
                Err(format!(
                    "no bullish polar formation: open={}, close={}, ema8={:.4}, ema21={:.4}",
                    bar.open, bar.close, snapshot.ema8, snapshot.ema21
                ))
            }
        }
        Direction::Short => {
            if bar.is_bearish() && bar.close < snapshot.ema8 && bar.close < snapshot.ema21 {
                Ok(())
            } else {
                Err(format!(
                    "no bearish polar formation: open={}, close={}, ema8={:.4}, ema21={:.4}",
                    bar.open, bar.close, snapshot.ema8, snapshot.ema21
                ))
            }
        }
    }
}

/// The fast EMA must sit beyond the ATR band on the entry side.
pub(super) fn ema_positioning(
    direction: Direction,
    snapshot: &IndicatorSnapshot,
) -> Result<(), String> {
    match direction {
        Direction::Long => {
            if snapshot.ema5 < snapshot.atr_long_line {
                Ok(())
            } else {
                Err(format!(
                    "ema5 {:.4} not below long line {:.4}",
                    snapshot.ema5, snapshot.atr_long_line
                ))
            }
        }
        Direction::Short => {
            if snapshot.ema5 > snapshot.atr_short_line {
                Ok(())
            } else {
                Err(format!(
                    "ema5 {:.4} not above short line {:.4}",
                    snapshot.ema5, snapshot.atr_short_line
                ))
            }
        }
    }
}

/// One-bar percent change of ema5/ema8/ema21, each beyond its configured
/// threshold (above for long, below the negated threshold for short).
/// Fails closed with fewer than two snapshots in the window.
pub(super) fn rising_emas(
    direction: Direction,
    history: &[IndicatorSnapshot],
    settings: &AlgorithmSettings,
) -> Result<(), String> {
    if history.len() < 2 {
        return Err(format!(
            "need 2 snapshots to measure EMA slope, have {}",
            history.len()
        ));
    }
    let previous = &history[history.len() - 2];
    let current = &history[history.len() - 1];

    let checks = [
        (
            "ema5",
            current.ema5,
            previous.ema5,
            settings.ema5_rising_threshold(),
        ),
        (
            "ema8",
            current.ema8,
            previous.ema8,
            settings.ema8_rising_threshold(),
        ),
        (
            "ema21",
            current.ema21,
            previous.ema21,
            settings.ema21_rising_threshold(),
        ),
    ];

    for (name, now, before, threshold) in checks {
        let change = (now - before) / before;
        if !change.is_finite() {
            tracing::warn!(
                ema = name,
                previous = before,
                "EMA percent change is undefined, condition treated as failed"
            );
            return Err(format!("{name} percent change is undefined (previous={before})"));
        }
        let holds = match direction {
            Direction::Long => change > threshold,
            Direction::Short => change < -threshold,
        };
        if !holds {
            return Err(format!(
                "{name} change {:.5} does not clear threshold {:.5} ({})",
                change,
                threshold,
                direction.as_str()
            ));
        }
    }
    Ok(())
}

/// Price must stay within `atr * fomo_filter` of both EMA anchors.
pub(super) fn fomo_filter(
    bar: &PriceBar,
    snapshot: &IndicatorSnapshot,
    settings: &AlgorithmSettings,
) -> Result<(), String> {
    let budget = snapshot.atr * settings.fomo_filter();
    let ema8_distance = (bar.close - snapshot.ema8).abs();
    let ema21_distance = (bar.close - snapshot.ema21).abs();
    if ema8_distance <= budget && ema21_distance <= budget {
        Ok(())
    } else {
        Err(format!(
            "price too far from anchors: |close-ema8|={ema8_distance:.4}, \
             |close-ema21|={ema21_distance:.4}, budget={budget:.4}"
        ))
    }
}

/// ATR must clear the inverse volatility floor.
pub(super) fn volatility_filter(
    snapshot: &IndicatorSnapshot,
    settings: &AlgorithmSettings,
) -> Result<(), String> {
    let floor = 1.0 / settings.volatility_filter();
    if snapshot.atr >= floor {
        Ok(())
    } else {
        Err(format!(
            "atr {:.4} below volatility floor {floor:.4}",
            snapshot.atr
        ))
    }
}

/// The coarser series must agree with the direction: fast EMA on the right
/// side of the slow one, and the candle pointing the same way.
pub(super) fn htf_confirmation(
    direction: Direction,
    htf_bar: &PriceBar,
    htf_snapshot: &IndicatorSnapshot,
) -> Result<(), String> {
    let confirmed = match direction {
        Direction::Long => htf_snapshot.ema5 > htf_snapshot.ema8 && htf_bar.is_bullish(),
        Direction::Short => htf_snapshot.ema5 < htf_snapshot.ema8 && htf_bar.is_bearish(),
    };
    if confirmed {
        Ok(())
    } else {
        Err(format!(
            "higher timeframe disagrees: ema5={:.4}, ema8={:.4}, open={}, close={}",
            htf_snapshot.ema5, htf_snapshot.ema8, htf_bar.open, htf_bar.close
        ))
    }
}
