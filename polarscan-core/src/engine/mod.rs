//! Backtest simulator — replays the rule set over historical bars.
//!
//! One simulator instance per symbol, each a closed two-state machine
//! (`Flat ⇄ InPosition`). Bars are processed strictly in chronological
//! order; a failure on one bar is logged and skipped, never propagated.

pub mod simulator;

use serde::{Deserialize, Serialize};

pub use simulator::{simulate_symbol, SymbolSimulator};

/// Minimum signal confidence for opening a position.
///
/// The signal engine only emits signals when every condition holds, so valid
/// signals always carry confidence 1.0; the gate is enforced independently
/// anyway.
pub const MIN_ENTRY_CONFIDENCE: f64 = 0.5;

/// Simulation parameters for a backtest run.
///
/// Percent thresholds are in percent units (`5.0` = 5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Minutes between a signal bar's close and the recorded entry time.
    /// Applied to the entry timestamp only, never to the entry price.
    pub entry_delay_minutes: i64,
    /// Flat commission per round trip, in price units.
    pub commission: f64,
    /// Close when the adverse move from entry reaches this percent.
    pub stop_loss_percent: Option<f64>,
    /// Close when the favorable move from entry reaches this percent.
    pub take_profit_percent: Option<f64>,
    /// Close once the position has been held this many calendar days.
    pub max_hold_days: Option<i64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            entry_delay_minutes: 1,
            commission: 0.0,
            stop_loss_percent: None,
            take_profit_percent: None,
            max_hold_days: None,
        }
    }
}

/// Why a position was closed. Logged for diagnostics; not part of the trade
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    OppositeSignal,
    StopLoss,
    TakeProfit,
    Timeout,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::OppositeSignal => "opposite_signal",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::Timeout => "timeout",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}
