//! Trade — a completed round trip, the simulator's only output record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::Direction;

/// A complete round-trip trade: entry → exit. Append-only; the backtest
/// simulator is the sole producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub direction: Direction,
    pub entry_timestamp: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_timestamp: DateTime<Utc>,
    pub exit_price: f64,
    /// Price-unit profit, net of commission.
    pub pnl: f64,
    /// Percent return relative to entry, gross of commission.
    pub pnl_percent: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> Trade {
        Trade {
            symbol: "NVDA".into(),
            direction: Direction::Long,
            entry_timestamp: Utc.with_ymd_and_hms(2024, 1, 5, 21, 1, 0).unwrap(),
            entry_price: 500.0,
            exit_timestamp: Utc.with_ymd_and_hms(2024, 1, 11, 21, 0, 0).unwrap(),
            exit_price: 525.0,
            pnl: 24.0,
            pnl_percent: 5.0,
        }
    }

    #[test]
    fn winner_means_positive_pnl() {
        assert!(sample_trade().is_winner());
        let mut losing = sample_trade();
        losing.pnl = -1.0;
        assert!(!losing.is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
