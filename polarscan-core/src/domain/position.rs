//! Open-position state for the simulator's per-symbol state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::Direction;

/// An open position. Created on entry, consumed when converted into a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub direction: Direction,
    pub entry_timestamp: DateTime<Utc>,
    pub entry_price: f64,
}

impl Position {
    /// Signed move from entry to `price` as a percentage of entry.
    /// Positive when the position is in profit, for either direction.
    pub fn excursion_percent(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => (price - self.entry_price) / self.entry_price * 100.0,
            Direction::Short => (self.entry_price - price) / self.entry_price * 100.0,
        }
    }
}

/// Per-symbol position state. The simulator holds exactly one of these per
/// symbol; there is no other position bookkeeping.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(Position),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn open(&self) -> Option<&Position> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(position) => Some(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn position(direction: Direction) -> Position {
        Position {
            symbol: "TSLA".into(),
            direction,
            entry_timestamp: Utc.with_ymd_and_hms(2024, 2, 1, 21, 1, 0).unwrap(),
            entry_price: 200.0,
        }
    }

    #[test]
    fn long_excursion_positive_when_price_rises() {
        let pos = position(Direction::Long);
        assert!((pos.excursion_percent(210.0) - 5.0).abs() < 1e-10);
        assert!((pos.excursion_percent(190.0) + 5.0).abs() < 1e-10);
    }

    #[test]
    fn short_excursion_positive_when_price_falls() {
        let pos = position(Direction::Short);
        assert!((pos.excursion_percent(190.0) - 5.0).abs() < 1e-10);
        assert!((pos.excursion_percent(210.0) + 5.0).abs() < 1e-10);
    }

    #[test]
    fn state_machine_accessors() {
        let state = PositionState::default();
        assert!(state.is_flat());
        assert!(state.open().is_none());

        let state = PositionState::Open(position(Direction::Long));
        assert!(!state.is_flat());
        assert_eq!(state.open().unwrap().entry_price, 200.0);
    }
}
