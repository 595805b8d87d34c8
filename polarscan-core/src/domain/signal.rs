//! Directional signals — immutable once emitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSnapshot;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

/// A directional signal emitted by the signal engine for one bar.
///
/// Carries the indicator snapshot it was evaluated against so downstream
/// consumers never have to recompute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    pub timestamp: DateTime<Utc>,
    /// Close price of the bar the signal fired on.
    pub price: f64,
    pub indicators: IndicatorSnapshot,
    /// Fraction of rule conditions met, in [0, 1].
    pub confidence: f64,
}
