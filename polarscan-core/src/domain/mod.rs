//! Domain types shared by the signal engine and the backtest simulator.

pub mod bar;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::PriceBar;
pub use position::{Position, PositionState};
pub use signal::{Direction, Signal};
pub use trade::Trade;

/// Symbol type alias
pub type Symbol = String;
