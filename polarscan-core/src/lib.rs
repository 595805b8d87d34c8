//! Polarscan Core — signal evaluation and backtest simulation engine.
//!
//! This crate contains the algorithmic heart of the scanner:
//! - Domain types (bars, signals, positions, trades)
//! - Indicator engine (EMA stack, ATR, ATR bands) over raw price series
//! - Signal engine: six-condition rule set with all-or-nothing validity and
//!   per-condition diagnostics
//! - Backtest simulator: per-symbol Flat/InPosition state machine over
//!   historical bars
//!
//! The crate performs no I/O. Market data comes in as `PriceBar` sequences,
//! results leave as `Signal` and `Trade` value objects; everything around
//! that (HTTP, persistence, data acquisition, export) lives elsewhere.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod settings;
pub mod signals;
