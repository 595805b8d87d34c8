//! Polarscan Runner — orchestration, performance metrics, run configuration.
//!
//! Wires the core engine into whole-universe operations:
//! - `scan_universe`: live signal scan across symbols (rayon worker pool)
//! - `run_backtest`: independent per-symbol simulations merged into one
//!   trade ledger with a `PerformanceSummary`
//! - `RunConfig`: TOML-loadable, content-addressed run configuration

pub mod config;
pub mod metrics;
pub mod runner;

pub use config::{load_run_config, ConfigError, RunConfig};
pub use metrics::PerformanceSummary;
pub use runner::{
    run_backtest, run_backtest_from_config, scan_universe, BacktestReport, ScanOutcome,
    SymbolSeries,
};
