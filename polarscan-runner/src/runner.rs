//! Scan and backtest orchestration — one worker per symbol, merged results.
//!
//! Symbols are independent: each gets its own signal evaluation or simulator
//! instance on the rayon pool, with no shared mutable state. Merged outputs
//! are sorted afterwards, so results do not depend on worker scheduling.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use polarscan_core::domain::{PriceBar, Signal, Symbol, Trade};
use polarscan_core::engine::{simulate_symbol, SimulationConfig};
use polarscan_core::settings::AlgorithmSettings;
use polarscan_core::signals::{generate_signals, Evaluation};

use crate::config::{ConfigError, RunConfig};
use crate::metrics::PerformanceSummary;

/// Price history for one symbol: the base series plus the optional
/// higher-timeframe confirmation series. Handed over by the market-data
/// collaborator with bars already in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub htf_bars: Option<Vec<PriceBar>>,
}

/// Result of scanning a universe for live signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Merged signals, sorted by (symbol, timestamp).
    pub signals: Vec<Signal>,
    /// Per-direction diagnostics for every evaluated symbol.
    pub evaluations: Vec<Evaluation>,
    pub symbols_scanned: usize,
}

/// Result of a full backtest over a universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Merged trade ledger, sorted by exit timestamp.
    pub trades: Vec<Trade>,
    pub summary: PerformanceSummary,
    pub trades_per_symbol: BTreeMap<Symbol, usize>,
}

/// Evaluate the most recent bar of every series in parallel.
pub fn scan_universe(universe: &[SymbolSeries], settings: &AlgorithmSettings) -> ScanOutcome {
    let batches: Vec<_> = universe
        .par_iter()
        .map(|series| generate_signals(&series.bars, series.htf_bars.as_deref(), settings))
        .collect();

    let mut signals = Vec::new();
    let mut evaluations = Vec::new();
    for batch in batches {
        signals.extend(batch.signals);
        evaluations.extend(batch.evaluations);
    }
    signals.sort_by(|a, b| (&a.symbol, a.timestamp).cmp(&(&b.symbol, b.timestamp)));
    evaluations.sort_by(|a, b| (&a.symbol, a.timestamp).cmp(&(&b.symbol, b.timestamp)));

    tracing::debug!(
        symbols = universe.len(),
        signals = signals.len(),
        "scan complete"
    );
    ScanOutcome {
        signals,
        evaluations,
        symbols_scanned: universe.len(),
    }
}

/// Simulate every series in parallel and aggregate one merged ledger.
pub fn run_backtest(
    universe: &[SymbolSeries],
    settings: &AlgorithmSettings,
    simulation: &SimulationConfig,
) -> BacktestReport {
    let per_symbol: Vec<(Symbol, Vec<Trade>)> = universe
        .par_iter()
        .map(|series| {
            let trades = simulate_symbol(
                &series.bars,
                series.htf_bars.as_deref(),
                settings,
                simulation,
            );
            (series.symbol.clone(), trades)
        })
        .collect();

    let mut trades = Vec::new();
    let mut trades_per_symbol = BTreeMap::new();
    for (symbol, symbol_trades) in per_symbol {
        trades_per_symbol.insert(symbol, symbol_trades.len());
        trades.extend(symbol_trades);
    }
    trades.sort_by_key(|t| t.exit_timestamp);

    let summary = PerformanceSummary::compute(&trades);
    tracing::debug!(
        symbols = universe.len(),
        trades = trades.len(),
        win_rate = summary.win_rate,
        "backtest complete"
    );
    BacktestReport {
        trades,
        summary,
        trades_per_symbol,
    }
}

/// Validate a run config and backtest the supplied series.
///
/// Series for symbols outside the configured universe are ignored; symbols
/// in the universe with no series simply contribute no trades.
pub fn run_backtest_from_config(
    config: &RunConfig,
    series: &[SymbolSeries],
) -> Result<BacktestReport, ConfigError> {
    let (settings, simulation) = config.to_components()?;
    let selected: Vec<SymbolSeries> = series
        .iter()
        .filter(|s| config.universe.iter().any(|symbol| symbol == &s.symbol))
        .cloned()
        .collect();
    Ok(run_backtest(&selected, &settings, &simulation))
}
