//! Performance metrics — pure functions over a completed trade ledger.
//!
//! Every metric is a pure function: trade list in, scalar out. No
//! dependencies on the runner or the simulator. All percent values are in
//! percent units, matching `Trade::pnl_percent`.

use serde::{Deserialize, Serialize};

use polarscan_core::domain::Trade;

/// Aggregate performance statistics for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_return: f64,
    pub average_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
}

impl PerformanceSummary {
    /// Compute every statistic from a trade list. Recomputed on demand,
    /// never maintained incrementally.
    pub fn compute(trades: &[Trade]) -> Self {
        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.is_winner()).count();
        Self {
            total_trades,
            winning_trades,
            losing_trades: total_trades - winning_trades,
            win_rate: win_rate(trades),
            total_return: total_return(trades),
            average_return: average_return(trades),
            max_drawdown: max_drawdown(trades),
            sharpe_ratio: sharpe_ratio(trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Fraction of trades with positive net PnL. 0.0 for an empty ledger.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Sum of percent returns across all trades.
pub fn total_return(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl_percent).sum()
}

/// Mean percent return per trade. 0.0 for an empty ledger.
pub fn average_return(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    total_return(trades) / trades.len() as f64
}

/// Maximum peak-to-trough decline of the cumulative percent return, taken
/// over trades in exit order. Non-negative; 0.0 when the cumulative return
/// never dips below its running peak.
pub fn max_drawdown(trades: &[Trade]) -> f64 {
    let mut by_exit: Vec<&Trade> = trades.iter().collect();
    by_exit.sort_by_key(|t| t.exit_timestamp);

    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for trade in by_exit {
        cumulative += trade.pnl_percent;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = peak - cumulative;
        if drawdown > max_dd {
            max_dd = drawdown;
        }
    }
    max_dd
}

/// Mean over sample standard deviation of percent returns. 0.0 with fewer
/// than two trades or zero variance. No risk-free rate, no annualization.
pub fn sharpe_ratio(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = trades.iter().map(|t| t.pnl_percent).collect();
    let mean = mean_f64(&returns);
    let std = sample_std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean / std
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use polarscan_core::domain::Direction;

    fn trade(day_offset: i64, pnl_percent: f64) -> Trade {
        let entry = Utc.with_ymd_and_hms(2024, 1, 2, 21, 1, 0).unwrap()
            + Duration::days(day_offset);
        Trade {
            symbol: "TEST".into(),
            direction: Direction::Long,
            entry_timestamp: entry,
            entry_price: 100.0,
            exit_timestamp: entry + Duration::days(1),
            exit_price: 100.0 * (1.0 + pnl_percent / 100.0),
            pnl: pnl_percent,
            pnl_percent,
        }
    }

    #[test]
    fn empty_ledger_yields_zeroed_summary() {
        let summary = PerformanceSummary::compute(&[]);
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.total_return, 0.0);
        assert_eq!(summary.average_return, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.sharpe_ratio, 0.0);
    }

    #[test]
    fn summary_counts_and_returns() {
        let trades = vec![trade(0, 5.0), trade(2, -10.0), trade(4, 5.0)];
        let summary = PerformanceSummary::compute(&trades);
        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.winning_trades, 2);
        assert_eq!(summary.losing_trades, 1);
        assert!((summary.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.total_return - 0.0).abs() < 1e-12);
        assert!((summary.average_return - 0.0).abs() < 1e-12);
    }

    #[test]
    fn drawdown_peak_after_first_trade_trough_after_second() {
        let trades = vec![trade(0, 5.0), trade(2, -10.0), trade(4, 5.0)];
        assert!((max_drawdown(&trades) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn drawdown_sorts_by_exit_date() {
        // Same ledger handed over out of order.
        let trades = vec![trade(4, 5.0), trade(0, 5.0), trade(2, -10.0)];
        assert!((max_drawdown(&trades) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn drawdown_is_zero_for_non_negative_cumulative_path() {
        let trades = vec![trade(0, 2.0), trade(1, 0.0), trade(2, 3.0)];
        assert_eq!(max_drawdown(&trades), 0.0);
    }

    #[test]
    fn drawdown_counts_losses_from_a_zero_peak() {
        let trades = vec![trade(0, -5.0), trade(1, -3.0)];
        assert!((max_drawdown(&trades) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn sharpe_known_value() {
        // Returns 1, 2, 3: mean 2, sample stdev 1.
        let trades = vec![trade(0, 1.0), trade(1, 2.0), trade(2, 3.0)];
        assert!((sharpe_ratio(&trades) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sharpe_guards_degenerate_ledgers() {
        assert_eq!(sharpe_ratio(&[trade(0, 5.0)]), 0.0);
        // Zero variance
        let flat = vec![trade(0, 2.0), trade(1, 2.0), trade(2, 2.0)];
        assert_eq!(sharpe_ratio(&flat), 0.0);
    }

    #[test]
    fn summary_serialization_roundtrip() {
        let trades = vec![trade(0, 5.0), trade(2, -10.0)];
        let summary = PerformanceSummary::compute(&trades);
        let json = serde_json::to_string(&summary).unwrap();
        let deser: PerformanceSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, deser);
    }
}
