//! Signal engine — evaluates the rule set over one bar plus indicator history.
//!
//! Long and short are evaluated independently; both may fire on the same
//! bar. Validity is all-or-nothing: a signal is emitted only when every
//! condition holds, and the reported confidence is `met / total`. Indicator
//! failures degrade to "no signal", never to an error.

pub mod conditions;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Direction, PriceBar, Signal};
use crate::indicators::{compute_snapshot, IndicatorSnapshot, SNAPSHOT_MIN_LEN};
use crate::settings::AlgorithmSettings;

pub use conditions::{Condition, Rejection};

/// Historical bars required before the engine will evaluate a bar. The bar
/// under evaluation is the extra point that completes `SNAPSHOT_MIN_LEN`.
pub const WARMUP_BARS: usize = SNAPSHOT_MIN_LEN - 1;

/// Higher-timeframe context for the confirmation condition.
#[derive(Debug, Clone, Copy)]
pub struct HtfContext<'a> {
    pub bar: &'a PriceBar,
    pub indicators: &'a IndicatorSnapshot,
}

/// Outcome of evaluating the full rule set for one direction on one bar.
///
/// Returned alongside the signals so diagnostics consumers see which
/// conditions held without the engine keeping any mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub satisfied: Vec<Condition>,
    pub rejections: Vec<Rejection>,
}

impl Evaluation {
    fn empty(symbol: String, timestamp: DateTime<Utc>, direction: Direction) -> Self {
        Self {
            symbol,
            timestamp,
            direction,
            satisfied: Vec::new(),
            rejections: Vec::new(),
        }
    }

    pub fn conditions_met(&self) -> usize {
        self.satisfied.len()
    }

    pub fn total_conditions(&self) -> usize {
        self.satisfied.len() + self.rejections.len()
    }

    /// Fraction of conditions met, 0.0 when nothing was evaluated.
    pub fn confidence(&self) -> f64 {
        let total = self.total_conditions();
        if total == 0 {
            return 0.0;
        }
        self.conditions_met() as f64 / total as f64
    }

    /// All-or-nothing validity: every condition must hold.
    pub fn is_valid(&self) -> bool {
        !self.satisfied.is_empty() && self.rejections.is_empty()
    }
}

/// Signals plus per-direction diagnostics for one bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalBatch {
    pub signals: Vec<Signal>,
    pub evaluations: Vec<Evaluation>,
}

/// Evaluate the full rule set for one direction.
///
/// `history` is the snapshot window ending at the bar under evaluation; its
/// last element is that bar's own snapshot. An empty window rejects every
/// condition rather than erroring.
pub fn evaluate_direction(
    direction: Direction,
    bar: &PriceBar,
    history: &[IndicatorSnapshot],
    htf: Option<HtfContext<'_>>,
    settings: &AlgorithmSettings,
) -> Evaluation {
    let mut evaluation = Evaluation::empty(bar.symbol.clone(), bar.timestamp, direction);

    let Some(snapshot) = history.last() else {
        let mut conditions: Vec<Condition> = Condition::BASE.to_vec();
        if htf.is_some() {
            conditions.push(Condition::HtfConfirmation);
        }
        for condition in conditions {
            evaluation.rejections.push(Rejection {
                condition,
                reason: "no indicator snapshot available".into(),
            });
        }
        return evaluation;
    };

    let mut record = |condition: Condition, outcome: Result<(), String>| match outcome {
        Ok(()) => evaluation.satisfied.push(condition),
        Err(reason) => {
            tracing::debug!(
                symbol = %bar.symbol,
                direction = direction.as_str(),
                condition = condition.name(),
                %reason,
                "condition rejected"
            );
            evaluation.rejections.push(Rejection { condition, reason });
        }
    };

    record(
        Condition::PolarFormation,
        conditions::polar_formation(direction, bar, snapshot),
    );
    record(
        Condition::EmaPositioning,
        conditions::ema_positioning(direction, snapshot),
    );
    record(
        Condition::RisingEmas,
        conditions::rising_emas(direction, history, settings),
    );
    record(
        Condition::FomoFilter,
        conditions::fomo_filter(bar, snapshot, settings),
    );
    record(
        Condition::VolatilityFilter,
        conditions::volatility_filter(snapshot, settings),
    );
    if let Some(htf) = htf {
        record(
            Condition::HtfConfirmation,
            conditions::htf_confirmation(direction, htf.bar, htf.indicators),
        );
    }

    evaluation
}

/// Evaluate both directions for one bar and wrap valid evaluations as
/// signals. At most one signal per direction.
pub fn signals_for_bar(
    bar: &PriceBar,
    history: &[IndicatorSnapshot],
    htf: Option<HtfContext<'_>>,
    settings: &AlgorithmSettings,
) -> SignalBatch {
    let mut batch = SignalBatch::default();
    let Some(snapshot) = history.last() else {
        return batch;
    };

    for direction in [Direction::Long, Direction::Short] {
        let evaluation = evaluate_direction(direction, bar, history, htf, settings);
        if evaluation.is_valid() {
            batch.signals.push(Signal {
                symbol: bar.symbol.clone(),
                direction,
                timestamp: bar.timestamp,
                price: bar.close,
                indicators: snapshot.clone(),
                confidence: evaluation.confidence(),
            });
        }
        batch.evaluations.push(evaluation);
    }
    batch
}

/// Evaluate the most recent bar of `bars` against the full rule set.
///
/// Builds the snapshot window by recomputing indicators over growing
/// prefixes, computes the higher-timeframe context from `htf_bars` when one
/// is supplied and long enough, and returns 0–2 signals. Series shorter than
/// the warm-up, and indicator failures of any kind, produce an empty batch.
pub fn generate_signals(
    bars: &[PriceBar],
    htf_bars: Option<&[PriceBar]>,
    settings: &AlgorithmSettings,
) -> SignalBatch {
    if bars.len() < SNAPSHOT_MIN_LEN {
        return SignalBatch::default();
    }

    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let mut history: Vec<IndicatorSnapshot> = Vec::with_capacity(bars.len() - WARMUP_BARS);
    for end in SNAPSHOT_MIN_LEN..=bars.len() {
        match compute_snapshot(
            &highs[..end],
            &lows[..end],
            &closes[..end],
            settings.atr_multiplier(),
        ) {
            Ok(snapshot) => history.push(snapshot),
            Err(err) if end == bars.len() => {
                // No snapshot for the bar under evaluation means no signal.
                tracing::debug!(symbol = %bars[0].symbol, error = %err, "snapshot unavailable");
                return SignalBatch::default();
            }
            Err(err) => {
                tracing::debug!(
                    symbol = %bars[0].symbol,
                    prefix = end,
                    error = %err,
                    "historical snapshot skipped"
                );
            }
        }
    }

    let bar = &bars[bars.len() - 1];
    let htf_snapshot = htf_bars.and_then(|series| htf_context_snapshot(series, settings));
    let htf = match (&htf_snapshot, htf_bars) {
        (Some(snapshot), Some(series)) => Some(HtfContext {
            bar: &series[series.len() - 1],
            indicators: snapshot,
        }),
        _ => None,
    };

    signals_for_bar(bar, &history, htf, settings)
}

/// Snapshot of the higher-timeframe series, or `None` when the series is
/// too short or fails to compute. Missing HTF data narrows the rule set to
/// five conditions instead of failing the evaluation.
fn htf_context_snapshot(
    htf_bars: &[PriceBar],
    settings: &AlgorithmSettings,
) -> Option<IndicatorSnapshot> {
    if htf_bars.len() < SNAPSHOT_MIN_LEN {
        return None;
    }
    let highs: Vec<f64> = htf_bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = htf_bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = htf_bars.iter().map(|b| b.close).collect();
    match compute_snapshot(&highs, &lows, &closes, settings.atr_multiplier()) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            tracing::debug!(
                timeframe = %settings.higher_timeframe(),
                error = %err,
                "higher timeframe snapshot unavailable"
            );
            None
        }
    }
}
