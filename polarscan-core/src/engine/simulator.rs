//! Per-symbol bar loop: signal evaluation, position transitions, trades.

use chrono::Duration;

use crate::domain::{Direction, Position, PositionState, PriceBar, Signal, Trade};
use crate::indicators::{compute_snapshot, IndicatorError, IndicatorSnapshot, SNAPSHOT_MIN_LEN};
use crate::settings::AlgorithmSettings;
use crate::signals::{signals_for_bar, HtfContext, WARMUP_BARS};

use super::{ExitReason, SimulationConfig, MIN_ENTRY_CONFIDENCE};

/// Bar-by-bar simulator for a single symbol.
///
/// Owns nothing but its own position state, snapshot window, and trade
/// ledger, so independent instances can run concurrently across symbols.
pub struct SymbolSimulator<'a> {
    bars: &'a [PriceBar],
    htf_bars: &'a [PriceBar],
    settings: &'a AlgorithmSettings,
    config: &'a SimulationConfig,
    highs: Vec<f64>,
    lows: Vec<f64>,
    closes: Vec<f64>,
    /// Snapshot per processed bar, extended incrementally; the rising-EMA
    /// rule reads its last two entries.
    snapshots: Vec<IndicatorSnapshot>,
    /// Bars of the higher-timeframe series already at or before the bar
    /// being processed.
    htf_cursor: usize,
    state: PositionState,
    trades: Vec<Trade>,
}

impl<'a> SymbolSimulator<'a> {
    pub fn new(
        bars: &'a [PriceBar],
        htf_bars: Option<&'a [PriceBar]>,
        settings: &'a AlgorithmSettings,
        config: &'a SimulationConfig,
    ) -> Self {
        Self {
            bars,
            htf_bars: htf_bars.unwrap_or(&[]),
            settings,
            config,
            highs: bars.iter().map(|b| b.high).collect(),
            lows: bars.iter().map(|b| b.low).collect(),
            closes: bars.iter().map(|b| b.close).collect(),
            snapshots: Vec::new(),
            htf_cursor: 0,
            state: PositionState::Flat,
            trades: Vec::new(),
        }
    }

    /// Run the full simulation and return the closed trades in
    /// chronological order.
    pub fn run(mut self) -> Vec<Trade> {
        for index in WARMUP_BARS..self.bars.len() {
            if let Err(err) = self.step(index) {
                tracing::warn!(
                    symbol = %self.bars[index].symbol,
                    bar = index,
                    error = %err,
                    "bar skipped"
                );
            }
        }

        // Whatever is still open settles against the last bar.
        if let PositionState::Open(position) = std::mem::take(&mut self.state) {
            if let Some(last) = self.bars.last() {
                self.close_position(position, last.close, last.timestamp, ExitReason::EndOfData);
            }
        }
        self.trades
    }

    fn step(&mut self, index: usize) -> Result<(), IndicatorError> {
        let bars = self.bars;
        let bar = &bars[index];
        if !bar.is_sane() {
            return Err(IndicatorError::Calculation(format!(
                "malformed bar at index {index}"
            )));
        }
        let end = index + 1;

        let snapshot = compute_snapshot(
            &self.highs[..end],
            &self.lows[..end],
            &self.closes[..end],
            self.settings.atr_multiplier(),
        )?;
        self.snapshots.push(snapshot);

        while self.htf_cursor < self.htf_bars.len()
            && self.htf_bars[self.htf_cursor].timestamp <= bar.timestamp
        {
            self.htf_cursor += 1;
        }
        let htf_snapshot = self.htf_snapshot();
        let htf = htf_snapshot.as_ref().map(|indicators| HtfContext {
            bar: &self.htf_bars[self.htf_cursor - 1],
            indicators,
        });

        let batch = signals_for_bar(bar, &self.snapshots, htf, self.settings);

        match std::mem::take(&mut self.state) {
            PositionState::Open(position) => {
                match exit_reason(&position, bar, &batch.signals, self.config) {
                    Some(reason) => {
                        self.close_position(position, bar.close, bar.timestamp, reason);
                    }
                    None => self.state = PositionState::Open(position),
                }
            }
            PositionState::Flat => {
                if let Some(signal) = entry_signal(&batch.signals) {
                    self.open_position(signal);
                }
            }
        }
        Ok(())
    }

    /// Snapshot of the higher-timeframe series seen so far, or `None` when
    /// it is too short or fails to compute.
    fn htf_snapshot(&self) -> Option<IndicatorSnapshot> {
        if self.htf_cursor < SNAPSHOT_MIN_LEN {
            return None;
        }
        let highs: Vec<f64> = self.htf_bars[..self.htf_cursor]
            .iter()
            .map(|b| b.high)
            .collect();
        let lows: Vec<f64> = self.htf_bars[..self.htf_cursor]
            .iter()
            .map(|b| b.low)
            .collect();
        let closes: Vec<f64> = self.htf_bars[..self.htf_cursor]
            .iter()
            .map(|b| b.close)
            .collect();
        compute_snapshot(&highs, &lows, &closes, self.settings.atr_multiplier()).ok()
    }

    fn open_position(&mut self, signal: &Signal) {
        let position = Position {
            symbol: signal.symbol.clone(),
            direction: signal.direction,
            entry_timestamp: signal.timestamp + Duration::minutes(self.config.entry_delay_minutes),
            entry_price: signal.price,
        };
        tracing::debug!(
            symbol = %position.symbol,
            direction = position.direction.as_str(),
            price = position.entry_price,
            "position opened"
        );
        self.state = PositionState::Open(position);
    }

    fn close_position(
        &mut self,
        position: Position,
        exit_price: f64,
        exit_timestamp: chrono::DateTime<chrono::Utc>,
        reason: ExitReason,
    ) {
        let trade = settle(&position, exit_price, exit_timestamp, self.config.commission);
        tracing::debug!(
            symbol = %trade.symbol,
            direction = trade.direction.as_str(),
            reason = reason.as_str(),
            pnl = trade.pnl,
            "position closed"
        );
        self.trades.push(trade);
        self.state = PositionState::Flat;
    }
}

/// Convenience wrapper: simulate one symbol's series and return its trades.
pub fn simulate_symbol(
    bars: &[PriceBar],
    htf_bars: Option<&[PriceBar]>,
    settings: &AlgorithmSettings,
    config: &SimulationConfig,
) -> Vec<Trade> {
    SymbolSimulator::new(bars, htf_bars, settings, config).run()
}

/// Close conditions in priority order: opposite signal, stop loss, take
/// profit, timeout. All are evaluated against the bar close.
fn exit_reason(
    position: &Position,
    bar: &PriceBar,
    signals: &[Signal],
    config: &SimulationConfig,
) -> Option<ExitReason> {
    if signals
        .iter()
        .any(|s| s.direction == position.direction.opposite())
    {
        return Some(ExitReason::OppositeSignal);
    }

    let excursion = position.excursion_percent(bar.close);
    if let Some(stop) = config.stop_loss_percent {
        if excursion <= -stop {
            return Some(ExitReason::StopLoss);
        }
    }
    if let Some(take) = config.take_profit_percent {
        if excursion >= take {
            return Some(ExitReason::TakeProfit);
        }
    }
    if let Some(max_days) = config.max_hold_days {
        if (bar.timestamp - position.entry_timestamp).num_days() >= max_days {
            return Some(ExitReason::Timeout);
        }
    }
    None
}

/// First signal that clears the entry confidence gate.
fn entry_signal(signals: &[Signal]) -> Option<&Signal> {
    signals
        .iter()
        .find(|s| s.confidence >= MIN_ENTRY_CONFIDENCE)
}

/// Convert a position into a trade at the given exit.
fn settle(
    position: &Position,
    exit_price: f64,
    exit_timestamp: chrono::DateTime<chrono::Utc>,
    commission: f64,
) -> Trade {
    let pnl = match position.direction {
        Direction::Long => (exit_price - position.entry_price) - commission,
        Direction::Short => (position.entry_price - exit_price) - commission,
    };
    Trade {
        symbol: position.symbol.clone(),
        direction: position.direction,
        entry_timestamp: position.entry_timestamp,
        entry_price: position.entry_price,
        exit_timestamp,
        exit_price,
        pnl,
        pnl_percent: position.excursion_percent(exit_price),
    }
}
