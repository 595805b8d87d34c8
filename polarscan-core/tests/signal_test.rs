//! Integration tests for the signal engine.
//!
//! Covers: warm-up behavior, the flat-series and rising-series scenarios,
//! all-or-nothing validity, the short mirror, and determinism.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use polarscan_core::domain::{Direction, PriceBar};
use polarscan_core::indicators::IndicatorSnapshot;
use polarscan_core::settings::AlgorithmSettings;
use polarscan_core::signals::{
    evaluate_direction, generate_signals, signals_for_bar, Condition, HtfContext,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap()
}

fn flat_bars(n: usize) -> Vec<PriceBar> {
    (0..n)
        .map(|i| PriceBar {
            symbol: "FLAT".into(),
            timestamp: start() + Duration::minutes(15 * i as i64),
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            volume: 10_000,
        })
        .collect()
}

fn random_walk_bars(symbol: &str, n: usize, seed: u64) -> Vec<PriceBar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close = 100.0_f64;
    (0..n)
        .map(|i| {
            let open = close;
            close = (close + rng.gen_range(-2.0..2.0)).max(5.0);
            PriceBar {
                symbol: symbol.into(),
                timestamp: start() + Duration::minutes(15 * i as i64),
                open,
                high: open.max(close) + rng.gen_range(0.0..1.0),
                low: open.min(close) - rng.gen_range(0.0..1.0),
                close,
                volume: 10_000 + i as u64,
            }
        })
        .collect()
}

/// Snapshot used by the constructed-evaluation tests. All six conditions
/// hold for a long on `rising_bar()` with default settings.
fn entry_snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot {
        ema5: 104.0,
        ema8: 109.0,
        ema13: 106.0,
        ema21: 108.5,
        ema50: 100.0,
        atr: 2.0,
        atr_long_line: 106.0,
        atr_short_line: 114.0,
    }
}

fn previous_snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot {
        ema5: 100.0,
        ema8: 107.5,
        ema13: 105.5,
        ema21: 107.9,
        ema50: 99.8,
        atr: 2.0,
        atr_long_line: 102.0,
        atr_short_line: 110.0,
    }
}

fn rising_bar() -> PriceBar {
    PriceBar {
        symbol: "RISE".into(),
        timestamp: start() + Duration::days(60),
        open: 105.0,
        high: 110.5,
        low: 104.5,
        close: 110.0,
        volume: 25_000,
    }
}

fn htf_snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot {
        ema5: 108.0,
        ema8: 106.0,
        ema13: 105.0,
        ema21: 104.0,
        ema50: 101.0,
        atr: 3.0,
        atr_long_line: 103.0,
        atr_short_line: 115.0,
    }
}

fn htf_bar() -> PriceBar {
    PriceBar {
        symbol: "RISE".into(),
        timestamp: start() + Duration::days(60),
        open: 107.0,
        high: 109.5,
        low: 106.5,
        close: 109.0,
        volume: 250_000,
    }
}

#[test]
fn short_series_never_produces_signals() {
    let settings = AlgorithmSettings::default();
    for n in [0, 1, 30, 49, 50] {
        let batch = generate_signals(&random_walk_bars("SHORT", n, 7), None, &settings);
        assert!(batch.signals.is_empty(), "signals on {n} bars");
        assert!(batch.evaluations.is_empty());
    }
}

#[test]
fn flat_series_produces_no_signals() {
    let settings = AlgorithmSettings::default();
    let batch = generate_signals(&flat_bars(60), None, &settings);
    assert!(batch.signals.is_empty());
    // Both directions were still evaluated and rejected.
    assert_eq!(batch.evaluations.len(), 2);
    for evaluation in &batch.evaluations {
        assert!(!evaluation.is_valid());
        assert!(evaluation
            .rejections
            .iter()
            .any(|r| r.condition == Condition::PolarFormation));
    }
}

#[test]
fn long_signal_fires_on_rising_series_with_htf_confirmation() {
    let settings = AlgorithmSettings::default();
    let history = vec![previous_snapshot(), entry_snapshot()];
    let htf_snap = htf_snapshot();
    let htf_bar = htf_bar();
    let htf = HtfContext {
        bar: &htf_bar,
        indicators: &htf_snap,
    };

    let evaluation =
        evaluate_direction(Direction::Long, &rising_bar(), &history, Some(htf), &settings);
    assert!(evaluation.is_valid(), "rejections: {:?}", evaluation.rejections);
    assert_eq!(evaluation.total_conditions(), 6);
    assert!((evaluation.confidence() - 1.0).abs() < 1e-12);

    let batch = signals_for_bar(&rising_bar(), &history, Some(htf), &settings);
    assert_eq!(batch.signals.len(), 1);
    let signal = &batch.signals[0];
    assert_eq!(signal.direction, Direction::Long);
    assert!((signal.confidence - 1.0).abs() < 1e-12);
    assert!((signal.price - 110.0).abs() < 1e-12);
}

#[test]
fn validity_is_all_or_nothing() {
    let settings = AlgorithmSettings::default();
    // Flatten the ema21 slope below its threshold; every other condition
    // still holds.
    let mut previous = previous_snapshot();
    previous.ema21 = 108.2;
    let history = vec![previous, entry_snapshot()];
    let htf_snap = htf_snapshot();
    let htf_bar = htf_bar();
    let htf = HtfContext {
        bar: &htf_bar,
        indicators: &htf_snap,
    };

    let evaluation =
        evaluate_direction(Direction::Long, &rising_bar(), &history, Some(htf), &settings);
    assert!(!evaluation.is_valid());
    assert_eq!(evaluation.conditions_met(), 5);
    assert_eq!(evaluation.total_conditions(), 6);
    assert!((evaluation.confidence() - 5.0 / 6.0).abs() < 1e-12);

    // No tradable signal despite the high confidence.
    let batch = signals_for_bar(&rising_bar(), &history, Some(htf), &settings);
    assert!(batch.signals.is_empty());
}

#[test]
fn without_htf_data_only_five_conditions_are_evaluated() {
    let settings = AlgorithmSettings::default();
    let history = vec![previous_snapshot(), entry_snapshot()];
    let evaluation = evaluate_direction(Direction::Long, &rising_bar(), &history, None, &settings);
    assert_eq!(evaluation.total_conditions(), 5);
    assert!(evaluation.is_valid());
}

#[test]
fn short_direction_is_the_structural_mirror() {
    let settings = AlgorithmSettings::default();
    // Mirror of the long entry around 100: falling EMAs, bearish candle
    // below both anchors, ema5 above the short band.
    let previous = IndicatorSnapshot {
        ema5: 100.0,
        ema8: 92.5,
        ema13: 94.5,
        ema21: 92.1,
        ema50: 100.2,
        atr: 2.0,
        atr_long_line: 98.0,
        atr_short_line: 90.0,
    };
    let current = IndicatorSnapshot {
        ema5: 96.0,
        ema8: 91.0,
        ema13: 94.0,
        ema21: 91.5,
        ema50: 100.0,
        atr: 2.0,
        atr_long_line: 86.0,
        atr_short_line: 94.0,
    };
    let bar = PriceBar {
        symbol: "FALL".into(),
        timestamp: start() + Duration::days(60),
        open: 95.0,
        high: 95.5,
        low: 89.5,
        close: 90.0,
        volume: 25_000,
    };
    let htf_snap = IndicatorSnapshot {
        ema5: 92.0,
        ema8: 94.0,
        ema13: 95.0,
        ema21: 96.0,
        ema50: 99.0,
        atr: 3.0,
        atr_long_line: 85.0,
        atr_short_line: 97.0,
    };
    let htf_bar = PriceBar {
        symbol: "FALL".into(),
        timestamp: start() + Duration::days(60),
        open: 93.0,
        high: 93.5,
        low: 90.5,
        close: 91.0,
        volume: 250_000,
    };

    let history = vec![previous, current];
    let htf = HtfContext {
        bar: &htf_bar,
        indicators: &htf_snap,
    };
    let evaluation = evaluate_direction(Direction::Short, &bar, &history, Some(htf), &settings);
    assert!(evaluation.is_valid(), "rejections: {:?}", evaluation.rejections);

    // The same inputs reject a long across the board.
    let long = evaluate_direction(Direction::Long, &bar, &history, Some(htf), &settings);
    assert!(!long.is_valid());
}

#[test]
fn signal_generation_is_deterministic() {
    let settings = AlgorithmSettings::default();
    let bars = random_walk_bars("DET", 200, 42);
    let htf = random_walk_bars("DET", 80, 43);
    let first = generate_signals(&bars, Some(&htf), &settings);
    let second = generate_signals(&bars, Some(&htf), &settings);
    assert_eq!(first, second);
}
