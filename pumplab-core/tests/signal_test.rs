//! End-to-end signal → simulation scenarios on hand-built series.

use chrono::NaiveDate;
use pumplab_core::domain::{DailyRecord, Signal};
use pumplab_core::engine::{extract_trades, simulate};
use pumplab_core::signals::{build_generator, StrategyConfig};

fn series(prices: impl Fn(usize) -> f64, revenues: impl Fn(usize) -> f64, n: usize) -> Vec<DailyRecord> {
    let base = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    (0..n)
        .map(|i| DailyRecord::new(base + chrono::Duration::days(i as i64), prices(i), revenues(i)))
        .collect()
}

#[test]
fn rising_revenue_and_price_stays_long() {
    let records = series(|i| 1.0 + i as f64 * 0.05, |i| 10_000.0 + i as f64 * 250.0, 40);
    let generator = build_generator(&StrategyConfig::RevenueTrend {
        window_days: 7,
        sma_days: 14,
    })
    .unwrap();
    let signals = generator.generate(&records);

    let lookback = generator.min_lookback();
    assert_eq!(lookback, 14);
    assert!(signals[..lookback].iter().all(|s| *s == Signal::Flat));
    assert!(signals[lookback..].iter().all(|s| *s == Signal::Long));
    assert!(signals[28..].iter().all(|s| *s == Signal::Long));

    let history = simulate(&records, &signals, 100_000.0).unwrap();
    // entry executes the day after the first Long signal
    let entry = lookback + 1;
    assert!(history[..=entry].iter().all(|p| p.strategy_equity == 100_000.0));
    for w in history[entry..].windows(2) {
        assert!(
            w[1].strategy_equity > w[0].strategy_equity,
            "equity not increasing on {}",
            w[1].date
        );
    }

    // never exits: no closed trades
    assert!(extract_trades(&history).is_empty());
}

#[test]
fn flat_market_never_trades() {
    let records = series(|_| 0.004, |_| 1_500_000.0, 60);
    for config in [
        StrategyConfig::default(),
        StrategyConfig::RevenueTrend {
            window_days: 7,
            sma_days: 14,
        },
        StrategyConfig::EnsembleVote {
            trailing_stop_pct: 0.15,
        },
    ] {
        let signals = build_generator(&config).unwrap().generate(&records);
        assert!(
            signals.iter().all(|s| *s == Signal::Flat),
            "{} traded a flat market",
            config.name()
        );

        let history = simulate(&records, &signals, 100_000.0).unwrap();
        assert!(history.iter().all(|p| p.strategy_equity == 100_000.0));
        assert!(history.iter().all(|p| p.benchmark_equity == 100_000.0));
    }
}

#[test]
fn revenue_reversal_closes_a_trade() {
    // Revenue climbs for 30 days then collapses; price keeps drifting up.
    let records = series(
        |i| 2.0 + i as f64 * 0.01,
        |i| if i < 30 { 1_000.0 + i as f64 * 100.0 } else { 100.0 },
        50,
    );
    let generator = build_generator(&StrategyConfig::RevenueTrend {
        window_days: 5,
        sma_days: 3,
    })
    .unwrap();
    let signals = generator.generate(&records);
    assert_eq!(signals[10], Signal::Long);
    assert_eq!(signals[31], Signal::Flat);

    let history = simulate(&records, &signals, 10_000.0).unwrap();
    let trades = extract_trades(&history);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].entry_index, 10);
    assert!(trades[0].exit_index >= 30);
    assert!(trades[0].is_winner());
}
