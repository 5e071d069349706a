// End-to-end fetch-compute-render cycles through the file and memory providers
use chrono::{TimeDelta, TimeZone, Utc};
use engine::config::DashboardSettings;
use engine::data::{CsvProvider, DataProvider, MemoryProvider};
use engine::pipeline::{Dashboard, Severity, NO_DATA_MESSAGE};
use engine::presentation::{HtmlPresenter, Presenter, TerminalPresenter};
use shared::models::{DashboardRequest, Interval, Period, PriceBar};
use std::fmt::Write as _;
use tempfile::TempDir;

fn settings() -> DashboardSettings {
    DashboardSettings::load_default().expect("embedded settings")
}

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: start + TimeDelta::hours(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1_000 + i as u64,
        })
        .collect()
}

fn dashboard_with(ticker: &str, interval: Interval, closes: &[f64]) -> Dashboard {
    let mut provider = MemoryProvider::new();
    provider.add_bars(ticker, interval, bars(closes));
    Dashboard::new(Box::new(provider), &settings()).unwrap()
}

#[test]
fn constant_prices_give_flat_indicators() {
    let dashboard = dashboard_with("FLAT", Interval::Hour1, &[10.0; 30]);
    let view = dashboard
        .render(&DashboardRequest::new("FLAT", Interval::Hour1, Period::Month1))
        .unwrap();

    assert_eq!(view.status.severity, Severity::Success);
    assert_eq!(view.status.rows, 30);
    for (i, row) in view.table.iter().enumerate() {
        assert_eq!(row.ema_fast, 10.0);
        assert_eq!(row.ema_slow, 10.0);
        assert_eq!(row.macd, 0.0);
        assert_eq!(row.signal, 0.0);
        assert_eq!(row.rsi.is_none(), i < 13);
    }
}

#[test]
fn rising_prices_hit_zero_loss_rsi() {
    let closes: Vec<f64> = (1..=30).map(|i| i as f64).collect();
    let dashboard = dashboard_with("UP", Interval::Hour1, &closes);
    let view = dashboard
        .render(&DashboardRequest::new("up", Interval::Hour1, Period::Month1))
        .unwrap();

    let panels = view.panels.as_ref().expect("panels for non-empty data");
    let rsi = &panels.rsi.lines[0].values;
    assert!(rsi[..13].iter().all(Option::is_none));
    assert!(rsi[13..].iter().all(|v| *v == Some(0.0)));

    let macd = &panels.macd.lines[0].values;
    assert!(macd[1..].iter().all(|v| v.unwrap() > 0.0));
}

#[test]
fn unknown_ticker_reports_no_data() {
    let dashboard = dashboard_with("AAPL", Interval::Minute15, &[1.0, 2.0]);
    let view = dashboard
        .render(&DashboardRequest::new("NOPE", Interval::Minute15, Period::Day5))
        .unwrap();

    assert_eq!(view.status.severity, Severity::Warning);
    assert_eq!(view.status.message, NO_DATA_MESSAGE);
    assert!(view.panels.is_none());
    assert!(view.table.is_empty());
}

#[test]
fn short_history_leaves_rsi_undefined() {
    let closes: Vec<f64> = (0..13).map(|i| 100.0 - i as f64 * 0.25).collect();
    let dashboard = dashboard_with("SHORT", Interval::Hour1, &closes);
    let view = dashboard
        .render(&DashboardRequest::new("SHORT", Interval::Hour1, Period::Month1))
        .unwrap();

    assert_eq!(view.table.len(), 13);
    assert!(view.table.iter().all(|row| row.rsi.is_none()));
    assert_eq!(view.table[0].ema_fast, 100.0);
}

#[test]
fn renders_are_independent() {
    let closes: Vec<f64> = (0..80).map(|i| 50.0 + (i as f64 * 0.2).sin() * 3.0).collect();
    let dashboard = dashboard_with("SPY", Interval::Hour1, &closes);
    let request = DashboardRequest::new("SPY", Interval::Hour1, Period::Month1);

    let first = dashboard.render(&request).unwrap();
    let second = dashboard.render(&request).unwrap();
    assert_eq!(first.table, second.table);
    assert_eq!(first.panels, second.panels);
    assert_eq!(first.table.len(), 50);
}

#[test]
fn csv_directory_feeds_the_dashboard() {
    let dir = TempDir::new().unwrap();
    let mut csv = String::from("Datetime,Open,High,Low,Close,Adj Close,Volume\n");
    let start = Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap();
    for i in 0..40i64 {
        let ts = start + TimeDelta::minutes(15 * i);
        let close = 190.0 + (i % 5) as f64 * 0.4;
        writeln!(
            csv,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{}",
            ts.format("%Y-%m-%d %H:%M:%S+00:00"),
            close - 0.1,
            close + 0.3,
            close - 0.3,
            close,
            close,
            10_000 + i
        )
        .unwrap();
    }
    std::fs::write(dir.path().join("AAPL_15m.csv"), csv).unwrap();

    let provider = CsvProvider::new(dir.path());
    assert_eq!(provider.name(), "csv");
    let dashboard = Dashboard::new(Box::new(provider), &settings()).unwrap();
    let view = dashboard.render(&DashboardRequest::default()).unwrap();

    assert_eq!(view.status.message, "Data fetched successfully: 40 rows.");
    assert_eq!(view.provider, "csv");

    let text = TerminalPresenter::new().render(&view).unwrap();
    assert!(text.starts_with("AAPL OK [15m / 5d] via csv"));

    let html_path = dir.path().join("dashboard.html");
    HtmlPresenter::new(&html_path, 800).present(&view).unwrap();
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert_eq!(html.matches("<svg").count(), 3);
    assert!(html.contains("<details>"));
}
