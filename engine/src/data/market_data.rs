// In-memory market data, keyed by ticker and interval
use super::DataProvider;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use shared::models::{Interval, Period, PriceBar, PriceSeries};
use std::collections::HashMap;

/// Keeps only the bars inside `period`, counted back from the last bar.
///
/// The lower bound is exclusive: a `1d` window over daily bars holds one bar,
/// matching what the chart API returns for `range=1d`.
pub fn trailing_window(series: PriceSeries, period: Period) -> PriceSeries {
    let Some(last) = series.last() else {
        return series;
    };
    let start = period.start_from(last.timestamp);
    let kept = series.into_bars().into_iter().filter(|b| b.timestamp > start).collect();
    PriceSeries::new(kept)
}

fn filter_range(bars: &[PriceBar], from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> PriceSeries {
    let kept = bars
        .iter()
        .filter(|b| from.map_or(true, |start| b.timestamp >= start))
        .filter(|b| to.map_or(true, |end| b.timestamp <= end))
        .cloned()
        .collect();
    PriceSeries::new(kept)
}

#[derive(Debug, Default)]
pub struct MemoryProvider {
    data: HashMap<String, HashMap<Interval, Vec<PriceBar>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges bars into the store; later duplicates of a timestamp are dropped.
    pub fn add_bars(&mut self, ticker: &str, interval: Interval, new_bars: Vec<PriceBar>) {
        let ticker_data = self.data.entry(ticker.trim().to_uppercase()).or_default();
        let interval_data = ticker_data.entry(interval).or_default();

        interval_data.extend(new_bars);
        let merged = PriceSeries::new(std::mem::take(interval_data));
        *interval_data = merged.into_bars();
    }

    pub fn get_bars(
        &self,
        ticker: &str,
        interval: Interval,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Option<PriceSeries> {
        self.data
            .get(&ticker.trim().to_uppercase())
            .and_then(|ticker_data| ticker_data.get(&interval))
            .map(|bars| filter_range(bars, from, to))
    }
}

impl DataProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, ticker: &str, interval: Interval, period: Period) -> Result<PriceSeries, EngineError> {
        let series = self
            .get_bars(ticker, interval, None, None)
            .map(|s| trailing_window(s, period))
            .unwrap_or_default();
        tracing::debug!(symbol = %ticker, %interval, %period, rows = series.len(), "Served bars from memory");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeDelta, TimeZone, Weekday};

    fn daily_bars(days: i64) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 21, 0, 0).unwrap();
        (0..days)
            .map(|d| PriceBar {
                timestamp: start + TimeDelta::days(d),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + d as f64,
                volume: 10,
            })
            .collect()
    }

    #[test]
    fn unknown_ticker_is_empty_not_error() {
        let provider = MemoryProvider::new();
        let series = provider.fetch("NOPE", Interval::Day1, Period::Month1).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn fetch_keeps_trailing_period() {
        let mut provider = MemoryProvider::new();
        provider.add_bars("aapl", Interval::Day1, daily_bars(100));

        let five = provider.fetch("AAPL", Interval::Day1, Period::Day5).unwrap();
        // the bar exactly five days before the last one is outside the window
        assert_eq!(five.len(), 5);
        assert_eq!(five.last().unwrap().close, 199.0);

        let all = provider.fetch("AAPL", Interval::Day1, Period::Month3).unwrap();
        assert!(all.len() > 80 && all.len() <= 100);
    }

    #[test]
    fn weekday_bars_give_one_session_per_day() {
        // Mon 2024-03-04 .. Fri 2024-03-15, no weekends
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 21, 0, 0).unwrap();
        let bars: Vec<PriceBar> = (0..12)
            .map(|d| start + TimeDelta::days(d))
            .filter(|ts| !matches!(ts.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|timestamp| PriceBar {
                timestamp,
                open: 50.0,
                high: 51.0,
                low: 49.0,
                close: 50.5,
                volume: 100,
            })
            .collect();
        let mut provider = MemoryProvider::new();
        provider.add_bars("QQQ", Interval::Day1, bars);

        let one = provider.fetch("QQQ", Interval::Day1, Period::Day1).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one.bars()[0].timestamp, Utc.with_ymd_and_hms(2024, 3, 15, 21, 0, 0).unwrap());

        let week = provider.fetch("QQQ", Interval::Day1, Period::Day5).unwrap();
        assert_eq!(week.len(), 5);
        assert_eq!(week.bars()[0].timestamp.weekday(), Weekday::Mon);
    }

    #[test]
    fn intervals_are_stored_separately() {
        let mut provider = MemoryProvider::new();
        provider.add_bars("MSFT", Interval::Day1, daily_bars(3));
        assert!(provider.fetch("MSFT", Interval::Hour1, Period::Month1).unwrap().is_empty());
    }

    #[test]
    fn add_bars_merges_and_deduplicates() {
        let mut provider = MemoryProvider::new();
        let bars = daily_bars(4);
        provider.add_bars("SPY", Interval::Day1, bars[2..].to_vec());
        provider.add_bars("SPY", Interval::Day1, bars.clone());
        let stored = provider.get_bars("SPY", Interval::Day1, None, None).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored.bars(), &bars[..]);
    }

    #[test]
    fn get_bars_filters_by_range() {
        let mut provider = MemoryProvider::new();
        let bars = daily_bars(10);
        provider.add_bars("SPY", Interval::Day1, bars.clone());
        let subset = provider
            .get_bars("SPY", Interval::Day1, Some(bars[2].timestamp), Some(bars[4].timestamp))
            .unwrap();
        assert_eq!(subset.len(), 3);
    }

    #[test]
    fn trailing_window_of_empty_series_is_empty() {
        assert!(trailing_window(PriceSeries::empty(), Period::Day1).is_empty());
    }
}
