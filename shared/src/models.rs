use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One OHLC bar as delivered by a data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// True when every price is finite and strictly positive.
    pub fn has_valid_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}

/// Time-ordered bars with unique timestamps. Empty is a valid state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Sorts by timestamp and drops repeated timestamps, keeping the first bar seen.
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self { bars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// The most recent `n` bars (all of them if fewer).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSelectionError {
    #[error("unknown interval '{0}' (expected one of 1m, 5m, 15m, 1h, 1d)")]
    Interval(String),
    #[error("unknown duration '{0}' (expected one of 1d, 5d, 1mo, 3mo)")]
    Period(String),
}

/// Bar size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[default]
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
        }
    }

    pub fn all() -> &'static [Interval] {
        &[
            Interval::Minute1,
            Interval::Minute5,
            Interval::Minute15,
            Interval::Hour1,
            Interval::Day1,
        ]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::all()
            .iter()
            .copied()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| ParseSelectionError::Interval(s.to_string()))
    }
}

/// How much history to request, counted back from the most recent bar.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Period {
    #[serde(rename = "1d")]
    Day1,
    #[default]
    #[serde(rename = "5d")]
    Day5,
    #[serde(rename = "1mo")]
    Month1,
    #[serde(rename = "3mo")]
    Month3,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
        }
    }

    pub fn all() -> &'static [Period] {
        &[Period::Day1, Period::Day5, Period::Month1, Period::Month3]
    }

    /// Earliest timestamp still inside this period when the window ends at `end`.
    pub fn start_from(&self, end: DateTime<Utc>) -> DateTime<Utc> {
        let start = match self {
            Period::Day1 => end.checked_sub_signed(TimeDelta::days(1)),
            Period::Day5 => end.checked_sub_signed(TimeDelta::days(5)),
            Period::Month1 => end.checked_sub_months(Months::new(1)),
            Period::Month3 => end.checked_sub_months(Months::new(3)),
        };
        start.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| ParseSelectionError::Period(s.to_string()))
    }
}

/// The user's current selection. Built fresh for every interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub ticker: String,
    pub interval: Interval,
    pub period: Period,
}

impl DashboardRequest {
    pub const DEFAULT_TICKER: &'static str = "AAPL";

    pub fn new(ticker: &str, interval: Interval, period: Period) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            interval,
            period,
        }
    }

    pub fn has_ticker(&self) -> bool {
        !self.ticker.is_empty()
    }
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TICKER, Interval::default(), Period::default())
    }
}

/// Derived indicator values for one bar. `rsi` is `None` during warm-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub rsi: Option<f64>,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd: f64,
    pub signal: f64,
}

impl IndicatorRow {
    pub fn histogram(&self) -> f64 {
        self.macd - self.signal
    }
}

/// Indicator rows aligned one-to-one with the `PriceSeries` they came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rsi(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.rsi).collect()
    }

    pub fn ema_fast(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ema_fast).collect()
    }

    pub fn ema_slow(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ema_slow).collect()
    }

    pub fn macd(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.macd).collect()
    }

    pub fn signal(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.signal).collect()
    }

    pub fn histogram(&self) -> Vec<f64> {
        self.rows.iter().map(IndicatorRow::histogram).collect()
    }
}
