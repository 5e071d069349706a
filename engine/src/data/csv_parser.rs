use super::market_data::trailing_window;
use super::DataProvider;
use crate::error::EngineError;
use anyhow::{anyhow, Result};
use csv::{ReaderBuilder, StringRecord};
use shared::models::{Interval, Period, PriceBar, PriceSeries};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

// Field parsing for the CSV layout written by Yahoo Finance downloads.
pub mod yahoo_format {
    use anyhow::{anyhow, Result};
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use std::str::FromStr;

    pub fn parse_decimal(s: &str) -> Result<f64> {
        let value = f64::from_str(s.trim()).map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Non-finite decimal '{}'", s));
        }
        Ok(value)
    }

    // Volumes are sometimes exported as floats ("1234.0").
    pub fn parse_volume(s: &str) -> Result<u64> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        if let Ok(v) = trimmed.parse::<u64>() {
            return Ok(v);
        }
        let value = parse_decimal(trimmed)?;
        if value < 0.0 {
            return Err(anyhow!("Negative volume '{}'", s));
        }
        Ok(value.round() as u64)
    }

    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[+HH:MM]` and plain `YYYY-MM-DD` (midnight UTC).
    pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| anyhow!("Failed to parse timestamp '{}': {}", s, e))?;
        date.and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| anyhow!("Failed to build midnight for '{}'", s))
    }

}

/// Reads bars from `{dir}/{TICKER}_{interval}.csv`.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// `None` for tickers that cannot name a file inside the data directory.
    pub fn file_for(&self, ticker: &str, interval: Interval) -> Option<PathBuf> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() || ticker.contains(['/', '\\']) || ticker.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{}_{}.csv", ticker, interval)))
    }

    // Header: Date|Datetime,Open,High,Low,Close[,Adj Close],Volume
    // Row:    2024-03-04 09:30:00-05:00,175.10,175.60,174.90,175.40,175.40,1203040
    pub fn load_bars_from_csv(file_path: &Path) -> Result<Vec<PriceBar>> {
        let file = File::open(file_path)
            .map_err(|e| anyhow!("Failed to open CSV file '{}': {}", file_path.display(), e))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers = rdr.headers()?.clone();
        let mut bars = Vec::new();
        let mut skipped = 0usize;

        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result.map_err(|e| anyhow!("Error reading CSV record at line {}: {}", line, e))?;

            let ts_str = Self::get_field(&record, &headers, &["Datetime", "Date"])
                .ok_or_else(|| anyhow!("Missing 'Date' field in CSV record at line {}", line))?;
            let open_str = Self::require(&record, &headers, "Open", line)?;
            let high_str = Self::require(&record, &headers, "High", line)?;
            let low_str = Self::require(&record, &headers, "Low", line)?;
            let close_str = Self::require(&record, &headers, "Close", line)?;
            let volume_str = Self::get_field(&record, &headers, &["Volume"]).unwrap_or("");

            // Incomplete rows (market halts, partial downloads) are dropped.
            if [open_str, high_str, low_str, close_str].iter().any(|s| s.is_empty()) {
                skipped += 1;
                continue;
            }

            let timestamp = yahoo_format::parse_timestamp(ts_str)
                .map_err(|e| anyhow!("Error parsing timestamp at line {}: {}", line, e))?;
            let open = yahoo_format::parse_decimal(open_str)
                .map_err(|e| anyhow!("Error parsing 'Open' at line {}: {}", line, e))?;
            let high = yahoo_format::parse_decimal(high_str)
                .map_err(|e| anyhow!("Error parsing 'High' at line {}: {}", line, e))?;
            let low = yahoo_format::parse_decimal(low_str)
                .map_err(|e| anyhow!("Error parsing 'Low' at line {}: {}", line, e))?;
            let close = yahoo_format::parse_decimal(close_str)
                .map_err(|e| anyhow!("Error parsing 'Close' at line {}: {}", line, e))?;
            let volume = yahoo_format::parse_volume(volume_str)
                .map_err(|e| anyhow!("Error parsing 'Volume' at line {}: {}", line, e))?;

            let bar = PriceBar { timestamp, open, high, low, close, volume };
            if !bar.has_valid_prices() {
                skipped += 1;
                continue;
            }
            bars.push(bar);
        }

        if skipped > 0 {
            tracing::warn!(path = %file_path.display(), skipped, "Dropped incomplete or non-positive CSV rows");
        }
        Ok(bars)
    }

    fn require<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<&'a str> {
        Self::get_field(record, headers, &[name])
            .ok_or_else(|| anyhow!("Missing '{}' field in CSV record at line {}", name, line))
    }

    // Looks a field up by the first header name that is present.
    fn get_field<'a>(record: &'a StringRecord, headers: &StringRecord, names: &[&str]) -> Option<&'a str> {
        names
            .iter()
            .find_map(|name| headers.iter().position(|header| header.eq_ignore_ascii_case(name)))
            .and_then(|pos| record.get(pos))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, ticker: &str, interval: Interval, period: Period) -> Result<PriceSeries, EngineError> {
        let Some(path) = self.file_for(ticker, interval) else {
            tracing::warn!(symbol = %ticker, "Ticker cannot be mapped to a CSV file");
            return Ok(PriceSeries::empty());
        };
        if !path.exists() {
            tracing::warn!(symbol = %ticker, path = %path.display(), "No CSV file for ticker/interval");
            return Ok(PriceSeries::empty());
        }

        let bars = Self::load_bars_from_csv(&path)
            .map_err(|e| EngineError::CsvDataFormatError(e.to_string()))?;
        let series = trailing_window(PriceSeries::new(bars), period);
        tracing::info!(symbol = %ticker, %interval, %period, rows = series.len(), path = %path.display(), "Loaded bars from CSV");
        Ok(series)
    }
}
