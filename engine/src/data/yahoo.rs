//! Yahoo Finance chart API provider.
//!
//! Issues one blocking `GET {base_url}/v8/finance/chart/{ticker}` per fetch.
//! Upstream "no data" answers (unknown symbol, interval/range combinations the
//! API refuses) become an empty series; transport failures and unexpected
//! responses become [`EngineError::UpstreamFailure`].

use super::DataProvider;
use crate::config::DataSettings;
use crate::error::EngineError;
use chrono::DateTime;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use shared::models::{Interval, Period, PriceBar, PriceSeries};

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct YahooProvider {
    http: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(settings: &DataSettings) -> Result<Self, EngineError> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .user_agent(&settings.user_agent)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn chart_url(&self, ticker: &str, interval: Interval, period: Period) -> Result<Url, EngineError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| EngineError::ConfigError(format!("Invalid data.base_url '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| EngineError::ConfigError(format!("data.base_url '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(&["v8", "finance", "chart", ticker]);
        url.query_pairs_mut()
            .append_pair("interval", interval.as_str())
            .append_pair("range", period.as_str())
            .append_pair("includePrePost", "false");
        Ok(url)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch(&self, ticker: &str, interval: Interval, period: Period) -> Result<PriceSeries, EngineError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Ok(PriceSeries::empty());
        }

        let url = self.chart_url(ticker, interval, period)?;
        tracing::info!(symbol = %ticker, %interval, %period, "Requesting chart data from Yahoo");

        let response = self.http.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        let series = parse_chart_response(status, &body)?;
        tracing::info!(symbol = %ticker, status, rows = series.len(), "Received chart data");
        Ok(series)
    }
}

/// Turns a chart API response into a series.
pub fn parse_chart_response(status: u16, body: &str) -> Result<PriceSeries, EngineError> {
    let success = (200..300).contains(&status);
    let envelope = match serde_json::from_str::<ChartEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            let snippet: String = body.chars().take(120).collect();
            return Err(EngineError::UpstreamFailure(if success {
                format!("Malformed chart response: {}", e)
            } else {
                format!("HTTP {} from chart API: {}", status, snippet)
            }));
        }
    };

    if let Some(err) = envelope.chart.error {
        tracing::warn!(
            status,
            code = %err.code,
            description = err.description.as_deref().unwrap_or(""),
            "Chart API returned no data"
        );
        return Ok(PriceSeries::empty());
    }
    if !success {
        return Err(EngineError::UpstreamFailure(format!("HTTP {} from chart API", status)));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();
    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) =
            (at(&quote.open, i), at(&quote.high, i), at(&quote.low, i), at(&quote.close, i))
        else {
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        let volume = at(&quote.volume, i)
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(0, |v| v.round() as u64);

        let bar = PriceBar { timestamp, open, high, low, close, volume };
        if bar.has_valid_prices() {
            bars.push(bar);
        }
    }

    Ok(PriceSeries::new(bars))
}
