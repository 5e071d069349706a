//! Fetch-then-compute pipeline.
//!
//! Every user interaction builds a fresh [`DashboardRequest`] and calls
//! [`Dashboard::render`] once. Nothing is carried between calls: the price
//! series and its indicators are recomputed from scratch and dropped with the
//! returned [`ViewModel`].

use crate::config::{ChartSettings, DashboardSettings};
use crate::data::DataProvider;
use crate::error::EngineError;
use crate::indicators::IndicatorEngine;
use crate::presentation::{build_panels, build_table, Panels, TableRow};
use serde::Serialize;
use shared::models::DashboardRequest;

pub const NO_DATA_MESSAGE: &str =
    "No data available for the selected configuration. Try changing the interval or duration.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub severity: Severity,
    pub message: String,
    pub rows: usize,
}

impl Status {
    pub fn no_data() -> Self {
        Self {
            severity: Severity::Warning,
            message: NO_DATA_MESSAGE.to_string(),
            rows: 0,
        }
    }

    pub fn fetched(rows: usize) -> Self {
        Self {
            severity: Severity::Success,
            message: format!("Data fetched successfully: {} rows.", rows),
            rows,
        }
    }
}

/// Everything a presenter needs for one render. Panels are absent when there is no data.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub request: DashboardRequest,
    pub provider: String,
    pub status: Status,
    pub panels: Option<Panels>,
    pub table: Vec<TableRow>,
}

impl ViewModel {
    pub fn has_data(&self) -> bool {
        self.panels.is_some()
    }
}

pub struct Dashboard {
    provider: Box<dyn DataProvider>,
    engine: IndicatorEngine,
    chart: ChartSettings,
    table_rows: usize,
}

impl Dashboard {
    pub fn new(provider: Box<dyn DataProvider>, settings: &DashboardSettings) -> Result<Self, EngineError> {
        Ok(Self {
            provider,
            engine: IndicatorEngine::new(settings.indicators)?,
            chart: settings.chart.clone(),
            table_rows: settings.table_rows,
        })
    }

    pub fn render(&self, request: &DashboardRequest) -> Result<ViewModel, EngineError> {
        let provider = self.provider.name().to_string();
        let no_data = || ViewModel {
            request: request.clone(),
            provider: provider.clone(),
            status: Status::no_data(),
            panels: None,
            table: Vec::new(),
        };

        if !request.has_ticker() {
            tracing::warn!("Empty ticker symbol, skipping fetch");
            return Ok(no_data());
        }

        let series = self
            .provider
            .fetch(&request.ticker, request.interval, request.period)
            .map_err(|e| {
                tracing::error!(symbol = %request.ticker, provider = %provider, error_detail = %e, "Data fetch failed");
                e
            })?;

        if series.is_empty() {
            tracing::warn!(
                symbol = %request.ticker,
                interval = %request.interval,
                period = %request.period,
                "No data available for selection"
            );
            return Ok(no_data());
        }

        let indicators = self.engine.compute(&series);
        if indicators.len() != series.len() {
            return Err(EngineError::IndicatorError(format!(
                "Indicator series has {} rows for {} bars",
                indicators.len(),
                series.len()
            )));
        }

        tracing::info!(symbol = %request.ticker, rows = series.len(), provider = %provider, "Rendered dashboard");
        Ok(ViewModel {
            request: request.clone(),
            provider,
            status: Status::fetched(series.len()),
            panels: Some(build_panels(&series, &indicators, self.engine.params(), &self.chart)),
            table: build_table(&series, &indicators, self.table_rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryProvider;
    use shared::models::{Interval, Period, PriceSeries};

    struct FailingProvider;

    impl DataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, _: &str, _: Interval, _: Period) -> Result<PriceSeries, EngineError> {
            Err(EngineError::UpstreamFailure("connection reset".to_string()))
        }
    }

    fn settings() -> DashboardSettings {
        DashboardSettings::load_default().unwrap()
    }

    #[test]
    fn empty_provider_gives_no_data_status() {
        let dashboard = Dashboard::new(Box::new(MemoryProvider::new()), &settings()).unwrap();
        let view = dashboard.render(&DashboardRequest::default()).unwrap();
        assert_eq!(view.status, Status::no_data());
        assert!(!view.has_data());
        assert!(view.table.is_empty());
        assert_eq!(view.provider, "memory");
    }

    #[test]
    fn blank_ticker_skips_fetch() {
        let dashboard = Dashboard::new(Box::new(FailingProvider), &settings()).unwrap();
        let request = DashboardRequest::new("  ", Interval::Day1, Period::Day5);
        let view = dashboard.render(&request).unwrap();
        assert_eq!(view.status.severity, Severity::Warning);
    }

    #[test]
    fn upstream_failure_propagates() {
        let dashboard = Dashboard::new(Box::new(FailingProvider), &settings()).unwrap();
        let err = dashboard.render(&DashboardRequest::default()).unwrap_err();
        assert!(matches!(err, EngineError::UpstreamFailure(_)));
    }

    #[test]
    fn fetched_status_counts_rows() {
        let status = Status::fetched(42);
        assert_eq!(status.severity, Severity::Success);
        assert_eq!(status.message, "Data fetched successfully: 42 rows.");
    }
}
