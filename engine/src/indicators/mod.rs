// Technical indicators module
pub mod ema;
pub mod macd;
pub mod rsi;

pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use shared::models::{IndicatorRow, IndicatorSeries, PriceBar, PriceSeries};

// Common trait for single-line indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn calculate(&self, data: &[PriceBar]) -> Vec<Option<f64>>; // None where history is insufficient
}

/// Indicator periods, loaded from the `indicators` section of the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi_window: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub signal_span: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_window: 14,
            ema_fast: 12,
            ema_slow: 26,
            signal_span: 9,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rsi_window < 2 {
            return Err(EngineError::ConfigError(format!(
                "RSI window must be at least 2, got {}",
                self.rsi_window
            )));
        }
        if self.ema_fast == 0 || self.ema_slow == 0 || self.signal_span == 0 {
            return Err(EngineError::ConfigError(
                "EMA and signal spans must be greater than 0".to_string(),
            ));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(EngineError::ConfigError(format!(
                "Fast EMA span ({}) must be shorter than slow EMA span ({})",
                self.ema_fast, self.ema_slow
            )));
        }
        Ok(())
    }

    pub fn macd(&self) -> Macd {
        Macd::new(self.ema_fast, self.ema_slow, self.signal_span)
    }

    pub fn fast_label(&self) -> String {
        format!("EMA({})", self.ema_fast)
    }

    pub fn slow_label(&self) -> String {
        format!("EMA({})", self.ema_slow)
    }

    pub fn rsi_label(&self) -> String {
        Rsi::new(self.rsi_window).name().to_string()
    }
}

/// Derives the full indicator series for a price series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// One row per bar, same order and timestamps. Empty input gives empty output.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        if series.is_empty() {
            return IndicatorSeries::default();
        }

        let rsi_values = Rsi::new(self.params.rsi_window).calculate(series.bars());
        let macd = self.params.macd().calculate(&series.closes());

        let rows = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRow {
                timestamp: bar.timestamp,
                rsi: rsi_values[i],
                ema_fast: macd.ema_fast[i],
                ema_slow: macd.ema_slow[i],
                macd: macd.macd[i],
                signal: macd.signal[i],
            })
            .collect();

        tracing::debug!(
            bars = series.len(),
            rsi_window = self.params.rsi_window,
            "Computed indicator series"
        );
        IndicatorSeries { rows }
    }
}
