// Presentation layer: chart/table descriptions and the presenters that draw them
pub mod html;
pub mod json;
pub mod terminal;

pub use html::HtmlPresenter;
pub use json::JsonPresenter;
pub use terminal::TerminalPresenter;

use crate::config::ChartSettings;
use crate::error::EngineError;
use crate::indicators::IndicatorParams;
use crate::pipeline::ViewModel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::models::{IndicatorSeries, PriceSeries};

/// Draws a view model. Presenters only read from it.
pub trait Presenter {
    fn present(&self, view: &ViewModel) -> Result<(), EngineError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub color: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
}

/// Horizontal line at a fixed y value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub value: f64,
    pub color: String,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    pub title: String,
    pub y_label: Option<String>,
    pub height: u32,
    pub timestamps: Vec<DateTime<Utc>>,
    pub lines: Vec<LineSeries>,
    pub bars: Option<BarSeries>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl ChartPanel {
    /// y range covering every line, bar and reference line.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let lines = self.lines.iter().flat_map(|l| l.values.iter().copied());
        let bars = self.bars.iter().flat_map(|b| b.values.iter().copied().map(Some));
        let refs = self.reference_lines.iter().map(|r| Some(r.value));
        shared::utils::value_range(lines.chain(bars).chain(refs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panels {
    pub price: ChartPanel,
    pub rsi: ChartPanel,
    pub macd: ChartPanel,
}

/// One row of the raw-data table: the bar plus its indicator values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub rsi: Option<f64>,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd: f64,
    pub signal: f64,
}

fn line(name: impl Into<String>, color: &str, values: Vec<Option<f64>>) -> LineSeries {
    LineSeries {
        name: name.into(),
        color: color.to_string(),
        values,
    }
}

fn defined(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(Some).collect()
}

pub fn build_panels(
    series: &PriceSeries,
    indicators: &IndicatorSeries,
    params: &IndicatorParams,
    chart: &ChartSettings,
) -> Panels {
    let timestamps = series.timestamps();
    let colors = &chart.colors;

    let price = ChartPanel {
        title: "Price Chart with EMAs".to_string(),
        y_label: None,
        height: chart.height,
        timestamps: timestamps.clone(),
        lines: vec![
            line("Close", &colors.close, defined(series.closes())),
            line(params.fast_label(), &colors.ema_fast, defined(indicators.ema_fast())),
            line(params.slow_label(), &colors.ema_slow, defined(indicators.ema_slow())),
        ],
        bars: None,
        reference_lines: Vec::new(),
    };

    let rsi = ChartPanel {
        title: "RSI Indicator".to_string(),
        y_label: Some("RSI".to_string()),
        height: chart.height,
        timestamps: timestamps.clone(),
        lines: vec![line(params.rsi_label(), &colors.rsi, indicators.rsi())],
        bars: None,
        reference_lines: vec![
            ReferenceLine {
                value: chart.rsi_overbought,
                color: colors.overbought.clone(),
                dashed: true,
            },
            ReferenceLine {
                value: chart.rsi_oversold,
                color: colors.oversold.clone(),
                dashed: true,
            },
        ],
    };

    let macd = ChartPanel {
        title: "MACD Indicator".to_string(),
        y_label: None,
        height: chart.height,
        timestamps,
        lines: vec![
            line("MACD", &colors.macd, defined(indicators.macd())),
            line("Signal Line", &colors.signal, defined(indicators.signal())),
        ],
        bars: Some(BarSeries {
            name: "Histogram".to_string(),
            color: colors.histogram.clone(),
            values: indicators.histogram(),
        }),
        reference_lines: Vec::new(),
    };

    Panels { price, rsi, macd }
}

/// The most recent `limit` bars with their indicators, oldest first.
pub fn build_table(series: &PriceSeries, indicators: &IndicatorSeries, limit: usize) -> Vec<TableRow> {
    let recent = series.tail(limit);
    let start = series.len() - recent.len();
    recent
        .iter()
        .zip(&indicators.rows[start..])
        .map(|(bar, ind)| TableRow {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            rsi: ind.rsi,
            ema_fast: ind.ema_fast,
            ema_slow: ind.ema_slow,
            macd: ind.macd,
            signal: ind.signal,
        })
        .collect()
}
