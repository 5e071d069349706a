// Command-line selection: ticker, interval, duration and output targets
use crate::config::{DashboardSettings, DataSourceKind};
use clap::Parser;
use shared::models::{DashboardRequest, Interval, Period};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Parser)]
#[command(
    name = "ticker-dashboard",
    version,
    about = "Price, EMA, RSI and MACD dashboard for one ticker"
)]
pub struct CliArgs {
    /// Ticker symbol (defaults to the configured one)
    pub ticker: Option<String>,

    /// Bar interval: 1m, 5m, 15m, 1h or 1d
    #[arg(short, long, value_parser = Interval::from_str)]
    pub interval: Option<Interval>,

    /// History to fetch: 1d, 5d, 1mo or 3mo
    #[arg(short = 'd', long = "duration", value_name = "DURATION", value_parser = Period::from_str)]
    pub period: Option<Period>,

    /// Data provider: yahoo or csv
    #[arg(short, long, value_parser = DataSourceKind::from_str)]
    pub source: Option<DataSourceKind>,

    /// Directory of TICKER_INTERVAL.csv files
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Write the chart dashboard as HTML
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Write the view model as JSON, to stdout when FILE is omitted
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub json: Option<Option<PathBuf>>,

    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Command-line values take precedence over the configured data settings.
    pub fn apply_to(&self, settings: &mut DashboardSettings) {
        if let Some(source) = self.source {
            settings.data.source = source;
        }
        if let Some(dir) = &self.data_dir {
            settings.data.csv_dir = dir.clone();
        }
    }

    pub fn request(&self, settings: &DashboardSettings) -> DashboardRequest {
        let defaults = settings.default_request();
        DashboardRequest::new(
            self.ticker.as_deref().unwrap_or(&defaults.ticker),
            self.interval.unwrap_or(defaults.interval),
            self.period.unwrap_or(defaults.period),
        )
    }
}
