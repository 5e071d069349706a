// Market data providers
pub mod csv_parser;
pub mod market_data;
pub mod yahoo;

pub use csv_parser::CsvProvider;
pub use market_data::MemoryProvider;
pub use yahoo::YahooProvider;

use crate::config::{DataSettings, DataSourceKind};
use crate::error::EngineError;
use shared::models::{Interval, Period, PriceSeries};

/// Source of OHLC bars for one ticker/interval/period selection.
///
/// An empty series is a normal answer (unknown ticker, closed market,
/// unsupported interval/period combination). Errors are reserved for
/// transport and upstream failures.
pub trait DataProvider {
    fn name(&self) -> &str;
    fn fetch(&self, ticker: &str, interval: Interval, period: Period) -> Result<PriceSeries, EngineError>;
}

/// Builds the provider selected in the `data` settings.
pub fn provider_from_settings(settings: &DataSettings) -> Result<Box<dyn DataProvider>, EngineError> {
    match settings.source {
        DataSourceKind::Yahoo => Ok(Box::new(YahooProvider::new(settings)?)),
        DataSourceKind::Csv => Ok(Box::new(CsvProvider::new(&settings.csv_dir))),
    }
}
