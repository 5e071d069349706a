// Dashboard settings, loaded from the embedded default JSON or a user-supplied file
use crate::error::EngineError;
use crate::indicators::IndicatorParams;
use serde::Deserialize;
use shared::models::{DashboardRequest, Interval, Period};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONFIG: &str = include_str!("../../assets/config/default.json");

pub const ENV_SOURCE: &str = "DASHBOARD_SOURCE";
pub const ENV_CSV_DIR: &str = "DASHBOARD_CSV_DIR";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub version: String,
    pub defaults: SelectionDefaults,
    pub indicators: IndicatorParams,
    pub chart: ChartSettings,
    pub table_rows: usize,
    pub data: DataSettings,
}

/// Initial values of the ticker/interval/duration inputs.
#[derive(Debug, Deserialize, Clone)]
pub struct SelectionDefaults {
    pub ticker: String,
    pub interval: Interval,
    #[serde(rename = "duration")]
    pub period: Period,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub colors: ChartColors,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartColors {
    pub close: String,
    pub ema_fast: String,
    pub ema_slow: String,
    pub rsi: String,
    pub overbought: String,
    pub oversold: String,
    pub macd: String,
    pub signal: String,
    pub histogram: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Yahoo,
    Csv,
}

impl FromStr for DataSourceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(DataSourceKind::Yahoo),
            "csv" => Ok(DataSourceKind::Csv),
            other => Err(EngineError::ConfigError(format!(
                "Unknown data source '{}' (expected 'yahoo' or 'csv')",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    pub source: DataSourceKind,
    pub csv_dir: PathBuf,
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl DataSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DashboardSettings {
    pub fn load_default() -> Result<Self, EngineError> {
        Self::from_json(DEFAULT_CONFIG)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, EngineError> {
        let settings: DashboardSettings = serde_json::from_str(config_str)
            .map_err(|e| EngineError::ConfigError(format!("Invalid configuration: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `path` if given, otherwise the embedded defaults, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let mut settings = match path {
            Some(p) => Self::load_from_path(p)?,
            None => Self::load_default()?,
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = lookup(ENV_SOURCE) {
            self.data.source = source.parse()?;
            tracing::debug!(source = ?self.data.source, "Data source overridden from environment");
        }
        if let Some(dir) = lookup(ENV_CSV_DIR) {
            self.data.csv_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.indicators.validate()?;
        if self.table_rows == 0 {
            return Err(EngineError::ConfigError("table_rows must be greater than 0".to_string()));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(EngineError::ConfigError("Chart dimensions must be non-zero".to_string()));
        }
        if !(0.0..=100.0).contains(&self.chart.rsi_oversold)
            || !(0.0..=100.0).contains(&self.chart.rsi_overbought)
            || self.chart.rsi_oversold >= self.chart.rsi_overbought
        {
            return Err(EngineError::ConfigError(format!(
                "RSI bands must satisfy 0 <= oversold < overbought <= 100, got {} / {}",
                self.chart.rsi_oversold, self.chart.rsi_overbought
            )));
        }
        if self.data.timeout_secs == 0 {
            return Err(EngineError::ConfigError("data.timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn default_request(&self) -> DashboardRequest {
        DashboardRequest::new(&self.defaults.ticker, self.defaults.interval, self.defaults.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn embedded_defaults_load() {
        let settings = DashboardSettings::load_default().unwrap();
        assert_eq!(settings.indicators, IndicatorParams::default());
        assert_eq!(settings.table_rows, 50);
        assert_eq!(settings.version, "0.1.0");
        assert_eq!(settings.chart.rsi_overbought, 70.0);
        assert_eq!(settings.chart.rsi_oversold, 30.0);
        assert_eq!(settings.data.source, DataSourceKind::Yahoo);

        let request = settings.default_request();
        assert_eq!(request.ticker, "AAPL");
        assert_eq!(request.interval, Interval::Minute15);
        assert_eq!(request.period, Period::Day5);
    }

    #[test]
    fn overrides_replace_data_source() {
        let mut settings = DashboardSettings::load_default().unwrap();
        settings
            .apply_overrides(|key| match key {
                ENV_SOURCE => Some("CSV".to_string()),
                ENV_CSV_DIR => Some("/tmp/bars".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(settings.data.source, DataSourceKind::Csv);
        assert_eq!(settings.data.csv_dir, PathBuf::from("/tmp/bars"));
    }

    #[test]
    fn unknown_source_override_is_rejected() {
        let mut settings = DashboardSettings::load_default().unwrap();
        let result = settings.apply_overrides(|key| (key == ENV_SOURCE).then(|| "bloomberg".to_string()));
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn invalid_indicator_periods_fail_validation() {
        let json = DEFAULT_CONFIG.replace("\"ema_fast\": 12", "\"ema_fast\": 40");
        let err = DashboardSettings::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("must be shorter"));
    }

    #[test]
    fn inverted_rsi_bands_fail_validation() {
        let json = DEFAULT_CONFIG.replace("\"rsi_oversold\": 30.0", "\"rsi_oversold\": 80.0");
        assert!(DashboardSettings::from_json(&json).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", DEFAULT_CONFIG.replace("\"table_rows\": 50", "\"table_rows\": 10")).unwrap();
        let settings = DashboardSettings::load_from_path(file.path()).unwrap();
        assert_eq!(settings.table_rows, 10);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = DashboardSettings::load_from_path(Path::new("/nonexistent/dashboard.json")).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }
}
