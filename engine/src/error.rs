use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    // Network or provider failure. Fatal for the current cycle; never retried.
    #[error("Upstream data provider failure: {0}")]
    UpstreamFailure(String),

    #[error("Indicator calculation error: {0}")]
    IndicatorError(String),

    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!(error_detail = ?err, "HTTP request to data provider failed");
        EngineError::UpstreamFailure(err.to_string())
    }
}
