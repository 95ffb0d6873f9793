//! Domain error types.

/// Top-level error type for candlescreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown smoothing type '{0}' (expected sma, ema or rma)")]
    UnknownSmoothing(String),

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ScreenerError {
    fn from(err: csv::Error) -> Self {
        ScreenerError::Data {
            reason: format!("CSV error: {err}"),
        }
    }
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::Data { .. } | ScreenerError::NoData { .. } => 3,
            ScreenerError::UnknownSmoothing(_) => 4,
            ScreenerError::Report { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
