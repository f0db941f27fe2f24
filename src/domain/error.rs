//! Domain error types.

/// Top-level error type for trendscope.
#[derive(Debug, thiserror::Error)]
pub enum TrendscopeError {
    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: {bars} bars left after indicator warm-up, need {minimum}")]
    InsufficientWarmup {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("failed to fetch {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

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

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TrendscopeError> for std::process::ExitCode {
    fn from(err: &TrendscopeError) -> Self {
        let code: u8 = match err {
            TrendscopeError::Io(_) | TrendscopeError::Csv(_) => 1,
            TrendscopeError::ConfigParse { .. }
            | TrendscopeError::ConfigMissing { .. }
            | TrendscopeError::ConfigInvalid { .. } => 2,
            TrendscopeError::NoData { .. }
            | TrendscopeError::InsufficientWarmup { .. }
            | TrendscopeError::Fetch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
