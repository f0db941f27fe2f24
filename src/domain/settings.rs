//! Run parameters for each pipeline, resolved from config and CLI overrides.

use std::path::PathBuf;

use crate::domain::window::FetchRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub symbol: String,
    pub request: FetchRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    pub symbols: Vec<String>,
    pub request: FetchRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSettings {
    pub symbols: Vec<String>,
    pub request: FetchRequest,
    /// Annual rate, e.g. 0.05 for 5%.
    pub risk_free_rate: f64,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub charts: bool,
    pub chart_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            charts: true,
            chart_dir: PathBuf::from("."),
        }
    }
}
