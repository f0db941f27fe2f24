//! Report generation port trait.

use crate::domain::error::TrendscopeError;
use crate::domain::report::{BacktestReport, PortfolioReport, ScreenReport};

/// Port for presenting or persisting pipeline results.
///
/// Every method defaults to doing nothing, so a writer only implements the
/// reports it handles.
pub trait ReportPort {
    fn write_backtest(&self, _report: &BacktestReport) -> Result<(), TrendscopeError> {
        Ok(())
    }

    fn write_screen(&self, _report: &ScreenReport) -> Result<(), TrendscopeError> {
        Ok(())
    }

    fn write_portfolio(&self, _report: &PortfolioReport) -> Result<(), TrendscopeError> {
        Ok(())
    }
}
