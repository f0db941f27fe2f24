//! Pipeline wiring: fetch bars through a [`DataPort`], run the domain stages
//! and hand finished reports to [`ReportPort`] writers.
//!
//! The backtest works on a single symbol and fails on bad data. The screener
//! and portfolio pipelines skip bad symbols and only fail when nothing is left.

use tracing::{debug, info, warn};

use crate::domain::error::TrendscopeError;
use crate::domain::indicator_rows::require_indicator_rows;
use crate::domain::metrics::summarize_returns;
use crate::domain::price_table::{DateTable, SymbolSeries, correlation_matrix};
use crate::domain::report::{BacktestReport, PortfolioReport, ScreenReport};
use crate::domain::screener::{ScreenResult, passing_candidates, screen_latest};
use crate::domain::settings::{BacktestSettings, PortfolioSettings, ScreenSettings};
use crate::domain::signal::evaluate_signals;
use crate::domain::trade_tracker::{summarize_trades, track_trades};
use crate::domain::universe::{ScanResult, SkipReason, SkippedSymbol, SymbolOutcome};
use crate::domain::window::FetchRequest;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub fn run_backtest(
    data_port: &dyn DataPort,
    settings: &BacktestSettings,
) -> Result<BacktestReport, TrendscopeError> {
    let symbol = settings.symbol.as_str();
    info!(symbol, window = %settings.request.window, "running backtest");

    let bars = data_port.fetch_ohlcv(symbol, &settings.request)?;
    let rows = require_indicator_rows(symbol, &bars)?;
    debug!(symbol, bars = bars.len(), rows = rows.len(), "indicators ready");

    let signals = evaluate_signals(&rows);
    let trades = track_trades(&signals);
    let summary = summarize_trades(&trades);
    info!(symbol, trades = trades.len(), "backtest finished");

    Ok(BacktestReport {
        symbol: symbol.to_string(),
        signals,
        trades,
        summary,
    })
}

fn skipped(symbol: &str, reason: SkipReason) -> SkippedSymbol {
    warn!(symbol, reason = %reason, "skipping symbol");
    SkippedSymbol {
        symbol: symbol.to_string(),
        reason,
    }
}

fn skipped_by(symbol: &str, err: &TrendscopeError) -> SkippedSymbol {
    skipped(symbol, SkipReason::from(err))
}

/// Screen one symbol on its most recent bar.
pub fn screen_symbol(
    data_port: &dyn DataPort,
    symbol: &str,
    request: &FetchRequest,
) -> SymbolOutcome<ScreenResult> {
    let bars = data_port
        .fetch_ohlcv(symbol, request)
        .map_err(|e| skipped_by(symbol, &e))?;
    let rows = require_indicator_rows(symbol, &bars).map_err(|e| skipped_by(symbol, &e))?;
    screen_latest(symbol, &rows).ok_or_else(|| skipped(symbol, SkipReason::NoData))
}

pub fn run_screen(
    data_port: &dyn DataPort,
    settings: &ScreenSettings,
) -> Result<ScreenReport, TrendscopeError> {
    info!(
        symbols = settings.symbols.len(),
        window = %settings.request.window,
        "running screen"
    );

    let scan: ScanResult<ScreenResult> = settings
        .symbols
        .iter()
        .map(|symbol| screen_symbol(data_port, symbol, &settings.request))
        .collect();

    if scan.is_empty() {
        return Err(TrendscopeError::NoData {
            symbol: "all".to_string(),
        });
    }

    let candidates = passing_candidates(&scan.ready);
    info!(
        screened = scan.ready.len(),
        passed = candidates.len(),
        skipped = scan.skipped.len(),
        "screen finished"
    );

    Ok(ScreenReport {
        results: scan.ready,
        candidates,
        skipped: scan.skipped,
    })
}

/// Close series for one symbol. A single close still joins the price table;
/// it is dropped from the summary for lack of returns.
pub fn load_close_series(
    data_port: &dyn DataPort,
    symbol: &str,
    request: &FetchRequest,
) -> SymbolOutcome<SymbolSeries> {
    let bars = data_port
        .fetch_ohlcv(symbol, request)
        .map_err(|e| skipped_by(symbol, &e))?;
    if bars.is_empty() {
        return Err(skipped(symbol, SkipReason::NoData));
    }
    debug!(symbol, bars = bars.len(), "closes loaded");
    Ok(SymbolSeries {
        symbol: symbol.to_string(),
        points: bars.iter().map(|b| (b.date, b.close)).collect(),
    })
}

pub fn run_portfolio(
    data_port: &dyn DataPort,
    settings: &PortfolioSettings,
) -> Result<PortfolioReport, TrendscopeError> {
    info!(
        symbols = settings.symbols.len(),
        window = %settings.request.window,
        risk_free_rate = settings.risk_free_rate,
        "running portfolio analysis"
    );

    let scan: ScanResult<SymbolSeries> = settings
        .symbols
        .iter()
        .map(|symbol| load_close_series(data_port, symbol, &settings.request))
        .collect();

    if scan.is_empty() {
        return Err(TrendscopeError::NoData {
            symbol: "all".to_string(),
        });
    }

    let prices = DateTable::outer_join(&scan.ready);
    let returns = prices.returns();
    let mut skips = scan.skipped;

    let summary = prices
        .symbols
        .iter()
        .enumerate()
        .filter_map(|(col, symbol)| {
            let row = summarize_returns(symbol, &returns.present(col), settings.risk_free_rate);
            if row.is_none() {
                skips.push(skipped(symbol, SkipReason::NoReturns));
            }
            row
        })
        .collect::<Vec<_>>();

    if summary.is_empty() {
        return Err(TrendscopeError::NoData {
            symbol: "all".to_string(),
        });
    }

    let equity = returns.equity_curves();
    let correlation = correlation_matrix(&returns);
    info!(
        symbols = summary.len(),
        dates = prices.rows.len(),
        skipped = skips.len(),
        "portfolio analysis finished"
    );

    Ok(PortfolioReport {
        summary,
        prices,
        returns,
        equity,
        correlation,
        skipped: skips,
    })
}

/// Run `write` against every writer, stopping at the first failure.
pub fn publish<F>(writers: &[&dyn ReportPort], write: F) -> Result<(), TrendscopeError>
where
    F: Fn(&dyn ReportPort) -> Result<(), TrendscopeError>,
{
    writers.iter().try_for_each(|w| write(*w))
}
