//! Plain-text report tables printed to stdout.

use crate::domain::error::TrendscopeError;
use crate::domain::metrics::PortfolioSummaryRow;
use crate::domain::report::{BacktestReport, PortfolioReport, ScreenReport};
use crate::domain::screener::ScreenResult;
use crate::domain::trade_tracker::{Trade, TradeSummary};
use crate::domain::universe::SkippedSymbol;
use crate::ports::report_port::ReportPort;

pub const NO_TRADES_MESSAGE: &str = "No trades were taken with this strategy.";
pub const NO_CANDIDATES_MESSAGE: &str = "No stocks passed the screen.";

#[derive(Debug, Default)]
pub struct ConsoleReport;

impl ConsoleReport {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for ConsoleReport {
    fn write_backtest(&self, report: &BacktestReport) -> Result<(), TrendscopeError> {
        println!("{}", format_backtest(report));
        Ok(())
    }

    fn write_screen(&self, report: &ScreenReport) -> Result<(), TrendscopeError> {
        println!("{}", format_screen(report));
        Ok(())
    }

    fn write_portfolio(&self, report: &PortfolioReport) -> Result<(), TrendscopeError> {
        println!("{}", format_portfolio(report));
        Ok(())
    }
}

pub fn format_backtest(report: &BacktestReport) -> String {
    let mut out = format!("Backtest: {}\n\n", report.symbol);
    match &report.summary {
        None => {
            out.push_str(NO_TRADES_MESSAGE);
            out.push('\n');
        }
        Some(summary) => {
            out.push_str(&format_trades_table(&report.trades));
            out.push('\n');
            out.push_str(&format_trade_summary(summary));
        }
    }
    out
}

pub fn format_trades_table(trades: &[Trade]) -> String {
    let mut out = format!(
        "{:>4}  {:<10}  {:>12}  {:<10}  {:>12}  {:>9}\n",
        "#", "Entry Date", "Entry Price", "Exit Date", "Exit Price", "Return %"
    );
    for (i, trade) in trades.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<10}  {:>12.2}  {:<10}  {:>12.2}  {:>9.2}{}\n",
            i + 1,
            trade.entry_date.format("%Y-%m-%d"),
            trade.entry_price,
            trade.exit_date.format("%Y-%m-%d"),
            trade.exit_price,
            trade.return_pct,
            if trade.forced_exit { "  (open at end)" } else { "" }
        ));
    }
    out
}

pub fn format_trade_summary(summary: &TradeSummary) -> String {
    format!(
        "Total Trades: {}\nAverage Return: {:.2}%\nTotal Return: {:.2}%\n",
        summary.count, summary.mean_return_pct, summary.total_return_pct
    )
}

pub fn format_screen(report: &ScreenReport) -> String {
    let mut out = String::from("Screen results\n");
    out.push_str(&format_screen_table(&report.results));
    out.push('\n');
    if report.candidates.is_empty() {
        out.push_str(NO_CANDIDATES_MESSAGE);
        out.push('\n');
    } else {
        out.push_str("Candidates (lowest RSI first)\n");
        out.push_str(&format_screen_table(&report.candidates));
    }
    out.push_str(&format_skipped(&report.skipped));
    out
}

fn format_screen_table(results: &[ScreenResult]) -> String {
    let mut out = format!(
        "{:<14}  {:>10}  {:>10}  {:>10}  {:>6}  {:>7}  {:>9}  {:>7}  {:>6}\n",
        "Symbol", "Close", "EMA20", "EMA50", "RSI14", "Uptrend", "AboveEMA", "RSIBand", "Pass"
    );
    for r in results {
        out.push_str(&format!(
            "{:<14}  {:>10.2}  {:>10.2}  {:>10.2}  {:>6.2}  {:>7}  {:>9}  {:>7}  {:>6}\n",
            r.symbol,
            r.close,
            r.ema20,
            r.ema50,
            r.rsi14,
            r.uptrend,
            r.price_above_ema20,
            r.rsi_in_band,
            r.passes_screen
        ));
    }
    out
}

pub fn format_portfolio(report: &PortfolioReport) -> String {
    let mut out = String::from("Portfolio summary\n");
    out.push_str(&format_summary_table(&report.summary));
    out.push_str(&format_skipped(&report.skipped));
    out
}

fn format_summary_table(rows: &[PortfolioSummaryRow]) -> String {
    let mut out = format!(
        "{:<14}  {:>16}  {:>15}  {:>14}  {:>7}\n",
        "Symbol", "Cumulative Ret %", "Annual Return %", "Annual Vol %", "Sharpe"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<14}  {:>16.2}  {:>15.2}  {:>14}  {:>7}\n",
            row.symbol,
            row.cumulative_return_pct,
            row.annual_return_pct,
            fmt_opt(row.annual_vol_pct),
            fmt_opt(row.sharpe)
        ));
    }
    out
}

fn format_skipped(skipped: &[SkippedSymbol]) -> String {
    if skipped.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nSkipped\n");
    for s in skipped {
        out.push_str(&format!("  {}: {}\n", s.symbol, s.reason));
    }
    out
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{:.2}", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::universe::SkipReason;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn screen_result(symbol: &str, rsi14: f64, passes: bool) -> ScreenResult {
        ScreenResult {
            symbol: symbol.into(),
            close: 105.0,
            ema20: 100.0,
            ema50: 95.0,
            rsi14,
            uptrend: true,
            price_above_ema20: true,
            rsi_in_band: passes,
            passes_screen: passes,
        }
    }

    #[test]
    fn backtest_without_trades_prints_message() {
        let report = BacktestReport {
            symbol: "GOLDBEES.NS".into(),
            signals: vec![],
            trades: vec![],
            summary: None,
        };
        let text = format_backtest(&report);
        assert!(text.contains("GOLDBEES.NS"));
        assert!(text.contains(NO_TRADES_MESSAGE));
        assert!(!text.contains("Total Trades"));
    }

    #[test]
    fn backtest_with_trades_prints_summary() {
        let trade = Trade {
            entry_date: date("2024-03-01"),
            entry_price: 50.0,
            exit_date: date("2024-03-15"),
            exit_price: 55.0,
            return_pct: 10.0,
            forced_exit: false,
        };
        let report = BacktestReport {
            symbol: "GOLDBEES.NS".into(),
            signals: vec![],
            trades: vec![trade],
            summary: Some(TradeSummary {
                count: 1,
                mean_return_pct: 10.0,
                total_return_pct: 10.0,
            }),
        };
        let text = format_backtest(&report);
        assert!(text.contains("2024-03-01"));
        assert!(text.contains("2024-03-15"));
        assert!(text.contains("Total Trades: 1"));
        assert!(text.contains("Average Return: 10.00%"));
        assert!(text.contains("Total Return: 10.00%"));
    }

    #[test]
    fn forced_exit_is_marked() {
        let trade = Trade {
            entry_date: date("2024-03-01"),
            entry_price: 50.0,
            exit_date: date("2024-03-04"),
            exit_price: 45.0,
            return_pct: -10.0,
            forced_exit: true,
        };
        let text = format_trades_table(&[trade]);
        assert!(text.contains("open at end"));
        assert!(text.contains("-10.00"));
    }

    #[test]
    fn screen_without_candidates() {
        let report = ScreenReport {
            results: vec![screen_result("TCS.NS", 75.0, false)],
            candidates: vec![],
            skipped: vec![],
        };
        let text = format_screen(&report);
        assert!(text.contains("TCS.NS"));
        assert!(text.contains(NO_CANDIDATES_MESSAGE));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn screen_lists_candidates_and_skips() {
        let pass = screen_result("INFY.NS", 60.0, true);
        let report = ScreenReport {
            results: vec![pass.clone()],
            candidates: vec![pass],
            skipped: vec![SkippedSymbol {
                symbol: "BAD.NS".into(),
                reason: SkipReason::NoData,
            }],
        };
        let text = format_screen(&report);
        assert!(text.contains("Candidates"));
        assert!(!text.contains(NO_CANDIDATES_MESSAGE));
        assert!(text.contains("BAD.NS: no data"));
    }

    #[test]
    fn undefined_metrics_print_as_nan() {
        let rows = vec![PortfolioSummaryRow {
            symbol: "FLAT".into(),
            cumulative_return_pct: 0.0,
            annual_return_pct: 0.0,
            annual_vol_pct: Some(0.0),
            sharpe: None,
        }];
        let text = format_summary_table(&rows);
        assert!(text.contains("FLAT"));
        assert!(text.contains("NaN"));
        assert!(text.contains("0.00"));
    }
}
