//! CSV exports of the portfolio report.
//!
//! Writes `portfolio_summary.csv`, `daily_returns.csv` and `equity_curves.csv`
//! into the output directory, replacing files from earlier runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::domain::error::TrendscopeError;
use crate::domain::metrics::PortfolioSummaryRow;
use crate::domain::price_table::DateTable;
use crate::domain::report::PortfolioReport;
use crate::ports::report_port::ReportPort;

pub const SUMMARY_FILE: &str = "portfolio_summary.csv";
pub const RETURNS_FILE: &str = "daily_returns.csv";
pub const EQUITY_FILE: &str = "equity_curves.csv";

pub struct CsvExport {
    output_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct SummaryRecord<'a> {
    #[serde(rename = "Ticker")]
    ticker: &'a str,
    #[serde(rename = "CumulativeReturn_%")]
    cumulative_return: String,
    #[serde(rename = "AnnualReturn_%")]
    annual_return: String,
    #[serde(rename = "AnnualVol_%")]
    annual_vol: String,
    #[serde(rename = "Sharpe")]
    sharpe: String,
}

impl<'a> From<&'a PortfolioSummaryRow> for SummaryRecord<'a> {
    fn from(row: &'a PortfolioSummaryRow) -> Self {
        SummaryRecord {
            ticker: &row.symbol,
            cumulative_return: round2(Some(row.cumulative_return_pct)),
            annual_return: round2(Some(row.annual_return_pct)),
            annual_vol: round2(row.annual_vol_pct),
            sharpe: round2(row.sharpe),
        }
    }
}

fn round2(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => "NaN".to_string(),
    }
}

impl CsvExport {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.output_dir.join(file)
    }

    fn write_summary(&self, rows: &[PortfolioSummaryRow]) -> Result<(), TrendscopeError> {
        let mut wtr = csv::Writer::from_path(self.path(SUMMARY_FILE))?;
        for row in rows {
            wtr.serialize(SummaryRecord::from(row))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Date column followed by one column per symbol; gaps are left empty.
pub fn write_date_table(path: &Path, table: &DateTable) -> Result<(), TrendscopeError> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["Date".to_string()];
    header.extend(table.symbols.iter().cloned());
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvExport {
    fn write_portfolio(&self, report: &PortfolioReport) -> Result<(), TrendscopeError> {
        fs::create_dir_all(&self.output_dir)?;
        self.write_summary(&report.summary)?;
        write_date_table(&self.path(RETURNS_FILE), &report.returns)?;
        write_date_table(&self.path(EQUITY_FILE), &report.equity)?;
        info!(dir = %self.output_dir.display(), "saved summary, returns and equity curves");
        Ok(())
    }
}
