//! Per-symbol risk and return statistics.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummaryRow {
    pub symbol: String,
    pub cumulative_return_pct: f64,
    pub annual_return_pct: f64,
    /// `None` with fewer than two returns.
    pub annual_vol_pct: Option<f64>,
    /// `None` when daily volatility is zero or undefined.
    pub sharpe: Option<f64>,
}

/// Spread below this fraction of the mean magnitude is rounding noise.
const NEGLIGIBLE_SPREAD: f64 = 1e-9;

/// Daily rate that compounds to `annual_rate` over a trading year.
pub fn daily_risk_free(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / TRADING_DAYS_PER_YEAR) - 1.0
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1). Values equal up to rounding give
/// exactly zero.
pub fn sample_stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    let stdev = variance.sqrt();
    if stdev <= NEGLIGIBLE_SPREAD * m.abs().max(NEGLIGIBLE_SPREAD) {
        return Some(0.0);
    }
    Some(stdev)
}

pub fn cumulative_return(returns: &[f64]) -> f64 {
    returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
}

/// `None` when there are no returns to summarize.
pub fn summarize_returns(
    symbol: &str,
    returns: &[f64],
    annual_risk_free: f64,
) -> Option<PortfolioSummaryRow> {
    let avg = mean(returns)?;
    let daily_vol = sample_stdev(returns);
    let annual_return = (1.0 + avg).powf(TRADING_DAYS_PER_YEAR) - 1.0;

    let sharpe = daily_vol.filter(|v| *v > 0.0).map(|vol| {
        let excess = avg - daily_risk_free(annual_risk_free);
        excess / vol * TRADING_DAYS_PER_YEAR.sqrt()
    });

    Some(PortfolioSummaryRow {
        symbol: symbol.to_string(),
        cumulative_return_pct: cumulative_return(returns) * 100.0,
        annual_return_pct: annual_return * 100.0,
        annual_vol_pct: daily_vol.map(|v| v * TRADING_DAYS_PER_YEAR.sqrt() * 100.0),
        sharpe,
    })
}
