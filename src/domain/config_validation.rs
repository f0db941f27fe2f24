//! Configuration validation and typed field parsing.
//!
//! The `validate_*` functions check a whole section before a pipeline runs;
//! the `parse_*` helpers are shared with the CLI, which applies overrides
//! on top of the parsed values.

use chrono::NaiveDate;

use crate::domain::error::TrendscopeError;
use crate::domain::universe::parse_symbols;
use crate::domain::window::{BarInterval, Period};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SCREENER_PERIOD: Period = Period::Days(200);
pub const DEFAULT_PORTFOLIO_PERIOD: Period = Period::Years(1);

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TrendscopeError> {
    parse_single_symbol(config, "backtest")?;
    parse_date_range(config, "backtest")?;
    parse_interval(config, "backtest")?;
    Ok(())
}

pub fn validate_screener_config(config: &dyn ConfigPort) -> Result<(), TrendscopeError> {
    parse_symbol_list(config, "screener")?;
    parse_period(config, "screener", DEFAULT_SCREENER_PERIOD)?;
    parse_interval(config, "screener")?;
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), TrendscopeError> {
    parse_symbol_list(config, "portfolio")?;
    parse_period(config, "portfolio", DEFAULT_PORTFOLIO_PERIOD)?;
    parse_interval(config, "portfolio")?;
    parse_risk_free_rate(config)?;
    Ok(())
}

pub fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, TrendscopeError> {
    config
        .get_non_empty(section, key)
        .ok_or_else(|| TrendscopeError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

pub fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, TrendscopeError> {
    let raw = require(config, section, key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        invalid(
            section,
            key,
            &format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}

/// `start_date` and `end_date`, with the start strictly before the (exclusive) end.
pub fn parse_date_range(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<(NaiveDate, NaiveDate), TrendscopeError> {
    let start = parse_date(config, section, "start_date")?;
    let end = parse_date(config, section, "end_date")?;
    if start >= end {
        return Err(invalid(
            section,
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok((start, end))
}

pub fn parse_symbol_list(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<Vec<String>, TrendscopeError> {
    let raw = require(config, section, "symbols")?;
    parse_symbols(&raw).map_err(|e| invalid(section, "symbols", &e.to_string()))
}

/// `symbol` holding exactly one valid symbol, uppercased.
pub fn parse_single_symbol(config: &dyn ConfigPort, section: &str) -> Result<String, TrendscopeError> {
    let raw = require(config, section, "symbol")?;
    match parse_symbols(&raw) {
        Ok(mut one) if one.len() == 1 => Ok(one.remove(0)),
        Ok(_) => Err(invalid(section, "symbol", "expected a single symbol")),
        Err(e) => Err(invalid(section, "symbol", &e.to_string())),
    }
}

pub fn parse_period(
    config: &dyn ConfigPort,
    section: &str,
    default: Period,
) -> Result<Period, TrendscopeError> {
    match config.get_non_empty(section, "period") {
        None => Ok(default),
        Some(raw) => raw
            .parse::<Period>()
            .map_err(|e| invalid(section, "period", &e.to_string())),
    }
}

pub fn parse_interval(config: &dyn ConfigPort, section: &str) -> Result<BarInterval, TrendscopeError> {
    match config.get_non_empty(section, "interval") {
        None => Ok(BarInterval::Daily),
        Some(raw) => raw
            .parse::<BarInterval>()
            .map_err(|e| invalid(section, "interval", &e.to_string())),
    }
}

/// Annual rate as a fraction, `0.0` when absent.
pub fn parse_risk_free_rate(config: &dyn ConfigPort) -> Result<f64, TrendscopeError> {
    let Some(raw) = config.get_non_empty("portfolio", "risk_free_rate") else {
        return Ok(0.0);
    };
    let value = raw.parse::<f64>().map_err(|_| {
        invalid(
            "portfolio",
            "risk_free_rate",
            &format!("'{}' is not a number, expected a fraction like 0.065", raw),
        )
    })?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "portfolio",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(value)
}

fn invalid(section: &str, key: &str, reason: &str) -> TrendscopeError {
    TrendscopeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
