//! Symbol lists and per-symbol skip bookkeeping for the multi-symbol pipelines.

use std::collections::HashSet;
use std::fmt;

use crate::domain::error::TrendscopeError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid symbol '{0}': path separators and dot-only names are not allowed")]
    InvalidSymbol(String),
}

/// Symbols become file names, so they must not climb out of a directory.
fn is_file_safe(symbol: &str) -> bool {
    !symbol.contains(['/', '\\', '\0']) && !symbol.chars().all(|c| c == '.')
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !is_file_safe(&symbol) {
            return Err(UniverseError::InvalidSymbol(trimmed.to_string()));
        }
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientWarmup { bars: usize, minimum: usize },
    NoReturns,
    FetchFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::InsufficientWarmup { bars, minimum } => {
                write!(f, "only {} bars, need {} for indicator warm-up", bars, minimum)
            }
            SkipReason::NoReturns => write!(f, "no return data"),
            SkipReason::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
        }
    }
}

impl From<&TrendscopeError> for SkipReason {
    fn from(err: &TrendscopeError) -> Self {
        match err {
            TrendscopeError::NoData { .. } => SkipReason::NoData,
            TrendscopeError::InsufficientWarmup { bars, minimum, .. } => {
                SkipReason::InsufficientWarmup {
                    bars: *bars,
                    minimum: *minimum,
                }
            }
            TrendscopeError::Fetch { reason, .. } => SkipReason::FetchFailed(reason.clone()),
            other => SkipReason::FetchFailed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Outcome of processing one symbol: a value, or the reason it was left out.
pub type SymbolOutcome<T> = Result<T, SkippedSymbol>;

/// Successful values in input order, plus every skipped symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult<T> {
    pub ready: Vec<T>,
    pub skipped: Vec<SkippedSymbol>,
}

impl<T> ScanResult<T> {
    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }
}

impl<T> FromIterator<SymbolOutcome<T>> for ScanResult<T> {
    fn from_iter<I: IntoIterator<Item = SymbolOutcome<T>>>(iter: I) -> Self {
        let mut ready = Vec::new();
        let mut skipped = Vec::new();
        for outcome in iter {
            match outcome {
                Ok(value) => ready.push(value),
                Err(skip) => skipped.push(skip),
            }
        }
        ScanResult { ready, skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_symbols_basic() {
        let result = parse_symbols("TCS.NS, infy.ns ,SBIN.NS").unwrap();
        assert_eq!(result, vec!["TCS.NS", "INFY.NS", "SBIN.NS"]);
    }

    #[test]
    fn parse_symbols_empty_token() {
        assert!(matches!(
            parse_symbols("TCS.NS,,ITC.NS"),
            Err(UniverseError::EmptyToken)
        ));
    }

    #[test]
    fn parse_symbols_duplicate() {
        let result = parse_symbols("ITC.NS,LT.NS,itc.ns");
        assert!(matches!(result, Err(UniverseError::DuplicateSymbol(s)) if s == "ITC.NS"));
    }

    #[test]
    fn parse_symbols_rejects_paths() {
        for raw in ["../x", "data/TCS.NS", "..\\evil", "..", "."] {
            assert!(
                matches!(parse_symbols(raw), Err(UniverseError::InvalidSymbol(_))),
                "{raw} should be rejected"
            );
        }
        assert_eq!(parse_symbols("M&M.NS,^NSEI").unwrap(), vec!["M&M.NS", "^NSEI"]);
    }

    #[test]
    fn skip_reason_from_error() {
        let err = TrendscopeError::InsufficientWarmup {
            symbol: "LT.NS".into(),
            bars: 12,
            minimum: 50,
        };
        assert_eq!(
            SkipReason::from(&err),
            SkipReason::InsufficientWarmup {
                bars: 12,
                minimum: 50
            }
        );
        assert_eq!(
            SkipReason::from(&TrendscopeError::NoData {
                symbol: "LT.NS".into()
            }),
            SkipReason::NoData
        );
    }

    #[test]
    fn scan_result_partitions_outcomes() {
        let outcomes: Vec<SymbolOutcome<u32>> = vec![
            Ok(1),
            Err(SkippedSymbol {
                symbol: "B".into(),
                reason: SkipReason::NoData,
            }),
            Ok(3),
        ];
        let scan: ScanResult<u32> = outcomes.into_iter().collect();
        assert_eq!(scan.ready, vec![1, 3]);
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].symbol, "B");
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(
            SkipReason::InsufficientWarmup { bars: 3, minimum: 50 }.to_string(),
            "only 3 bars, need 50 for indicator warm-up"
        );
    }
}
