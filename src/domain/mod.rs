//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_rows;
pub mod signal;
pub mod trade_tracker;
pub mod screener;
pub mod metrics;
pub mod price_table;
pub mod window;
pub mod universe;
pub mod report;
pub mod settings;
pub mod config_validation;
pub mod error;
