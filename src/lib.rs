//! trendscope: trend + momentum backtest, screener and portfolio dashboard.
//!
//! Hexagonal layout: pure computations in [`domain`], port traits in [`ports`],
//! concrete loaders and report writers in [`adapters`], pipeline wiring in
//! [`pipeline`] and argument handling in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod pipeline;
pub mod cli;
