//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::chart_svg::SvgChartReport;
use crate::adapters::console_report::ConsoleReport;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export::CsvExport;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    DEFAULT_PORTFOLIO_PERIOD, DEFAULT_SCREENER_PERIOD, parse_date_range, parse_interval,
    parse_period, parse_risk_free_rate, parse_single_symbol, parse_symbol_list,
    validate_backtest_config, validate_portfolio_config, validate_screener_config,
};
use crate::domain::error::TrendscopeError;
use crate::domain::settings::{BacktestSettings, PortfolioSettings, ReportSettings, ScreenSettings};
use crate::domain::universe::parse_symbols;
use crate::domain::window::{DataWindow, FetchRequest, Period};
use crate::pipeline;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(
    name = "trendscope",
    about = "EMA/RSI trend backtest, stock screener and portfolio risk dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the EMA20/EMA50 + RSI entry rule on one symbol
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Replaces `[backtest] symbol`
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        no_charts: bool,
    },
    /// Screen a list of symbols on their latest bar
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma separated, replaces `[screener] symbols`
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Per-symbol risk metrics, equity curves and correlations
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma separated, replaces `[portfolio] symbols`
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory for the CSV exports, replaces `[portfolio] output_dir`
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        no_charts: bool,
    },
    /// Validate every pipeline section present in a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            data_dir,
            no_charts,
        } => with_config(&config, |adapter| {
            run_backtest(adapter, symbol.as_deref(), data_dir.as_deref(), no_charts)
        }),
        Command::Screen {
            config,
            symbols,
            data_dir,
        } => with_config(&config, |adapter| {
            run_screen(adapter, symbols.as_deref(), data_dir.as_deref())
        }),
        Command::Portfolio {
            config,
            symbols,
            data_dir,
            output,
            no_charts,
        } => with_config(&config, |adapter| {
            run_portfolio(
                adapter,
                symbols.as_deref(),
                data_dir.as_deref(),
                output.as_deref(),
                no_charts,
            )
        }),
        Command::Validate { config } => with_config(&config, run_validate),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TrendscopeError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| TrendscopeError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn with_config<F>(path: &Path, body: F) -> ExitCode
where
    F: FnOnce(&FileConfigAdapter) -> Result<(), TrendscopeError>,
{
    match load_config(path).and_then(|adapter| body(&adapter)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

fn run_backtest(
    config: &dyn ConfigPort,
    symbol: Option<&str>,
    data_dir: Option<&Path>,
    no_charts: bool,
) -> Result<(), TrendscopeError> {
    let settings = build_backtest_settings(config, symbol)?;
    let reports = build_report_settings(config, no_charts);
    let data = CsvAdapter::new(resolve_data_dir(config, data_dir));

    let report = pipeline::run_backtest(&data, &settings)?;

    let console = ConsoleReport::new();
    let charts = SvgChartReport::new(reports.chart_dir.clone());
    let mut writers: Vec<&dyn ReportPort> = vec![&console];
    if reports.charts {
        writers.push(&charts);
    }
    pipeline::publish(&writers, |w| w.write_backtest(&report))
}

fn run_screen(
    config: &dyn ConfigPort,
    symbols: Option<&str>,
    data_dir: Option<&Path>,
) -> Result<(), TrendscopeError> {
    let settings = build_screen_settings(config, symbols)?;
    let data = CsvAdapter::new(resolve_data_dir(config, data_dir));

    let report = pipeline::run_screen(&data, &settings)?;
    ConsoleReport::new().write_screen(&report)
}

fn run_portfolio(
    config: &dyn ConfigPort,
    symbols: Option<&str>,
    data_dir: Option<&Path>,
    output: Option<&Path>,
    no_charts: bool,
) -> Result<(), TrendscopeError> {
    let settings = build_portfolio_settings(config, symbols, output)?;
    let reports = build_report_settings(config, no_charts);
    let data = CsvAdapter::new(resolve_data_dir(config, data_dir));

    let report = pipeline::run_portfolio(&data, &settings)?;

    let console = ConsoleReport::new();
    let export = CsvExport::new(settings.output_dir.clone());
    let charts = SvgChartReport::new(reports.chart_dir.clone());
    let mut writers: Vec<&dyn ReportPort> = vec![&console, &export];
    if reports.charts {
        writers.push(&charts);
    }
    pipeline::publish(&writers, |w| w.write_portfolio(&report))
}

fn run_validate(config: &FileConfigAdapter) -> Result<(), TrendscopeError> {
    let mut checked = 0;
    if config.has_section("backtest") {
        validate_backtest_config(config)?;
        checked += 1;
    }
    if config.has_section("screener") {
        validate_screener_config(config)?;
        checked += 1;
    }
    if config.has_section("portfolio") {
        validate_portfolio_config(config)?;
        checked += 1;
    }
    if checked == 0 {
        return Err(TrendscopeError::ConfigMissing {
            section: "backtest|screener|portfolio".to_string(),
            key: "symbol(s)".to_string(),
        });
    }
    info!(sections = checked, "config validated successfully");
    Ok(())
}

fn cli_invalid(key: &str, reason: String) -> TrendscopeError {
    TrendscopeError::ConfigInvalid {
        section: "command line".to_string(),
        key: key.to_string(),
        reason,
    }
}

fn cli_symbols(raw: &str) -> Result<Vec<String>, TrendscopeError> {
    parse_symbols(raw).map_err(|e| cli_invalid("symbols", e.to_string()))
}

pub fn build_backtest_settings(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<BacktestSettings, TrendscopeError> {
    let symbol = match symbol_override {
        Some(raw) => match parse_symbols(raw) {
            Ok(mut one) if one.len() == 1 => one.remove(0),
            Ok(_) => return Err(cli_invalid("symbol", "expected a single symbol".to_string())),
            Err(e) => return Err(cli_invalid("symbol", e.to_string())),
        },
        None => parse_single_symbol(config, "backtest")?,
    };
    let (start, end) = parse_date_range(config, "backtest")?;
    Ok(BacktestSettings {
        symbol,
        request: FetchRequest {
            window: DataWindow::Range { start, end },
            interval: parse_interval(config, "backtest")?,
        },
    })
}

fn lookback_request(
    config: &dyn ConfigPort,
    section: &str,
    default: Period,
) -> Result<FetchRequest, TrendscopeError> {
    Ok(FetchRequest {
        window: DataWindow::Lookback(parse_period(config, section, default)?),
        interval: parse_interval(config, section)?,
    })
}

pub fn build_screen_settings(
    config: &dyn ConfigPort,
    symbols_override: Option<&str>,
) -> Result<ScreenSettings, TrendscopeError> {
    let symbols = match symbols_override {
        Some(raw) => cli_symbols(raw)?,
        None => parse_symbol_list(config, "screener")?,
    };
    Ok(ScreenSettings {
        symbols,
        request: lookback_request(config, "screener", DEFAULT_SCREENER_PERIOD)?,
    })
}

pub fn build_portfolio_settings(
    config: &dyn ConfigPort,
    symbols_override: Option<&str>,
    output_override: Option<&Path>,
) -> Result<PortfolioSettings, TrendscopeError> {
    let symbols = match symbols_override {
        Some(raw) => cli_symbols(raw)?,
        None => parse_symbol_list(config, "portfolio")?,
    };
    let output_dir = output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_non_empty("portfolio", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(PortfolioSettings {
        symbols,
        request: lookback_request(config, "portfolio", DEFAULT_PORTFOLIO_PERIOD)?,
        risk_free_rate: parse_risk_free_rate(config)?,
        output_dir,
    })
}

pub fn build_report_settings(config: &dyn ConfigPort, no_charts: bool) -> ReportSettings {
    let defaults = ReportSettings::default();
    ReportSettings {
        charts: !no_charts && config.get_bool("report", "charts", defaults.charts),
        chart_dir: config
            .get_non_empty("report", "chart_dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.chart_dir),
    }
}

pub fn resolve_data_dir(config: &dyn ConfigPort, data_dir_override: Option<&Path>) -> PathBuf {
    data_dir_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_non_empty("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
