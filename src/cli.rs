//! CLI definition and dispatch.
//!
//! Strategy settings are merged with precedence: command-line flag, then
//! the INI file given by `--config`, then the built-in default.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::console_report;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::comparison::{best_by_return, run_comparison};
use crate::domain::config_validation::{validate_strategy_config, STRATEGY_SECTION};
use crate::domain::error::CrossbtError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const REPORT_SECTION: &str = "report";
pub const DEFAULT_OUTPUT: &str = "results.csv";

#[derive(Parser, Debug)]
#[command(
    name = "crossbt",
    version,
    about = "Moving-average crossover backtester for daily price bars"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a CSV file of daily bars
    Backtest(BacktestArgs),
    /// Validate a strategy configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct BacktestArgs {
    /// CSV file with Date,Open,High,Low,Close,Adj Close,Volume columns
    pub data: PathBuf,
    /// Short moving-average period [default: 50]
    #[arg(long)]
    pub short: Option<usize>,
    /// Long moving-average period [default: 200]
    #[arg(long)]
    pub long: Option<usize>,
    /// Initial capital [default: 100000]
    #[arg(long)]
    pub capital: Option<f64>,
    /// Enable the RSI overbought filter
    #[arg(long)]
    pub rsi: bool,
    /// Use EMA instead of SMA for the crossover
    #[arg(long)]
    pub ema: bool,
    /// Require a positive MACD histogram to enter
    #[arg(long)]
    pub macd: bool,
    /// Reject entries above the upper Bollinger band
    #[arg(long)]
    pub bollinger: bool,
    /// Stop loss as a fraction, e.g. 0.05 for 5%
    #[arg(long)]
    pub stoploss: Option<f64>,
    /// Take profit as a fraction, e.g. 0.15 for 15%
    #[arg(long)]
    pub takeprofit: Option<f64>,
    /// Commission rate [default: 0.001]
    #[arg(long)]
    pub commission: Option<f64>,
    /// Size positions with half-Kelly once 5 trades have closed
    #[arg(long)]
    pub kelly: bool,
    /// Also run the preset strategy comparison
    #[arg(long)]
    pub compare: bool,
    /// Report file [default: results.csv]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// INI file with [strategy] and [report] sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(&e)
        }
    }
}

/// Dispatch a parsed command line.
pub fn execute(cli: Cli) -> Result<(), CrossbtError> {
    match cli.command {
        Command::Backtest(args) => run_backtest_command(&args),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, CrossbtError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn read_period(
    adapter: &dyn ConfigPort,
    key: &str,
    current: usize,
) -> Result<usize, CrossbtError> {
    let value = adapter.get_int(STRATEGY_SECTION, key, current as i64);
    usize::try_from(value).map_err(|_| CrossbtError::ConfigInvalid {
        section: STRATEGY_SECTION.to_string(),
        key: key.to_string(),
        reason: format!("{key} must be positive, got {value}"),
    })
}

/// Overlay `[strategy]` values from `adapter` onto `base`.
pub fn apply_config_port(
    base: StrategyConfig,
    adapter: &dyn ConfigPort,
) -> Result<StrategyConfig, CrossbtError> {
    let s = STRATEGY_SECTION;
    Ok(StrategyConfig {
        short_period: read_period(adapter, "short_period", base.short_period)?,
        long_period: read_period(adapter, "long_period", base.long_period)?,
        initial_capital: adapter.get_double(s, "initial_capital", base.initial_capital),
        use_rsi: adapter.get_bool(s, "use_rsi", base.use_rsi),
        use_ema: adapter.get_bool(s, "use_ema", base.use_ema),
        use_macd: adapter.get_bool(s, "use_macd", base.use_macd),
        use_bollinger: adapter.get_bool(s, "use_bollinger", base.use_bollinger),
        stop_loss_pct: adapter.get_double(s, "stop_loss", base.stop_loss_pct),
        take_profit_pct: adapter.get_double(s, "take_profit", base.take_profit_pct),
        commission_rate: adapter.get_double(s, "commission", base.commission_rate),
        use_kelly: adapter.get_bool(s, "use_kelly", base.use_kelly),
        rsi_period: read_period(adapter, "rsi_period", base.rsi_period)?,
        macd_fast: read_period(adapter, "macd_fast", base.macd_fast)?,
        macd_slow: read_period(adapter, "macd_slow", base.macd_slow)?,
        macd_signal: read_period(adapter, "macd_signal", base.macd_signal)?,
        bollinger_period: read_period(adapter, "bollinger_period", base.bollinger_period)?,
        bollinger_mult: adapter.get_double(s, "bollinger_mult", base.bollinger_mult),
    })
}

/// Overlay command-line flags onto `base`. Boolean flags only switch on.
pub fn apply_cli_overrides(base: StrategyConfig, args: &BacktestArgs) -> StrategyConfig {
    StrategyConfig {
        short_period: args.short.unwrap_or(base.short_period),
        long_period: args.long.unwrap_or(base.long_period),
        initial_capital: args.capital.unwrap_or(base.initial_capital),
        use_rsi: base.use_rsi || args.rsi,
        use_ema: base.use_ema || args.ema,
        use_macd: base.use_macd || args.macd,
        use_bollinger: base.use_bollinger || args.bollinger,
        stop_loss_pct: args.stoploss.unwrap_or(base.stop_loss_pct),
        take_profit_pct: args.takeprofit.unwrap_or(base.take_profit_pct),
        commission_rate: args.commission.unwrap_or(base.commission_rate),
        use_kelly: base.use_kelly || args.kelly,
        ..base
    }
}

/// Merge defaults, the optional INI file and the flags, then validate.
pub fn build_strategy_config(
    args: &BacktestArgs,
    adapter: Option<&dyn ConfigPort>,
) -> Result<StrategyConfig, CrossbtError> {
    let mut config = StrategyConfig::default();
    if let Some(adapter) = adapter {
        config = apply_config_port(config, adapter)?;
    }
    let config = apply_cli_overrides(config, args);
    validate_strategy_config(&config)?;
    Ok(config)
}

pub fn resolve_output_path(args: &BacktestArgs, adapter: Option<&dyn ConfigPort>) -> PathBuf {
    args.output
        .clone()
        .or_else(|| {
            adapter
                .and_then(|a| a.get_string(REPORT_SECTION, "output"))
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

pub fn run_backtest_command(args: &BacktestArgs) -> Result<(), CrossbtError> {
    let adapter = args.config.as_deref().map(load_config).transpose()?;
    let port = adapter.as_ref().map(|a| a as &dyn ConfigPort);

    let config = build_strategy_config(args, port)?;
    let output = resolve_output_path(args, port);

    let data_port = CsvAdapter::new(&args.data);
    let report_port = CsvReportAdapter::new();
    run_backtest_pipeline(&data_port, &report_port, &config, &output, args.compare)?;
    Ok(())
}

/// Everything after configuration: load, compare, simulate, report.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    config: &StrategyConfig,
    output: &Path,
    compare: bool,
) -> Result<(BacktestResult, Metrics), CrossbtError> {
    let source = data_port.source_name();
    let bars = data_port.fetch_bars()?;
    if bars.is_empty() {
        return Err(CrossbtError::EmptyData { path: source });
    }
    info!(source = %source, bars = bars.len(), "loaded price data");

    print!("{}", console_report::format_run_header(config, &source, &bars));

    if compare {
        let rows = run_comparison(&bars, config.initial_capital);
        print!("{}", console_report::format_comparison_table(&rows));
        if let Some(best) = best_by_return(&rows) {
            println!("Best by return: {}", best.label());
        }
    }

    let result = run_backtest(&bars, config);
    let metrics = Metrics::compute(&bars, &result, config.initial_capital);
    print!("{}", console_report::format_summary(&metrics));

    report_port.write(&result, &metrics, output)?;
    println!("\nResults exported to {}", output.display());

    Ok((result, metrics))
}

pub fn run_validate(config_path: &Path) -> Result<(), CrossbtError> {
    let adapter = load_config(config_path)?;
    let config = apply_config_port(StrategyConfig::default(), &adapter)?;
    validate_strategy_config(&config)?;

    println!("Config validated successfully");
    println!("  strategy: {}", config.label());
    for indicator in config.active_indicators() {
        println!("  indicator: {}", indicator);
    }
    println!("  warm-up bars: {}", config.warmup_index());
    Ok(())
}
