//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{render_summary, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{validate_backtest_config, validate_data_config};
use crate::domain::engine::{self, BacktestConfig};
use crate::domain::error::PairtraderError;
use crate::domain::series::MarketSeries;
use crate::domain::signal::DirectionPolicy;
use crate::domain::stats::BacktestStats;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "pairtrader", about = "AMZN/WMT pairs-trading backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Blotter CSV destination (default blotter.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        period: Option<usize>,
        #[arg(long)]
        lot_value: Option<f64>,
        #[arg(long)]
        gain_cap: Option<f64>,
        #[arg(long)]
        include_risk_free: bool,
        #[arg(long)]
        holding_period_cap: Option<u32>,
        #[arg(long)]
        policy: Option<DirectionPolicy>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the date range of the configured history
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// CLI flags layered over the config file's `[backtest]` section.
#[derive(Debug, Default, Clone)]
pub struct BacktestOverrides {
    pub period: Option<usize>,
    pub lot_value: Option<f64>,
    pub gain_cap: Option<f64>,
    pub include_risk_free: bool,
    pub holding_period_cap: Option<u32>,
    pub policy: Option<DirectionPolicy>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            period,
            lot_value,
            gain_cap,
            include_risk_free,
            holding_period_cap,
            policy,
            dry_run,
        } => {
            let overrides = BacktestOverrides {
                period,
                lot_value,
                gain_cap,
                include_risk_free,
                holding_period_cap,
                policy,
            };
            run_backtest_command(&config, output.as_ref(), &overrides, dry_run)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PairtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Read the `[backtest]` section with the built-in defaults for anything
/// absent.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, PairtraderError> {
    let defaults = BacktestConfig::default();

    let direction_policy = match adapter.get_string("backtest", "direction_policy") {
        Some(s) if !s.trim().is_empty() => {
            s.parse()
                .map_err(|reason| PairtraderError::ConfigInvalid {
                    section: "backtest".to_string(),
                    key: "direction_policy".to_string(),
                    reason,
                })?
        }
        _ => defaults.direction_policy,
    };

    Ok(BacktestConfig {
        period: adapter
            .get_int("backtest", "period", defaults.period as i64)
            .max(0) as usize,
        lot_value: adapter.get_double("backtest", "lot_value", defaults.lot_value),
        gain_cap: adapter.get_double("backtest", "gain_cap", defaults.gain_cap),
        include_risk_free: adapter.get_bool(
            "backtest",
            "include_risk_free",
            defaults.include_risk_free,
        ),
        holding_period_cap_days: adapter
            .get_int(
                "backtest",
                "holding_period_cap",
                defaults.holding_period_cap_days as i64,
            )
            .max(0) as u32,
        direction_policy,
    })
}

pub fn apply_overrides(config: BacktestConfig, overrides: &BacktestOverrides) -> BacktestConfig {
    BacktestConfig {
        period: overrides.period.unwrap_or(config.period),
        lot_value: overrides.lot_value.unwrap_or(config.lot_value),
        gain_cap: overrides.gain_cap.unwrap_or(config.gain_cap),
        include_risk_free: config.include_risk_free || overrides.include_risk_free,
        holding_period_cap_days: overrides
            .holding_period_cap
            .unwrap_or(config.holding_period_cap_days),
        direction_policy: overrides.policy.unwrap_or(config.direction_policy),
    }
}

fn print_parameters(config: &BacktestConfig) {
    eprintln!("Parameters:");
    eprintln!("  period:             {}", config.period);
    eprintln!("  lot_value:          {}", config.lot_value);
    eprintln!("  gain_cap:           {}", config.gain_cap);
    eprintln!("  include_risk_free:  {}", config.include_risk_free);
    eprintln!("  holding_period_cap: {}", config.holding_period_cap_days);
    eprintln!("  direction_policy:   {}", config.direction_policy);
}

fn run_backtest_command(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    overrides: &BacktestOverrides,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Resolve parameters (file values + CLI overrides) and validate
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => apply_overrides(c, overrides),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = validate_backtest_config(&bt_config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    if dry_run {
        print_parameters(&bt_config);
        eprintln!("\nDry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    // Stage 3: Load history
    let data_port = match CsvAdapter::from_config(&adapter) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let bars = match data_port.fetch_history() {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if bars.is_empty() {
        eprintln!("error: history contains no bars");
        return ExitCode::from(3);
    }

    // Stage 4: Build series and run the engine
    let series = MarketSeries::new(bars, bt_config.period);
    if let Some((first, last, count)) = series.data_range() {
        eprintln!("Running backtest: {} to {} ({} bars)", first, last, count);
    }
    let blotter = engine::run_backtest(&series, &bt_config);
    eprintln!("  {} trade records generated", blotter.len());

    // Stage 5: Compute stats and print the summary
    let stats = BacktestStats::compute(&series, &blotter);
    eprintln!();
    eprintln!("{}", render_summary(&stats));

    // Stage 6: Write the blotter
    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("blotter.csv"));
    let report = CsvReportAdapter;
    match report.write(&blotter, &stats, &output.to_string_lossy()) {
        Ok(()) => {
            eprintln!("\nBlotter written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = validate_backtest_config(&bt_config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    print_parameters(&bt_config);
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = match CsvAdapter::from_config(&adapter) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match data_port.data_range() {
        Ok(Some((first, last, count))) => {
            println!("history: {} bars, {} to {}", count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("history: no data found");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
