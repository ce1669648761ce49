//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::config_validation::{parse_window_list, validate_run_config};
use crate::domain::error::CrossmomError;
use crate::domain::metrics::{drawdown_series, Metrics};
use crate::domain::returns::log_returns;
use crate::domain::signal::{score_panel, volatility_panel, SignalConfig};
use crate::domain::universe::{parse_assets, Universe};
use crate::domain::weights::{weight_panel, WeightConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "crossmom", about = "Cross-sectional momentum backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the signal-to-backtest pipeline
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        assets: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show asset coverage of a price file
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            output,
            assets,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest_command(&config, output.as_ref(), assets.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CrossmomError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_signal_config(config: &dyn ConfigPort) -> Result<SignalConfig, CrossmomError> {
    let windows_str = config
        .get_string("signal", "momentum_windows")
        .unwrap_or_else(|| "7,14,30".to_string());
    let momentum_windows =
        parse_window_list(&windows_str).map_err(|reason| CrossmomError::ConfigInvalid {
            section: "signal".into(),
            key: "momentum_windows".into(),
            reason,
        })?;

    Ok(SignalConfig {
        momentum_windows,
        vol_window: config.get_int("signal", "vol_window", 20) as usize,
        score_clip: config.get_double("signal", "score_clip", 5.0),
    })
}

pub fn build_weight_config(config: &dyn ConfigPort) -> WeightConfig {
    WeightConfig {
        exposure: config.get_double("portfolio", "exposure", 0.5),
        regime_multiplier: config.get_double("portfolio", "regime_multiplier", 0.5),
        regime_percentile: config.get_double("portfolio", "regime_percentile", 0.75),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        rebalance_interval: config.get_int("backtest", "rebalance_interval", 5) as usize,
        cost_per_turnover: config.get_double("backtest", "cost_per_turnover", 0.001),
    }
}

pub fn resolve_universe(
    assets_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Universe, CrossmomError> {
    let list = match assets_override {
        Some(s) => s.to_string(),
        None => config.get_string("data", "assets").ok_or_else(|| {
            CrossmomError::ConfigMissing {
                section: "data".into(),
                key: "assets".into(),
            }
        })?,
    };

    let assets = parse_assets(&list).map_err(|e| CrossmomError::ConfigInvalid {
        section: "data".into(),
        key: "assets".into(),
        reason: e.to_string(),
    })?;
    Ok(Universe { assets })
}

fn configured_date(config: &dyn ConfigPort, key: &str) -> Option<NaiveDate> {
    config
        .get_string("data", key)
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn run_backtest_command(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    assets_override: Option<&str>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_run_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Resolve universe and parameters
    let universe = match resolve_universe(assets_override, &adapter) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let signal_config = match build_signal_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let weight_config = build_weight_config(&adapter);
    let backtest_config = build_backtest_config(&adapter);
    let start_date = configured_date(&adapter, "start_date");
    let end_date = configured_date(&adapter, "end_date");

    let prices_path = adapter
        .get_string("data", "prices")
        .map(PathBuf::from)
        .unwrap_or_default();
    let data_port = CsvPriceAdapter::new(prices_path);

    let output = output_path.cloned().unwrap_or_else(|| {
        adapter
            .get_string("report", "output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("equity_curve.csv"))
    });

    run_pipeline(
        &data_port,
        &universe.assets,
        start_date,
        end_date,
        &signal_config,
        &weight_config,
        &backtest_config,
        &output,
    )
}

/// The full pipeline: prices -> returns -> score -> weights -> equity -> metrics.
#[allow(clippy::too_many_arguments)]
pub fn run_pipeline(
    data_port: &dyn DataPort,
    assets: &[String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    signal_config: &SignalConfig,
    weight_config: &WeightConfig,
    backtest_config: &BacktestConfig,
    output_path: &std::path::Path,
) -> ExitCode {
    match run_pipeline_inner(
        data_port,
        assets,
        start_date,
        end_date,
        signal_config,
        weight_config,
        backtest_config,
        output_path,
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_pipeline_inner(
    data_port: &dyn DataPort,
    assets: &[String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    signal_config: &SignalConfig,
    weight_config: &WeightConfig,
    backtest_config: &BacktestConfig,
    output_path: &std::path::Path,
) -> Result<(), CrossmomError> {
    // Stage 3: Fetch and align prices
    eprintln!("Fetching prices for {} assets...", assets.len());
    let raw_prices = data_port.fetch_prices(assets, start_date, end_date)?;
    let prices = raw_prices.drop_incomplete_rows();
    eprintln!(
        "  {} rows ({} dropped for missing prices)",
        prices.n_rows(),
        raw_prices.n_rows() - prices.n_rows()
    );

    // Stages 4-6: Returns, score, weights
    let returns = log_returns(&prices)?;
    let scores = score_panel(&returns, signal_config)?;
    let vol = volatility_panel(&returns, signal_config.vol_window)?;
    let weights = weight_panel(&scores, &vol, weight_config)?;

    // Stage 7: Simulate
    eprintln!(
        "Running backtest: {} dates, rebalance every {} days",
        returns.n_rows(),
        backtest_config.rebalance_interval
    );
    let result = run_backtest(&weights, &returns, backtest_config)?;

    // Stage 8: Metrics
    let metrics = Metrics::compute(&result, &weights, backtest_config);
    let drawdown = drawdown_series(&result.equity_curve);

    eprintln!("\n=== Results ===");
    eprintln!("Final Equity:     {:.4}", metrics.final_equity);
    eprintln!("Sharpe:           {:.2}", metrics.sharpe);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_drawdown * 100.0);
    eprintln!("Skew:             {:.3}", metrics.skewness);
    eprintln!("Kurtosis:         {:.3}", metrics.excess_kurtosis);
    eprintln!("Average Turnover: {:.4}", metrics.avg_turnover);

    // Stage 9: Report for the charting collaborator
    CsvReportAdapter.write(&result, &drawdown, &metrics, output_path)?;
    eprintln!("\nEquity curve written to: {}", output_path.display());
    Ok(())
}

fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_run_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let universe = match resolve_universe(None, &adapter) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let signal_config = match build_signal_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let weight_config = build_weight_config(&adapter);
    let backtest_config = build_backtest_config(&adapter);

    eprintln!(
        "\nUniverse: {} ({} assets)",
        universe.assets.join(", "),
        universe.count()
    );
    eprintln!(
        "Signal: momentum windows {:?}, vol window {}, clip ±{}",
        signal_config.momentum_windows, signal_config.vol_window, signal_config.score_clip
    );
    eprintln!(
        "Portfolio: exposure {}, regime multiplier {} above the {:.0}th percentile",
        weight_config.exposure,
        weight_config.regime_multiplier,
        weight_config.regime_percentile * 100.0
    );
    eprintln!(
        "Backtest: rebalance every {} days, cost {} per unit turnover",
        backtest_config.rebalance_interval, backtest_config.cost_per_turnover
    );

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_run_config(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let prices_path = match adapter.get_string("data", "prices") {
        Some(p) => PathBuf::from(p),
        None => {
            let err = CrossmomError::ConfigMissing {
                section: "data".into(),
                key: "prices".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    let port = CsvPriceAdapter::new(prices_path.clone());
    let assets = match port.list_assets() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("{}: {} assets", prices_path.display(), assets.len());
    match port.fetch_prices(&assets, None, None) {
        Ok(panel) if panel.n_rows() > 0 => {
            let aligned = panel.drop_incomplete_rows();
            println!(
                "{} rows, {} to {}, {} fully aligned",
                panel.n_rows(),
                panel.date(0),
                panel.date(panel.n_rows() - 1),
                aligned.n_rows()
            );
        }
        Ok(_) => println!("no price rows found"),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }
    for asset in &assets {
        println!("{asset}");
    }
    ExitCode::SUCCESS
}
