//! Configuration validation.
//!
//! Validates every config field before a run starts, so failures surface as
//! config errors rather than mid-pipeline faults.

use crate::domain::error::CrossmomError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), CrossmomError> {
    validate_data_config(config)?;
    validate_signal_config(config)?;
    validate_portfolio_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), CrossmomError> {
    match config.get_string("data", "prices") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(CrossmomError::ConfigMissing {
                section: "data".to_string(),
                key: "prices".to_string(),
            });
        }
    }

    match config.get_string("data", "assets") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(CrossmomError::ConfigMissing {
                section: "data".to_string(),
                key: "assets".to_string(),
            });
        }
    }

    validate_dates(config)
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), CrossmomError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(CrossmomError::ConfigInvalid {
                section: "data".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}

fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, CrossmomError> {
    match config.get_string("data", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map(Some).map_err(|_| {
            CrossmomError::ConfigInvalid {
                section: "data".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            }
        }),
    }
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), CrossmomError> {
    let windows_str = config
        .get_string("signal", "momentum_windows")
        .unwrap_or_else(|| "7,14,30".to_string());
    let windows = parse_window_list(&windows_str).map_err(|reason| {
        CrossmomError::ConfigInvalid {
            section: "signal".to_string(),
            key: "momentum_windows".to_string(),
            reason,
        }
    })?;
    if windows.is_empty() {
        return Err(CrossmomError::ConfigInvalid {
            section: "signal".to_string(),
            key: "momentum_windows".to_string(),
            reason: "at least one momentum window is required".to_string(),
        });
    }

    let vol_window = config.get_int("signal", "vol_window", 20);
    if vol_window < 2 {
        return Err(CrossmomError::ConfigInvalid {
            section: "signal".to_string(),
            key: "vol_window".to_string(),
            reason: "vol_window must be at least 2".to_string(),
        });
    }

    let clip = config.get_double("signal", "score_clip", 5.0);
    if clip <= 0.0 {
        return Err(CrossmomError::ConfigInvalid {
            section: "signal".to_string(),
            key: "score_clip".to_string(),
            reason: "score_clip must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), CrossmomError> {
    let exposure = config.get_double("portfolio", "exposure", 0.5);
    if exposure <= 0.0 || exposure > 1.0 {
        return Err(CrossmomError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "exposure".to_string(),
            reason: "exposure must be in (0, 1]".to_string(),
        });
    }

    let multiplier = config.get_double("portfolio", "regime_multiplier", 0.5);
    if multiplier <= 0.0 || multiplier > 1.0 {
        return Err(CrossmomError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "regime_multiplier".to_string(),
            reason: "regime_multiplier must be in (0, 1]".to_string(),
        });
    }

    let percentile = config.get_double("portfolio", "regime_percentile", 0.75);
    if percentile <= 0.0 || percentile >= 1.0 {
        return Err(CrossmomError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "regime_percentile".to_string(),
            reason: "regime_percentile must be strictly between 0 and 1".to_string(),
        });
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), CrossmomError> {
    let interval = config.get_int("backtest", "rebalance_interval", 5);
    if interval < 1 {
        return Err(CrossmomError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "rebalance_interval".to_string(),
            reason: "rebalance_interval must be at least 1".to_string(),
        });
    }

    let cost = config.get_double("backtest", "cost_per_turnover", 0.001);
    if cost < 0.0 {
        return Err(CrossmomError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "cost_per_turnover".to_string(),
            reason: "cost_per_turnover must be non-negative".to_string(),
        });
    }
    Ok(())
}

/// Parse a comma-separated list of window lengths.
pub fn parse_window_list(input: &str) -> Result<Vec<usize>, String> {
    input
        .split(',')
        .map(|token| {
            let trimmed = token.trim();
            match trimmed.parse::<usize>() {
                Ok(w) if w >= 1 => Ok(w),
                Ok(_) => Err(format!("window '{trimmed}' must be at least 1")),
                Err(_) => Err(format!("invalid window '{trimmed}'")),
            }
        })
        .collect()
}
