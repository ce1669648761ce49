//! Performance metrics over the simulator outputs.
//!
//! All functions are pure. Degenerate ratios (zero-variance returns) come
//! back as NaN rather than an error; a flat run is a legitimate result.

use super::backtest::{l1_distance, BacktestConfig, BacktestResult, EquityPoint};
use super::panel::Panel;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_equity: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
    pub avg_turnover: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult, weights: &Panel, config: &BacktestConfig) -> Self {
        let returns = daily_returns(&result.equity_curve);
        let drawdown = drawdown_series(&result.equity_curve);
        let turnover = turnover_series(weights, config.rebalance_interval);

        Metrics {
            final_equity: result.final_equity(),
            sharpe: sharpe(&returns),
            max_drawdown: drawdown.iter().copied().fold(0.0, f64::min),
            skewness: skewness(&returns),
            excess_kurtosis: excess_kurtosis(&returns),
            avg_turnover: mean(&turnover).unwrap_or(0.0),
        }
    }
}

/// Percent change of the equity curve, first point dropped.
pub fn daily_returns(curve: &[EquityPoint]) -> Vec<f64> {
    curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            if prev != 0.0 {
                (w[1].equity - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

/// Relative decline from the running equity peak, one value per date.
///
/// The running maximum is non-decreasing, so every entry is ≤ 0.
pub fn drawdown_series(curve: &[EquityPoint]) -> Vec<f64> {
    let mut peak = f64::MIN;
    curve
        .iter()
        .map(|p| {
            if p.equity > peak {
                peak = p.equity;
            }
            (p.equity - peak) / peak
        })
        .collect()
}

/// Annualized Sharpe ratio; NaN when the returns have no variance.
pub fn sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return f64::NAN;
    }
    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std == 0.0 {
        return f64::NAN;
    }
    mean / std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Population skewness (third standardized moment).
pub fn skewness(returns: &[f64]) -> f64 {
    standardized_moment(returns, 3)
}

/// Population excess kurtosis (fourth standardized moment minus 3).
pub fn excess_kurtosis(returns: &[f64]) -> f64 {
    standardized_moment(returns, 4) - 3.0
}

fn standardized_moment(returns: &[f64], order: i32) -> f64 {
    let n = returns.len() as f64;
    if returns.is_empty() {
        return f64::NAN;
    }
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let m2: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return f64::NAN;
    }
    let mk: f64 = returns.iter().map(|r| (r - mean).powi(order)).sum::<f64>() / n;
    mk / m2.powf(order as f64 / 2.0)
}

/// Turnover series recomputed from the weight panel alone.
///
/// Replays the simulator's rebalance rule (lagged target row, warm-up rows
/// skipped) so the entries match the turnover behind the simulator's cost
/// term exactly.
pub fn turnover_series(weights: &Panel, rebalance_interval: usize) -> Vec<f64> {
    let n_rows = weights.n_rows();
    if rebalance_interval == 0 {
        return vec![0.0; n_rows];
    }

    let mut held = vec![0.0; weights.n_assets()];
    let mut out = Vec::with_capacity(n_rows);
    for i in 0..n_rows {
        if i > 0 && i % rebalance_interval == 0 {
            if let Some(target) = weights.defined_row(i - 1) {
                out.push(l1_distance(&target, &held));
                held = target;
                continue;
            }
        }
        out.push(0.0);
    }
    out
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::run_backtest;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                equity,
            })
            .collect()
    }

    fn panel(rows: Vec<Vec<Option<f64>>>) -> Panel {
        let assets = (0..rows[0].len()).map(|i| format!("A{i}")).collect();
        let dates = (1..=rows.len() as u32)
            .map(|day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap())
            .collect();
        Panel::new(assets, dates, rows).unwrap()
    }

    #[test]
    fn daily_returns_pct_change() {
        let returns = daily_returns(&curve(&[1.0, 1.1, 0.99]));
        assert_eq!(returns.len(), 2);
        assert_abs_diff_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(returns[1], (0.99 - 1.1) / 1.1, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_known_path() {
        let dd = drawdown_series(&curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]));
        assert_abs_diff_eq!(dd[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dd[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dd[2], (90.0 - 110.0) / 110.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dd[4], (80.0 - 110.0) / 110.0, epsilon = 1e-12);
        let max_dd = dd.iter().copied().fold(0.0, f64::min);
        assert_abs_diff_eq!(max_dd, -30.0 / 110.0, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_never_positive() {
        let dd = drawdown_series(&curve(&[1.0, 1.2, 1.1, 1.3, 0.7, 1.5]));
        assert!(dd.iter().all(|&v| v <= 0.0));
    }

    #[test]
    fn drawdown_zero_on_monotone_rise() {
        let dd = drawdown_series(&curve(&[1.0, 1.1, 1.2, 1.3]));
        assert!(dd.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn sharpe_positive_on_steady_rise() {
        let mut values = vec![1.0];
        for i in 1..100 {
            values.push(1.0 + 0.001 * i as f64 + if i % 2 == 0 { 0.0001 } else { 0.0 });
        }
        let s = sharpe(&daily_returns(&curve(&values)));
        assert!(s.is_finite());
        assert!(s > 0.0);
    }

    #[test]
    fn sharpe_nan_on_zero_variance() {
        let s = sharpe(&[0.0, 0.0, 0.0]);
        assert!(s.is_nan());
        let s = sharpe(&[0.01, 0.01, 0.01]);
        assert!(s.is_nan());
    }

    #[test]
    fn sharpe_nan_on_short_input() {
        assert!(sharpe(&[]).is_nan());
        assert!(sharpe(&[0.01]).is_nan());
    }

    #[test]
    fn skewness_zero_for_symmetric_sample() {
        assert_abs_diff_eq!(skewness(&[-1.0, 0.0, 1.0]), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn skewness_sign_follows_tail() {
        assert!(skewness(&[0.0, 0.0, 0.0, 10.0]) > 0.0);
        assert!(skewness(&[0.0, 0.0, 0.0, -10.0]) < 0.0);
    }

    #[test]
    fn excess_kurtosis_of_two_point_distribution() {
        // Symmetric ±1: m2 = 1, m4 = 1 -> excess kurtosis -2.
        assert_abs_diff_eq!(
            excess_kurtosis(&[-1.0, 1.0, -1.0, 1.0]),
            -2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn moments_nan_for_constant_series() {
        assert!(skewness(&[0.5, 0.5, 0.5]).is_nan());
        assert!(excess_kurtosis(&[0.5, 0.5]).is_nan());
    }

    #[test]
    fn turnover_series_zero_off_rebalance_dates() {
        let weights = panel(vec![vec![Some(0.25), Some(-0.25)]; 7]);
        let series = turnover_series(&weights, 5);

        assert_eq!(series.len(), 7);
        assert_abs_diff_eq!(series[5], 0.5, epsilon = 1e-12);
        for (i, v) in series.iter().enumerate() {
            if i != 5 {
                assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn turnover_series_skips_warmup_rows() {
        let mut rows: Vec<Vec<Option<f64>>> = vec![vec![None, None]; 3];
        rows.extend(vec![vec![Some(0.25), Some(-0.25)]; 3]);
        let weights = panel(rows);

        let series = turnover_series(&weights, 2);
        assert_abs_diff_eq!(series[2], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(series[4], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn turnover_matches_simulator_cost_term() {
        let rows: Vec<Vec<Option<f64>>> = (0..12)
            .map(|i| {
                let w = 0.1 + 0.02 * (i % 4) as f64;
                vec![Some(w), Some(-w)]
            })
            .collect();
        let weights = panel(rows);
        let returns = panel(vec![vec![Some(0.01), Some(-0.005)]; 12]);
        let config = BacktestConfig::default();

        let result = run_backtest(&weights, &returns, &config).unwrap();
        let independent = turnover_series(&weights, config.rebalance_interval);

        assert_eq!(result.turnover.len(), independent.len());
        for (a, b) in result.turnover.iter().zip(&independent) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn metrics_compute_flat_run() {
        let weights = panel(vec![vec![Some(0.0), Some(0.0)]; 6]);
        let returns = panel(vec![vec![Some(0.0), Some(0.0)]; 6]);
        let config = BacktestConfig::default();
        let result = run_backtest(&weights, &returns, &config).unwrap();

        let metrics = Metrics::compute(&result, &weights, &config);
        assert_abs_diff_eq!(metrics.final_equity, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.max_drawdown, 0.0, epsilon = 1e-12);
        assert!(metrics.sharpe.is_nan());
        assert_abs_diff_eq!(metrics.avg_turnover, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn average_turnover_includes_hold_dates() {
        let weights = panel(vec![vec![Some(0.25), Some(-0.25)]; 6]);
        let series = turnover_series(&weights, 5);
        let avg = series.iter().sum::<f64>() / series.len() as f64;
        assert_abs_diff_eq!(avg, 0.5 / 6.0, epsilon = 1e-12);
    }
}
