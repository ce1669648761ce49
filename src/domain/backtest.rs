//! Backtest simulator: discrete rebalance schedule over the return panel.
//!
//! The simulator is a fold over dates carrying [`SimState`]. On a rebalance
//! date it adopts the weight row computed for the *previous* date (one-period
//! lag, matched to the signal's information set) and pays a linear cost on
//! the resulting turnover; between rebalances the held weights are static
//! and do not drift toward the latest score.

use chrono::NaiveDate;

use super::error::CrossmomError;
use super::panel::Panel;

/// Backtest parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub rebalance_interval: usize,
    pub cost_per_turnover: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            rebalance_interval: 5,
            cost_per_turnover: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// State carried between days: compounded equity and the held weight vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub equity: f64,
    pub weights: Vec<f64>,
}

impl SimState {
    /// Unit equity, flat book.
    pub fn initial(n_assets: usize) -> Self {
        SimState {
            equity: 1.0,
            weights: vec![0.0; n_assets],
        }
    }
}

/// Outcome of a single day transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: SimState,
    pub turnover: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub equity_curve: Vec<EquityPoint>,
    pub turnover: Vec<f64>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve.last().map(|p| p.equity).unwrap_or(1.0)
    }
}

/// Sum of absolute differences between two weight vectors.
pub fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// One day of the state machine (any date after the first).
///
/// `target` is the lagged weight row to adopt on a rebalance date, or `None`
/// on hold dates and on rebalance dates still inside the warm-up. The adopted
/// weights earn that same day's return; the cost is charged against it.
pub fn step(
    state: &SimState,
    returns_row: &[f64],
    target: Option<&[f64]>,
    cost_per_turnover: f64,
) -> StepOutcome {
    let (weights, turnover, cost) = match target {
        Some(target) => {
            let turnover = l1_distance(target, &state.weights);
            (target.to_vec(), turnover, turnover * cost_per_turnover)
        }
        None => (state.weights.clone(), 0.0, 0.0),
    };

    let daily_return: f64 = weights
        .iter()
        .zip(returns_row)
        .map(|(w, r)| w * r)
        .sum::<f64>()
        - cost;

    StepOutcome {
        state: SimState {
            equity: state.equity * (1.0 + daily_return),
            weights,
        },
        turnover,
        cost,
    }
}

/// Run the simulator over index-aligned weight and return panels.
///
/// The equity curve has exactly one point per return-panel row. Entirely
/// undefined weight rows (warm-up) are never adopted: a rebalance falling on
/// one is skipped and the current holdings are kept. A partially defined
/// target row is malformed and fails the run.
pub fn run_backtest(
    weights: &Panel,
    returns: &Panel,
    config: &BacktestConfig,
) -> Result<BacktestResult, CrossmomError> {
    if config.rebalance_interval == 0 {
        return Err(CrossmomError::ConfigInvalid {
            section: "backtest".into(),
            key: "rebalance_interval".into(),
            reason: "rebalance_interval must be at least 1".into(),
        });
    }
    if !weights.same_index(returns) {
        return Err(CrossmomError::AlignmentMismatch {
            reason: "weight and return panels disagree on dates or assets".into(),
        });
    }

    let n_rows = returns.n_rows();
    let mut equity_curve = Vec::with_capacity(n_rows);
    let mut turnover_series = Vec::with_capacity(n_rows);
    let mut state = SimState::initial(returns.n_assets());

    for i in 0..n_rows {
        if i == 0 {
            equity_curve.push(EquityPoint {
                date: returns.date(0),
                equity: state.equity,
            });
            turnover_series.push(0.0);
            continue;
        }

        let returns_row = returns.defined_row(i).ok_or_else(|| {
            CrossmomError::AlignmentMismatch {
                reason: format!("return panel has undefined cells on {}", returns.date(i)),
            }
        })?;

        let target_row;
        let target = if i % config.rebalance_interval == 0 {
            let lag = i - 1;
            if weights.row_defined(lag) {
                target_row = weights.defined_row(lag).unwrap_or_default();
                Some(target_row.as_slice())
            } else if weights.row_undefined(lag) {
                None
            } else {
                return Err(CrossmomError::UndefinedSignal {
                    date: weights.date(lag),
                    reason: "rebalance target row is only partially defined".into(),
                });
            }
        } else {
            None
        };

        let outcome = step(&state, &returns_row, target, config.cost_per_turnover);
        state = outcome.state;
        equity_curve.push(EquityPoint {
            date: returns.date(i),
            equity: state.equity,
        });
        turnover_series.push(outcome.turnover);
    }

    Ok(BacktestResult {
        equity_curve,
        turnover: turnover_series,
    })
}
