//! Signal engine: multi-horizon momentum with volatility normalization.
//!
//! Rolling windows are computed with running accumulators (one pass per
//! asset), never by re-reducing the full window at every date. Warm-up
//! positions, where fewer than `window` observations exist, are `None`.

use super::error::CrossmomError;
use super::panel::Panel;

/// Parameters for the momentum score.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub momentum_windows: Vec<usize>,
    pub vol_window: usize,
    pub score_clip: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            momentum_windows: vec![7, 14, 30],
            vol_window: 20,
            score_clip: 5.0,
        }
    }
}

impl SignalConfig {
    /// Longest window in play; rows before it are warm-up for the score.
    pub fn longest_window(&self) -> usize {
        self.momentum_windows
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(self.vol_window)
    }
}

/// Trailing sum over `window` observations; `None` until populated.
pub fn rolling_sum(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if window == 0 {
        out.resize(values.len(), None);
        return out;
    }

    let mut acc = 0.0;
    for i in 0..values.len() {
        acc += values[i];
        if i >= window {
            acc -= values[i - window];
        }
        out.push(if i + 1 >= window { Some(acc) } else { None });
    }
    out
}

/// Trailing sample standard deviation (divide by window − 1).
///
/// Maintains running sums of x and x². The `sum_sq − sum²/n` form cancels
/// catastrophically on a constant window, leaving a residue of a few ulps of
/// the squared window mean instead of zero; variances at or below that scale
/// are collapsed to an exact zero so a dispersion-free window reads as zero
/// volatility, not as a tiny positive one.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if window < 2 {
        out.resize(values.len(), None);
        return out;
    }

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for i in 0..values.len() {
        sum += values[i];
        sum_sq += values[i] * values[i];
        if i >= window {
            sum -= values[i - window];
            sum_sq -= values[i - window] * values[i - window];
        }

        if i + 1 >= window {
            let n = window as f64;
            let mean = sum / n;
            let mut variance = ((sum_sq - sum * sum / n) / (n - 1.0)).max(0.0);
            if variance <= n * f64::EPSILON * mean * mean {
                variance = 0.0;
            }
            out.push(Some(variance.sqrt()));
        } else {
            out.push(None);
        }
    }
    out
}

/// Per-asset trailing volatility panel over the return panel.
pub fn volatility_panel(returns: &Panel, window: usize) -> Result<Panel, CrossmomError> {
    let columns = defined_columns(returns)?;
    let vols: Vec<Vec<Option<f64>>> = columns.iter().map(|c| rolling_std(c, window)).collect();

    let rows = (0..returns.n_rows())
        .map(|i| vols.iter().map(|v| v[i]).collect())
        .collect();
    Ok(Panel::new(
        returns.assets().to_vec(),
        returns.dates().to_vec(),
        rows,
    )?)
}

/// Volatility-adjusted momentum score panel.
///
/// Per asset: mean of the trailing momentum sums across the configured
/// horizons, divided by the trailing sample std, clipped to
/// `[-score_clip, score_clip]`. A zero std yields an undefined score rather
/// than a division fault.
pub fn score_panel(returns: &Panel, config: &SignalConfig) -> Result<Panel, CrossmomError> {
    let longest = config.longest_window();
    if returns.n_rows() < longest {
        return Err(CrossmomError::InsufficientData {
            rows: returns.n_rows(),
            minimum: longest,
        });
    }

    let columns = defined_columns(returns)?;
    let n_rows = returns.n_rows();
    let mut rows: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(columns.len()); n_rows];

    for column in &columns {
        let momenta: Vec<Vec<Option<f64>>> = config
            .momentum_windows
            .iter()
            .map(|&w| rolling_sum(column, w))
            .collect();
        let vol = rolling_std(column, config.vol_window);

        for i in 0..n_rows {
            let combined: Option<f64> = momenta
                .iter()
                .map(|m| m[i])
                .sum::<Option<f64>>()
                .map(|total| total / config.momentum_windows.len() as f64);

            let score = match (combined, vol[i]) {
                (Some(m), Some(v)) if v > 0.0 => {
                    Some((m / v).clamp(-config.score_clip, config.score_clip))
                }
                _ => None,
            };
            rows[i].push(score);
        }
    }

    Ok(Panel::new(
        returns.assets().to_vec(),
        returns.dates().to_vec(),
        rows,
    )?)
}

/// Unwrap every column of a fully defined panel.
fn defined_columns(panel: &Panel) -> Result<Vec<Vec<f64>>, CrossmomError> {
    let mut columns = Vec::with_capacity(panel.n_assets());
    for a in 0..panel.n_assets() {
        let column: Option<Vec<f64>> = panel.column(a).into_iter().collect();
        match column {
            Some(c) => columns.push(c),
            None => {
                return Err(CrossmomError::AlignmentMismatch {
                    reason: format!("return panel has undefined cells for {}", panel.assets()[a]),
                });
            }
        }
    }
    Ok(columns)
}
