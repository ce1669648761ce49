//! Weight constructor: scores to scaled portfolio weights.
//!
//! Each fully defined score row is normalized to unit gross exposure, scaled
//! by the exposure factor, and halved again on dates the volatility regime
//! filter flags. The regime threshold is a single whole-sample percentile of
//! the market-volatility series, computed over the full sample rather than
//! causally.

use super::error::CrossmomError;
use super::panel::Panel;

/// Parameters for weight construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightConfig {
    pub exposure: f64,
    pub regime_multiplier: f64,
    pub regime_percentile: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        WeightConfig {
            exposure: 0.5,
            regime_multiplier: 0.5,
            regime_percentile: 0.75,
        }
    }
}

/// Cross-sectional mean of the per-asset volatility panel, per date.
///
/// Defined only on rows where every asset's volatility is defined.
pub fn market_volatility(vol: &Panel) -> Vec<Option<f64>> {
    (0..vol.n_rows())
        .map(|i| {
            vol.defined_row(i)
                .map(|row| row.iter().sum::<f64>() / row.len() as f64)
        })
        .collect()
}

/// Percentile with linear interpolation between order statistics.
///
/// Returns `None` on an empty input.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64))
}

/// High-volatility regime flags: market volatility strictly above the
/// whole-sample percentile threshold. Undefined dates are never flagged.
pub fn regime_flags(market_vol: &[Option<f64>], percentile: f64) -> Vec<bool> {
    let defined: Vec<f64> = market_vol.iter().filter_map(|v| *v).collect();
    let threshold = match quantile(&defined, percentile) {
        Some(t) => t,
        None => return vec![false; market_vol.len()],
    };

    market_vol
        .iter()
        .map(|v| matches!(v, Some(x) if *x > threshold))
        .collect()
}

/// Build the weight panel from the score panel and the per-asset volatility
/// panel the scores were normalized with.
///
/// A row with any undefined score yields an entirely undefined weight row.
/// A defined row whose absolute-score sum is zero yields all-zero weights.
pub fn weight_panel(
    scores: &Panel,
    vol: &Panel,
    config: &WeightConfig,
) -> Result<Panel, CrossmomError> {
    if !scores.same_index(vol) {
        return Err(CrossmomError::AlignmentMismatch {
            reason: "score and volatility panels disagree on dates or assets".into(),
        });
    }

    let market_vol = market_volatility(vol);
    let high_vol = regime_flags(&market_vol, config.regime_percentile);

    let mut rows = Vec::with_capacity(scores.n_rows());
    for i in 0..scores.n_rows() {
        let row = match scores.defined_row(i) {
            Some(score_row) => {
                let abs_sum: f64 = score_row.iter().map(|s| s.abs()).sum();
                let scale = if abs_sum > 0.0 {
                    let mut s = config.exposure / abs_sum;
                    if high_vol[i] {
                        s *= config.regime_multiplier;
                    }
                    s
                } else {
                    0.0
                };
                score_row.iter().map(|s| Some(s * scale)).collect()
            }
            None => vec![None; scores.n_assets()],
        };
        rows.push(row);
    }

    Ok(Panel::new(
        scores.assets().to_vec(),
        scores.dates().to_vec(),
        rows,
    )?)
}
