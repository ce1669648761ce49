//! Return engine: price panel to log-return panel.

use super::error::CrossmomError;
use super::panel::Panel;

/// Convert an aligned price panel into daily log returns.
///
/// `out[t][a] = ln(price[t][a]) - ln(price[t-1][a])`; the first row has no
/// predecessor and is dropped, so the result has exactly one fewer row than
/// the input. The input must already be aligned (no missing cells; run
/// [`Panel::drop_incomplete_rows`] first) and strictly positive.
pub fn log_returns(prices: &Panel) -> Result<Panel, CrossmomError> {
    if prices.n_rows() < 2 {
        return Err(CrossmomError::InsufficientData {
            rows: prices.n_rows(),
            minimum: 2,
        });
    }

    for i in 0..prices.n_rows() {
        for (a, cell) in prices.row(i).iter().enumerate() {
            match cell {
                Some(p) if *p > 0.0 => {}
                Some(_) => {
                    return Err(CrossmomError::NonPositivePrice {
                        asset: prices.assets()[a].clone(),
                        date: prices.date(i),
                    });
                }
                None => {
                    return Err(CrossmomError::AlignmentMismatch {
                        reason: format!(
                            "price panel has a missing cell for {} on {}",
                            prices.assets()[a],
                            prices.date(i)
                        ),
                    });
                }
            }
        }
    }

    let dates = prices.dates()[1..].to_vec();
    let mut rows = Vec::with_capacity(prices.n_rows() - 1);
    for i in 1..prices.n_rows() {
        let row: Vec<Option<f64>> = prices
            .row(i)
            .iter()
            .zip(prices.row(i - 1))
            .map(|(curr, prev)| {
                // Every cell was validated above.
                match (curr, prev) {
                    (Some(c), Some(p)) => Some((c / p).ln()),
                    _ => None,
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(Panel::new(prices.assets().to_vec(), dates, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn price_panel(rows: Vec<Vec<Option<f64>>>) -> Panel {
        let dates = (1..=rows.len() as u32).map(d).collect();
        Panel::new(vec!["AAA".into(), "BBB".into()], dates, rows).unwrap()
    }

    #[test]
    fn log_returns_basic() {
        let prices = price_panel(vec![
            vec![Some(100.0), Some(50.0)],
            vec![Some(110.0), Some(45.0)],
            vec![Some(121.0), Some(45.0)],
        ]);
        let returns = log_returns(&prices).unwrap();

        assert_eq!(returns.n_rows(), 2);
        assert_eq!(returns.dates(), &[d(2), d(3)]);
        assert!((returns.value(0, 0).unwrap() - (110.0f64 / 100.0).ln()).abs() < 1e-12);
        assert!((returns.value(0, 1).unwrap() - (45.0f64 / 50.0).ln()).abs() < 1e-12);
        assert!((returns.value(1, 1).unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn log_returns_requires_two_rows() {
        let prices = price_panel(vec![vec![Some(100.0), Some(50.0)]]);
        let result = log_returns(&prices);
        assert!(matches!(
            result,
            Err(CrossmomError::InsufficientData { rows: 1, minimum: 2 })
        ));
    }

    #[test]
    fn log_returns_rejects_non_positive_price() {
        let prices = price_panel(vec![
            vec![Some(100.0), Some(50.0)],
            vec![Some(0.0), Some(45.0)],
        ]);
        let result = log_returns(&prices);
        assert!(matches!(
            result,
            Err(CrossmomError::NonPositivePrice { ref asset, .. }) if asset == "AAA"
        ));
    }

    #[test]
    fn log_returns_rejects_missing_cells() {
        let prices = price_panel(vec![
            vec![Some(100.0), Some(50.0)],
            vec![Some(101.0), None],
        ]);
        let result = log_returns(&prices);
        assert!(matches!(result, Err(CrossmomError::AlignmentMismatch { .. })));
    }

    #[test]
    fn flat_prices_give_zero_returns() {
        let prices = price_panel(vec![
            vec![Some(75.0), Some(75.0)],
            vec![Some(75.0), Some(75.0)],
            vec![Some(75.0), Some(75.0)],
        ]);
        let returns = log_returns(&prices).unwrap();
        for i in 0..returns.n_rows() {
            for a in 0..returns.n_assets() {
                assert!((returns.value(i, a).unwrap() - 0.0).abs() < 1e-15);
            }
        }
    }
}
