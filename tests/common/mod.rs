#![allow(dead_code)]

use chrono::NaiveDate;
use crossmom::domain::error::CrossmomError;
use crossmom::domain::panel::Panel;
use crossmom::ports::data_port::DataPort;

pub struct MockDataPort {
    pub panel: Option<Panel>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            panel: None,
            error: None,
        }
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panel = Some(panel);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        assets: &[String],
        _start_date: Option<NaiveDate>,
        _end_date: Option<NaiveDate>,
    ) -> Result<Panel, CrossmomError> {
        if let Some(reason) = &self.error {
            return Err(CrossmomError::Data {
                reason: reason.clone(),
            });
        }
        match &self.panel {
            Some(panel) if panel.assets() == assets => Ok(panel.clone()),
            Some(_) => Err(CrossmomError::Data {
                reason: "requested assets do not match stored panel".into(),
            }),
            None => Err(CrossmomError::Data {
                reason: "no panel configured".into(),
            }),
        }
    }

    fn list_assets(&self) -> Result<Vec<String>, CrossmomError> {
        match &self.panel {
            Some(panel) => Ok(panel.assets().to_vec()),
            None => Ok(Vec::new()),
        }
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn dates_from(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

/// Panel of fully defined cells from per-date rows.
pub fn panel(assets: &[&str], rows: Vec<Vec<f64>>) -> Panel {
    let n = rows.len();
    Panel::new(
        assets.iter().map(|s| s.to_string()).collect(),
        dates_from(date(2024, 1, 1), n),
        rows.into_iter()
            .map(|r| r.into_iter().map(Some).collect())
            .collect(),
    )
    .unwrap()
}

/// Price panel built by compounding per-asset daily log returns from 100.0.
pub fn prices_from_log_returns(assets: &[&str], returns: &[Vec<f64>]) -> Panel {
    let n_assets = assets.len();
    let mut levels = vec![100.0_f64; n_assets];
    let mut rows = vec![levels.clone()];
    for row in returns {
        for (level, r) in levels.iter_mut().zip(row) {
            *level *= r.exp();
        }
        rows.push(levels.clone());
    }
    panel(assets, rows)
}

/// Constant-price panel: every signal downstream is undefined.
pub fn flat_prices(assets: &[&str], n_rows: usize) -> Panel {
    panel(assets, vec![vec![100.0; assets.len()]; n_rows])
}

/// Two assets with exactly opposite, non-constant daily log returns. The
/// sign flip leaves rolling dispersion identical across the pair, so
/// momentum scores come out as exact negatives of each other.
pub fn opposed_pair_returns(n_rows: usize) -> Vec<Vec<f64>> {
    (0..n_rows)
        .map(|i| {
            let r = if i % 2 == 0 { 0.01 } else { 0.02 };
            vec![r, -r]
        })
        .collect()
}
