//! Time-indexed asset panel.
//!
//! A `Panel` is an immutable table: rows are trading dates (strictly
//! ascending), columns are the asset universe in a fixed order. Cells are
//! `Option<f64>`: `None` marks an undefined value (missing price, rolling
//! warm-up), kept distinct from a computed zero.

use chrono::NaiveDate;

use super::error::PanelError;

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl Panel {
    /// Build a panel, validating shape and date ordering.
    pub fn new(
        assets: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, PanelError> {
        if assets.is_empty() {
            return Err(PanelError::EmptyUniverse);
        }
        if rows.len() != dates.len() {
            return Err(PanelError::RowCount {
                rows: rows.len(),
                dates: dates.len(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != assets.len() {
                return Err(PanelError::RowShape {
                    row: i,
                    got: row.len(),
                    expected: assets.len(),
                });
            }
        }
        for i in 1..dates.len() {
            if dates[i] <= dates[i - 1] {
                return Err(PanelError::UnsortedDates { row: i });
            }
        }
        Ok(Panel {
            assets,
            dates,
            rows,
        })
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn date(&self, row: usize) -> NaiveDate {
        self.dates[row]
    }

    pub fn row(&self, row: usize) -> &[Option<f64>] {
        &self.rows[row]
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.rows[row][col]
    }

    /// One asset's series down the whole panel.
    pub fn column(&self, col: usize) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r[col]).collect()
    }

    /// True when every cell in the row is defined.
    pub fn row_defined(&self, row: usize) -> bool {
        self.rows[row].iter().all(|c| c.is_some())
    }

    /// True when no cell in the row is defined (warm-up row).
    pub fn row_undefined(&self, row: usize) -> bool {
        self.rows[row].iter().all(|c| c.is_none())
    }

    /// The row unwrapped, or `None` unless every cell is defined.
    pub fn defined_row(&self, row: usize) -> Option<Vec<f64>> {
        self.rows[row].iter().copied().collect()
    }

    /// Drop every row with at least one missing cell, keeping the universe.
    ///
    /// This is the price-panel alignment step: every surviving row has a
    /// value for every asset.
    pub fn drop_incomplete_rows(&self) -> Panel {
        let mut dates = Vec::new();
        let mut rows = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            if row.iter().all(|c| c.is_some()) {
                dates.push(self.dates[i]);
                rows.push(row.clone());
            }
        }
        Panel {
            assets: self.assets.clone(),
            dates,
            rows,
        }
    }

    /// True when both panels share the same dates and the same asset order.
    pub fn same_index(&self, other: &Panel) -> bool {
        self.assets == other.assets && self.dates == other.dates
    }
}
