//! CSV price panel adapter.
//!
//! Reads a wide daily-close file: a `date` column followed by one column per
//! asset. Empty cells are missing prices and come through as undefined panel
//! entries.

use crate::domain::error::CrossmomError;
use crate::domain::panel::Panel;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_headers(&self, content: &str) -> Result<Vec<String>, CrossmomError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| CrossmomError::Data {
            reason: format!("CSV header error in {}: {}", self.path.display(), e),
        })?;
        Ok(headers.iter().map(|h| h.trim().to_string()).collect())
    }
}

impl DataPort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        assets: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Panel, CrossmomError> {
        let content = fs::read_to_string(&self.path).map_err(|e| CrossmomError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let headers = self.read_headers(&content)?;
        let mut columns = Vec::with_capacity(assets.len());
        for asset in assets {
            let idx = headers
                .iter()
                .skip(1)
                .position(|h| h.eq_ignore_ascii_case(asset))
                .map(|p| p + 1)
                .ok_or_else(|| CrossmomError::Data {
                    reason: format!("asset {} not found in {}", asset, self.path.display()),
                })?;
            columns.push(idx);
        }

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut dated_rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| CrossmomError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| CrossmomError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                CrossmomError::Data {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            if let Some(start) = start_date {
                if date < start {
                    continue;
                }
            }
            if let Some(end) = end_date {
                if date > end {
                    continue;
                }
            }

            let mut cells = Vec::with_capacity(columns.len());
            for (&idx, asset) in columns.iter().zip(assets) {
                let raw = record.get(idx).unwrap_or("").trim();
                if raw.is_empty() {
                    cells.push(None);
                } else {
                    let price: f64 = raw.parse().map_err(|e| CrossmomError::Data {
                        reason: format!("invalid price '{}' for {} on {}: {}", raw, asset, date, e),
                    })?;
                    cells.push(Some(price));
                }
            }
            dated_rows.push((date, cells));
        }

        dated_rows.sort_by_key(|(date, _)| *date);
        let (dates, rows) = dated_rows.into_iter().unzip();
        Ok(Panel::new(assets.to_vec(), dates, rows)?)
    }

    fn list_assets(&self) -> Result<Vec<String>, CrossmomError> {
        let content = fs::read_to_string(&self.path).map_err(|e| CrossmomError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let headers = self.read_headers(&content)?;
        Ok(headers.into_iter().skip(1).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_prices(content: &str) -> (TempDir, CsvPriceAdapter) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, content).unwrap();
        (dir, CsvPriceAdapter::new(path))
    }

    const SAMPLE: &str = "date,BTC-USD,ETH-USD\n\
        2024-01-02,42000.0,2350.0\n\
        2024-01-01,41000.0,2300.0\n\
        2024-01-03,43000.0,\n";

    #[test]
    fn fetch_prices_sorts_by_date() {
        let (_dir, adapter) = write_prices(SAMPLE);
        let assets = vec!["BTC-USD".to_string(), "ETH-USD".to_string()];
        let panel = adapter.fetch_prices(&assets, None, None).unwrap();

        assert_eq!(panel.n_rows(), 3);
        assert_eq!(panel.date(0), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(panel.value(0, 0), Some(41000.0));
        assert_eq!(panel.value(1, 1), Some(2350.0));
    }

    #[test]
    fn empty_cells_become_undefined() {
        let (_dir, adapter) = write_prices(SAMPLE);
        let assets = vec!["BTC-USD".to_string(), "ETH-USD".to_string()];
        let panel = adapter.fetch_prices(&assets, None, None).unwrap();

        assert_eq!(panel.value(2, 0), Some(43000.0));
        assert_eq!(panel.value(2, 1), None);
    }

    #[test]
    fn fetch_prices_respects_column_order_of_request() {
        let (_dir, adapter) = write_prices(SAMPLE);
        let assets = vec!["ETH-USD".to_string(), "BTC-USD".to_string()];
        let panel = adapter.fetch_prices(&assets, None, None).unwrap();

        assert_eq!(panel.assets(), &["ETH-USD", "BTC-USD"]);
        assert_eq!(panel.value(0, 0), Some(2300.0));
        assert_eq!(panel.value(0, 1), Some(41000.0));
    }

    #[test]
    fn fetch_prices_filters_date_range() {
        let (_dir, adapter) = write_prices(SAMPLE);
        let assets = vec!["BTC-USD".to_string()];
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let panel = adapter.fetch_prices(&assets, Some(start), Some(end)).unwrap();

        assert_eq!(panel.n_rows(), 1);
        assert_eq!(panel.value(0, 0), Some(42000.0));
    }

    #[test]
    fn unknown_asset_is_an_error() {
        let (_dir, adapter) = write_prices(SAMPLE);
        let assets = vec!["SOL-USD".to_string()];
        let result = adapter.fetch_prices(&assets, None, None);
        assert!(matches!(result, Err(CrossmomError::Data { .. })));
    }

    #[test]
    fn malformed_price_is_an_error() {
        let (_dir, adapter) =
            write_prices("date,BTC-USD\n2024-01-01,forty-two\n");
        let assets = vec!["BTC-USD".to_string()];
        let result = adapter.fetch_prices(&assets, None, None);
        assert!(matches!(result, Err(CrossmomError::Data { .. })));
    }

    #[test]
    fn missing_file_is_an_error() {
        let adapter = CsvPriceAdapter::new(PathBuf::from("/nonexistent/prices.csv"));
        let assets = vec!["BTC-USD".to_string()];
        let result = adapter.fetch_prices(&assets, None, None);
        assert!(matches!(result, Err(CrossmomError::Data { .. })));
    }

    #[test]
    fn list_assets_returns_header_columns() {
        let (_dir, adapter) = write_prices(SAMPLE);
        assert_eq!(adapter.list_assets().unwrap(), vec!["BTC-USD", "ETH-USD"]);
    }
}
