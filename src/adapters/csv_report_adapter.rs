//! CSV report adapter.
//!
//! Writes the equity curve and drawdown series as `date,equity,drawdown`
//! rows for downstream charting.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::CrossmomError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        drawdown: &[f64],
        _metrics: &Metrics,
        output_path: &Path,
    ) -> Result<(), CrossmomError> {
        if drawdown.len() != result.equity_curve.len() {
            return Err(CrossmomError::AlignmentMismatch {
                reason: format!(
                    "drawdown series has {} entries for {} equity points",
                    drawdown.len(),
                    result.equity_curve.len()
                ),
            });
        }

        let mut writer = csv::Writer::from_path(output_path).map_err(|e| CrossmomError::Data {
            reason: format!("failed to open {}: {}", output_path.display(), e),
        })?;

        writer
            .write_record(["date", "equity", "drawdown"])
            .map_err(|e| CrossmomError::Data {
                reason: format!("CSV write error: {}", e),
            })?;

        for (point, dd) in result.equity_curve.iter().zip(drawdown) {
            writer
                .write_record([
                    point.date.to_string(),
                    format!("{:.10}", point.equity),
                    format!("{:.10}", dd),
                ])
                .map_err(|e| CrossmomError::Data {
                    reason: format!("CSV write error: {}", e),
                })?;
        }

        writer.flush().map_err(|e| CrossmomError::Data {
            reason: format!("CSV flush error: {}", e),
        })?;
        Ok(())
    }
}
