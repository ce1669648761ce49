//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::CrossmomError;
use crate::domain::metrics::Metrics;
use std::path::Path;

/// Port for handing the equity curve, drawdown series, and summary metrics
/// to a rendering or reporting collaborator.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        drawdown: &[f64],
        metrics: &Metrics,
        output_path: &Path,
    ) -> Result<(), CrossmomError>;
}
