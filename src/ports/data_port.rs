//! Price retrieval port trait.

use crate::domain::error::CrossmomError;
use crate::domain::panel::Panel;
use chrono::NaiveDate;

/// Supplies the historical price panel for a fixed asset universe.
///
/// Implementations own fetching and parsing; the returned panel carries the
/// requested assets in the requested order, dates ascending, with `None`
/// marking days an asset has no price. Alignment (dropping incomplete rows)
/// is the caller's step, not the port's.
pub trait DataPort {
    fn fetch_prices(
        &self,
        assets: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Panel, CrossmomError>;

    fn list_assets(&self) -> Result<Vec<String>, CrossmomError>;
}
