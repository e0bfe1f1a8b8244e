//! Market data access port trait.

use crate::domain::bar::PairBar;
use crate::domain::error::PairtraderError;
use chrono::NaiveDate;

/// Source of the merged two-instrument history. Implementations return raw
/// bars (derived fields unset, risk-free rate already merged per date); the
/// caller builds a `MarketSeries` from them.
pub trait MarketDataPort {
    fn fetch_history(&self) -> Result<Vec<PairBar>, PairtraderError>;

    /// First date, last date, and bar count, or `None` for an empty source.
    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PairtraderError> {
        let bars = self.fetch_history()?;
        let min = bars.iter().map(|b| b.date).min();
        let max = bars.iter().map(|b| b.date).max();
        match (min, max) {
            (Some(min), Some(max)) => Ok(Some((min, max, bars.len()))),
            _ => Ok(None),
        }
    }
}
