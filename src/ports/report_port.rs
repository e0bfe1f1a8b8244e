//! Report generation port trait.

use crate::domain::blotter::Blotter;
use crate::domain::error::PairtraderError;
use crate::domain::stats::BacktestStats;

/// Port for writing a finished run's blotter and summary figures.
pub trait ReportPort {
    fn write(
        &self,
        blotter: &Blotter,
        stats: &BacktestStats,
        output_path: &str,
    ) -> Result<(), PairtraderError>;
}
