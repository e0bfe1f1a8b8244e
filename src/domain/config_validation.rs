//! Configuration validation.
//!
//! Bounds checks on the resolved backtest parameters, plus presence checks on
//! the `[data]` section, run before any data is loaded.

use super::engine::BacktestConfig;
use super::error::PairtraderError;
use crate::ports::config_port::ConfigPort;

pub const MIN_PERIOD: usize = 3;
pub const MIN_LOT_VALUE: f64 = 10_000.0;
pub const MIN_HOLDING_PERIOD_CAP: u32 = 1;

/// Validate a fully resolved config (file values plus CLI overrides).
pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), PairtraderError> {
    if config.period < MIN_PERIOD {
        return Err(invalid(
            "period",
            format!("period must be at least {MIN_PERIOD}"),
        ));
    }
    if config.lot_value < MIN_LOT_VALUE {
        return Err(invalid(
            "lot_value",
            format!("lot_value must be at least {MIN_LOT_VALUE}"),
        ));
    }
    if config.gain_cap <= 0.0 {
        return Err(invalid("gain_cap", "gain_cap must be positive".to_string()));
    }
    if config.holding_period_cap_days < MIN_HOLDING_PERIOD_CAP {
        return Err(invalid(
            "holding_period_cap",
            format!("holding_period_cap must be at least {MIN_HOLDING_PERIOD_CAP}"),
        ));
    }
    Ok(())
}

/// The history file is required; the risk-free file is optional (bars without
/// a rate simply carry none).
pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    match config.get_string("data", "history_path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(PairtraderError::ConfigMissing {
            section: "data".to_string(),
            key: "history_path".to_string(),
        }),
    }
}

fn invalid(key: &str, reason: String) -> PairtraderError {
    PairtraderError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason,
    }
}
