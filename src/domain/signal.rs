//! Position direction heuristics.
//!
//! Two named policies decide which leg of the pair goes long. Both compare a
//! per-instrument "bearishness" measure over the signal window and resolve
//! ties toward AMZN=BUY; the volume-weighted variant is the default entry
//! path, the day-count variant is the selectable alternate.

use std::fmt;
use std::str::FromStr;

use super::bar::{PairBar, Symbol};
use super::blotter::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionPolicy {
    /// Compare the fraction of traded volume occurring on negative-return
    /// days.
    #[default]
    NegativeVolume,
    /// Compare the plain count of negative-return days (no volume weighting).
    NegativeCount,
}

impl DirectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionPolicy::NegativeVolume => "negative-volume",
            DirectionPolicy::NegativeCount => "negative-count",
        }
    }
}

impl fmt::Display for DirectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "negative-volume" | "negative_volume" => Ok(DirectionPolicy::NegativeVolume),
            "negative-count" | "negative_count" => Ok(DirectionPolicy::NegativeCount),
            other => Err(format!(
                "unknown direction policy {other:?} (expected negative-volume or negative-count)"
            )),
        }
    }
}

/// Per-leg actions for one pair entry; always one BUY and one SELL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairDirection {
    pub amzn: Action,
    pub wmt: Action,
}

impl PairDirection {
    pub fn action(&self, symbol: Symbol) -> Action {
        match symbol {
            Symbol::Amzn => self.amzn,
            Symbol::Wmt => self.wmt,
        }
    }

    fn from_amzn(amzn: Action) -> Self {
        PairDirection {
            amzn,
            wmt: amzn.opposite(),
        }
    }
}

/// Decide the entry direction for each leg over the signal window.
///
/// Precondition: the window is non-empty, and for the volume-weighted policy
/// each instrument has traded volume in it (division by total volume).
pub fn decide_direction(window: &[PairBar], policy: DirectionPolicy) -> PairDirection {
    match policy {
        DirectionPolicy::NegativeVolume => negative_volume_direction(window),
        DirectionPolicy::NegativeCount => negative_count_direction(window),
    }
}

fn negative_count_direction(window: &[PairBar]) -> PairDirection {
    let count_negative = |symbol: Symbol| {
        window
            .iter()
            .filter(|bar| bar.log_return(symbol).is_some_and(|r| r < 0.0))
            .count()
    };
    let amzn_neg = count_negative(Symbol::Amzn);
    let wmt_neg = count_negative(Symbol::Wmt);

    let amzn = if amzn_neg >= wmt_neg {
        Action::Buy
    } else {
        Action::Sell
    };
    PairDirection::from_amzn(amzn)
}

fn negative_volume_direction(window: &[PairBar]) -> PairDirection {
    let negative_fraction = |symbol: Symbol| {
        let total: i64 = window.iter().map(|bar| bar.quote(symbol).volume).sum();
        debug_assert!(total > 0, "signal window must contain traded volume");
        let negative: i64 = window
            .iter()
            .filter(|bar| bar.log_return(symbol).is_some_and(|r| r < 0.0))
            .map(|bar| bar.quote(symbol).volume)
            .sum();
        negative as f64 / total as f64
    };
    let amzn_pct = negative_fraction(Symbol::Amzn);
    let wmt_pct = negative_fraction(Symbol::Wmt);

    let amzn = if amzn_pct >= wmt_pct {
        Action::Buy
    } else {
        Action::Sell
    };
    PairDirection::from_amzn(amzn)
}
