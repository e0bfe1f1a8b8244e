//! Daily two-instrument market snapshot.

use chrono::NaiveDate;
use std::fmt;

/// The two instruments of the traded pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Amzn,
    Wmt,
}

impl Symbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Amzn => "AMZN",
            Symbol::Wmt => "WMT",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instrument's OHLCV snapshot for a single day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// One business day's snapshot across both instruments.
///
/// The derived fields (`log_ret_*`, `corr_coef`) are filled in when a
/// [`MarketSeries`](crate::domain::series::MarketSeries) is built and are
/// `None` until then. `None` also encodes "undefined": the first bar has no
/// log return, and the first `period - 1` bars have no correlation.
#[derive(Debug, Clone)]
pub struct PairBar {
    pub date: NaiveDate,
    pub amzn: Quote,
    pub wmt: Quote,
    pub interest_rate: Option<f64>,
    pub log_ret_amzn: Option<f64>,
    pub log_ret_wmt: Option<f64>,
    pub corr_coef: Option<f64>,
}

impl PairBar {
    /// A raw bar as loaded from the data source, before derivation.
    pub fn new(date: NaiveDate, amzn: Quote, wmt: Quote, interest_rate: Option<f64>) -> Self {
        PairBar {
            date,
            amzn,
            wmt,
            interest_rate,
            log_ret_amzn: None,
            log_ret_wmt: None,
            corr_coef: None,
        }
    }

    pub fn quote(&self, symbol: Symbol) -> &Quote {
        match symbol {
            Symbol::Amzn => &self.amzn,
            Symbol::Wmt => &self.wmt,
        }
    }

    pub fn log_return(&self, symbol: Symbol) -> Option<f64> {
        match symbol {
            Symbol::Amzn => self.log_ret_amzn,
            Symbol::Wmt => self.log_ret_wmt,
        }
    }
}
