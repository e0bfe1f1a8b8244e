#![allow(dead_code)]

use chrono::NaiveDate;
use pairtrader::domain::bar::{PairBar, Quote};
use pairtrader::domain::calendar::add_business_days;
use pairtrader::domain::engine::BacktestConfig;
use pairtrader::domain::error::PairtraderError;
use pairtrader::domain::series::MarketSeries;
use pairtrader::ports::data_port::MarketDataPort;

pub struct MockDataPort {
    pub bars: Vec<PairBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<PairBar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_history(&self) -> Result<Vec<PairBar>, PairtraderError> {
        if let Some(reason) = &self.error {
            return Err(PairtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn quote(close: f64) -> Quote {
    Quote {
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

pub fn make_bar(date: NaiveDate, amzn_close: f64, wmt_close: f64) -> PairBar {
    PairBar::new(date, quote(amzn_close), quote(wmt_close), Some(0.05))
}

/// Bars on consecutive business days starting Mon 2024-01-01, opens equal to
/// closes.
pub fn bars_from_closes(closes: &[(f64, f64)]) -> Vec<PairBar> {
    let mut current = date(2024, 1, 1);
    closes
        .iter()
        .map(|&(amzn, wmt)| {
            let bar = make_bar(current, amzn, wmt);
            current = add_business_days(current, 1);
            bar
        })
        .collect()
}

pub fn series_from_closes(closes: &[(f64, f64)], period: usize) -> MarketSeries {
    MarketSeries::new(bars_from_closes(closes), period)
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig::default()
}

/// Ten business days (Jan 1 .. Jan 12, 2024). AMZN drifts down and WMT up
/// over the first three bars, so the correlation turns negative on Jan 3 and
/// a pair opens at the Jan 4 open (AMZN BUY 100, WMT SELL 52). Prices then
/// stay inside both exit limits, so the exits expire Jan 11 and are forced
/// closed on Jan 12.
pub fn force_close_closes() -> Vec<(f64, f64)> {
    vec![
        (102.0, 50.0), // Jan 1
        (101.0, 51.0), // Jan 2
        (100.0, 52.0), // Jan 3  ← signal
        (100.0, 52.0), // Jan 4  ← entry fill
        (100.0, 52.0), // Jan 5
        (100.0, 52.0), // Jan 8
        (100.0, 52.0), // Jan 9
        (100.0, 52.0), // Jan 10
        (100.0, 52.0), // Jan 11 ← exit expiry
        (100.0, 52.0), // Jan 12 ← forced close
    ]
}
