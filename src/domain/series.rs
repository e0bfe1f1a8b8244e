//! Market series: ordered daily history with derived fields.
//!
//! A [`MarketSeries`] owns the sorted bar history and fills in the derived
//! columns at construction: per-instrument log returns and the rolling
//! Pearson correlation of the two closing-price series. The series is never
//! mutated afterward, so the engine can be rerun against it with different
//! parameters.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::bar::PairBar;
use super::error::PairtraderError;

#[derive(Debug, Clone)]
pub struct MarketSeries {
    bars: Vec<PairBar>,
    date_index: HashMap<NaiveDate, usize>,
    period: usize,
}

impl MarketSeries {
    /// Build a series from raw bars: sorts ascending by date, then derives
    /// log returns and the trailing-`period` correlation coefficient.
    pub fn new(mut bars: Vec<PairBar>, period: usize) -> Self {
        bars.sort_by_key(|b| b.date);
        derive_log_returns(&mut bars);
        derive_correlation(&mut bars, period);
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        MarketSeries {
            bars,
            date_index,
            period,
        }
    }

    pub fn bars(&self) -> &[PairBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Correlation window length the series was derived with.
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn bar(&self, date: NaiveDate) -> Option<&PairBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    /// The `period` most recent bars up to and including `date`.
    pub fn window_ending_at(
        &self,
        date: NaiveDate,
        period: usize,
    ) -> Result<&[PairBar], PairtraderError> {
        let end = *self
            .date_index
            .get(&date)
            .ok_or(PairtraderError::UnknownDate { date })?;
        let have = end + 1;
        if have < period {
            return Err(PairtraderError::InsufficientHistory {
                date,
                have,
                need: period,
            });
        }
        Ok(&self.bars[have - period..=end])
    }

    /// The first bar strictly after `date`.
    pub fn next_bar_after(&self, date: NaiveDate) -> Result<&PairBar, PairtraderError> {
        let idx = self.bars.partition_point(|bar| bar.date <= date);
        self.bars
            .get(idx)
            .ok_or(PairtraderError::OutOfRange { date })
    }

    /// First date, last date, and bar count, if the series is non-empty.
    pub fn data_range(&self) -> Option<(NaiveDate, NaiveDate, usize)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, self.bars.len())),
            _ => None,
        }
    }
}

fn derive_log_returns(bars: &mut [PairBar]) {
    for i in 1..bars.len() {
        let prev_amzn = bars[i - 1].amzn.close;
        let prev_wmt = bars[i - 1].wmt.close;
        let bar = &mut bars[i];
        bar.log_ret_amzn = Some(bar.amzn.close.ln() - prev_amzn.ln());
        bar.log_ret_wmt = Some(bar.wmt.close.ln() - prev_wmt.ln());
    }
}

fn derive_correlation(bars: &mut [PairBar], period: usize) {
    if period < 2 {
        return;
    }
    let amzn_closes: Vec<f64> = bars.iter().map(|b| b.amzn.close).collect();
    let wmt_closes: Vec<f64> = bars.iter().map(|b| b.wmt.close).collect();
    for i in 0..bars.len() {
        if i + 1 < period {
            continue;
        }
        let start = i + 1 - period;
        bars[i].corr_coef = pearson(&amzn_closes[start..=i], &wmt_closes[start..=i]);
    }
}

/// Pearson correlation of two equal-length samples; `None` when either sample
/// has zero variance (undefined, the NaN case in a rolling-correlation
/// column).
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0_f64;
    let mut var_x = 0.0_f64;
    let mut var_y = 0.0_f64;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        None
    } else {
        Some(cov / denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Quote;

    fn quote(close: f64) -> Quote {
        Quote {
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    fn make_bar(day: u32, amzn_close: f64, wmt_close: f64) -> PairBar {
        PairBar::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            quote(amzn_close),
            quote(wmt_close),
            None,
        )
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn new_sorts_bars_ascending() {
        let series = MarketSeries::new(
            vec![
                make_bar(3, 102.0, 52.0),
                make_bar(1, 100.0, 50.0),
                make_bar(2, 101.0, 51.0),
            ],
            3,
        );
        let dates: Vec<NaiveDate> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3)]);
    }

    #[test]
    fn log_returns_derived() {
        let series = MarketSeries::new(vec![make_bar(1, 100.0, 50.0), make_bar(2, 110.0, 45.0)], 2);
        assert!(series.bars()[0].log_ret_amzn.is_none());

        let amzn = series.bars()[1].log_ret_amzn.unwrap();
        let wmt = series.bars()[1].log_ret_wmt.unwrap();
        assert!((amzn - (110.0_f64.ln() - 100.0_f64.ln())).abs() < 1e-12);
        assert!((wmt - (45.0_f64.ln() - 50.0_f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn correlation_warmup_is_undefined() {
        let series = MarketSeries::new(
            vec![
                make_bar(1, 100.0, 50.0),
                make_bar(2, 101.0, 51.0),
                make_bar(3, 102.0, 52.0),
                make_bar(4, 103.0, 53.0),
            ],
            3,
        );
        assert!(series.bars()[0].corr_coef.is_none());
        assert!(series.bars()[1].corr_coef.is_none());
        assert!(series.bars()[2].corr_coef.is_some());
        assert!(series.bars()[3].corr_coef.is_some());
    }

    #[test]
    fn correlation_perfectly_positive() {
        let series = MarketSeries::new(
            vec![
                make_bar(1, 100.0, 50.0),
                make_bar(2, 101.0, 51.0),
                make_bar(3, 102.0, 52.0),
            ],
            3,
        );
        let corr = series.bars()[2].corr_coef.unwrap();
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_perfectly_negative() {
        let series = MarketSeries::new(
            vec![
                make_bar(1, 100.0, 52.0),
                make_bar(2, 101.0, 51.0),
                make_bar(3, 102.0, 50.0),
            ],
            3,
        );
        let corr = series.bars()[2].corr_coef.unwrap();
        assert!((corr - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn correlation_undefined_for_constant_closes() {
        let series = MarketSeries::new(
            vec![
                make_bar(1, 100.0, 50.0),
                make_bar(2, 100.0, 51.0),
                make_bar(3, 100.0, 52.0),
            ],
            3,
        );
        assert!(series.bars()[2].corr_coef.is_none());
    }

    #[test]
    fn window_ending_at_returns_trailing_bars() {
        let series = MarketSeries::new(
            vec![
                make_bar(1, 100.0, 50.0),
                make_bar(2, 101.0, 51.0),
                make_bar(3, 102.0, 52.0),
                make_bar(4, 103.0, 53.0),
            ],
            3,
        );
        let window = series.window_ending_at(date(4), 3).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].date, date(2));
        assert_eq!(window[2].date, date(4));
    }

    #[test]
    fn window_ending_at_short_history_fails() {
        let series = MarketSeries::new(vec![make_bar(1, 100.0, 50.0), make_bar(2, 101.0, 51.0)], 3);
        let err = series.window_ending_at(date(2), 3).unwrap_err();
        assert!(matches!(
            err,
            PairtraderError::InsufficientHistory { have: 2, need: 3, .. }
        ));
    }

    #[test]
    fn window_ending_at_unknown_date_fails() {
        let series = MarketSeries::new(vec![make_bar(1, 100.0, 50.0)], 3);
        let err = series.window_ending_at(date(9), 1).unwrap_err();
        assert!(matches!(err, PairtraderError::UnknownDate { .. }));
    }

    #[test]
    fn next_bar_after_returns_following_bar() {
        let series = MarketSeries::new(
            vec![
                make_bar(1, 100.0, 50.0),
                make_bar(2, 101.0, 51.0),
                make_bar(5, 102.0, 52.0),
            ],
            2,
        );
        assert_eq!(series.next_bar_after(date(1)).unwrap().date, date(2));
        // gap: the next bar after the 2nd is the 5th
        assert_eq!(series.next_bar_after(date(2)).unwrap().date, date(5));
        // a date between bars resolves to the next listed bar
        assert_eq!(series.next_bar_after(date(3)).unwrap().date, date(5));
    }

    #[test]
    fn next_bar_after_last_fails() {
        let series = MarketSeries::new(vec![make_bar(1, 100.0, 50.0), make_bar(2, 101.0, 51.0)], 2);
        let err = series.next_bar_after(date(2)).unwrap_err();
        assert!(matches!(err, PairtraderError::OutOfRange { .. }));
    }

    #[test]
    fn data_range_reports_span() {
        let series = MarketSeries::new(
            vec![
                make_bar(3, 102.0, 52.0),
                make_bar(1, 100.0, 50.0),
                make_bar(2, 101.0, 51.0),
            ],
            2,
        );
        assert_eq!(series.data_range(), Some((date(1), date(3), 3)));
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());

        let empty = MarketSeries::new(vec![], 2);
        assert_eq!(empty.data_range(), None);
        assert!(empty.is_empty());
    }
}
