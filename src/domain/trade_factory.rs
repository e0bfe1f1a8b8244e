//! Entry, exit, and forced trade construction.
//!
//! Entries are market orders assumed filled at the next bar's open. Exits are
//! limit orders priced off the gain cap (plus the entry date's risk-free rate
//! when enabled), expiring a fixed number of business days after entry.
//! Forced trades substitute a market close for an exit that expired unfilled.

use chrono::NaiveDate;

use super::bar::{PairBar, Symbol};
use super::blotter::{Action, Status, TradeRecord, Trip};
use super::calendar::add_business_days;
use super::engine::BacktestConfig;
use super::error::PairtraderError;
use super::series::MarketSeries;
use super::signal::decide_direction;

/// Build the two ENTRY trades for a signal on `signal_date`.
///
/// Direction comes from the signal window ending at `signal_date`; both legs
/// fill at the next bar's open, sized as `lot_value / open` rounded to four
/// decimals (fractional-share precision floor). Fails with
/// `InsufficientHistory` inside the warmup prefix and `OutOfRange` when the
/// signal fires on the last bar.
pub fn entry_pair(
    series: &MarketSeries,
    signal_date: NaiveDate,
    config: &BacktestConfig,
) -> Result<[TradeRecord; 2], PairtraderError> {
    let window = series.window_ending_at(signal_date, config.period)?;
    let direction = decide_direction(window, config.direction_policy);
    let next_bar = series.next_bar_after(signal_date)?;

    let entry = |symbol: Symbol| {
        let open = next_bar.quote(symbol).open;
        TradeRecord {
            date: next_bar.date,
            symbol,
            trip: Trip::Entry,
            action: direction.action(symbol),
            price: open,
            size: round_to(config.lot_value / open, 4),
            status: Status::Filled,
        }
    };

    Ok([entry(Symbol::Amzn), entry(Symbol::Wmt)])
}

/// Build the paired EXIT limit orders for a freshly created entry pair.
pub fn exit_pair(
    series: &MarketSeries,
    entries: &[TradeRecord; 2],
    config: &BacktestConfig,
) -> [TradeRecord; 2] {
    [
        exit_for(series, &entries[0], config),
        exit_for(series, &entries[1], config),
    ]
}

fn exit_for(series: &MarketSeries, entry: &TradeRecord, config: &BacktestConfig) -> TradeRecord {
    let exit_action = entry.action.opposite();
    let exit_date = add_business_days(entry.date, config.holding_period_cap_days);

    // A requested but absent rate is treated as zero, never fatal.
    let risk_free = if config.include_risk_free {
        series
            .bar(entry.date)
            .and_then(|bar| bar.interest_rate)
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let raw_price = match exit_action {
        Action::Sell => entry.price * (1.0 + config.gain_cap + risk_free),
        Action::Buy => entry.price * (1.0 - config.gain_cap - risk_free),
    };

    TradeRecord {
        date: exit_date,
        symbol: entry.symbol,
        trip: Trip::Exit,
        action: exit_action,
        price: round_to(raw_price, 2),
        size: entry.size,
        status: Status::Pending,
    }
}

/// Build the FORCED market-close trade replacing an expired pending exit.
/// Same action as the pending exit: the position still closes in the same
/// direction, just at market instead of limit.
pub fn forced_trade(
    date: NaiveDate,
    symbol: Symbol,
    action: Action,
    size: f64,
    bar: &PairBar,
) -> TradeRecord {
    TradeRecord {
        date,
        symbol,
        trip: Trip::Exit,
        action,
        price: bar.quote(symbol).close,
        size,
        status: Status::Forced,
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Quote;

    fn quote(open: f64, close: f64, volume: i64) -> Quote {
        Quote {
            open,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    /// Four business days (Mon 15th .. Thu 18th): AMZN drifting down, WMT
    /// drifting up, so the default policy buys AMZN and sells WMT.
    fn sample_series() -> MarketSeries {
        let bars = vec![
            PairBar::new(date(15), quote(103.0, 102.0, 1000), quote(50.0, 50.0, 1000), Some(0.05)),
            PairBar::new(date(16), quote(102.0, 101.0, 1000), quote(50.5, 51.0, 1000), Some(0.05)),
            PairBar::new(date(17), quote(101.0, 100.0, 1000), quote(51.5, 52.0, 1000), Some(0.05)),
            PairBar::new(date(18), quote(100.0, 100.5, 1000), quote(52.5, 53.0, 1000), Some(0.05)),
        ];
        MarketSeries::new(bars, 3)
    }

    fn config() -> BacktestConfig {
        BacktestConfig::default()
    }

    #[test]
    fn entry_pair_fills_at_next_bar_open() {
        let series = sample_series();
        let entries = entry_pair(&series, date(17), &config()).unwrap();

        let amzn = &entries[0];
        assert_eq!(amzn.symbol, Symbol::Amzn);
        assert_eq!(amzn.date, date(18));
        assert_eq!(amzn.trip, Trip::Entry);
        assert_eq!(amzn.action, Action::Buy);
        assert_eq!(amzn.status, Status::Filled);
        assert!((amzn.price - 100.0).abs() < f64::EPSILON);
        // 25_000 / 100 = 250 shares exactly
        assert!((amzn.size - 250.0).abs() < f64::EPSILON);

        let wmt = &entries[1];
        assert_eq!(wmt.symbol, Symbol::Wmt);
        assert_eq!(wmt.action, Action::Sell);
        assert!((wmt.price - 52.5).abs() < f64::EPSILON);
    }

    #[test]
    fn entry_size_rounds_to_four_decimals() {
        let series = sample_series();
        let cfg = BacktestConfig {
            lot_value: 25_000.0,
            ..config()
        };
        let entries = entry_pair(&series, date(17), &cfg).unwrap();
        // 25_000 / 52.5 = 476.190476... → 476.1905
        assert!((entries[1].size - 476.1905).abs() < 1e-9);
    }

    #[test]
    fn entry_pair_inside_warmup_fails() {
        let series = sample_series();
        let err = entry_pair(&series, date(16), &config()).unwrap_err();
        assert!(matches!(err, PairtraderError::InsufficientHistory { .. }));
    }

    #[test]
    fn entry_pair_on_last_bar_fails() {
        let series = sample_series();
        let err = entry_pair(&series, date(18), &config()).unwrap_err();
        assert!(matches!(err, PairtraderError::OutOfRange { .. }));
    }

    #[test]
    fn exit_pair_opposite_action_and_capped_price() {
        let series = sample_series();
        let entries = entry_pair(&series, date(17), &config()).unwrap();
        let exits = exit_pair(&series, &entries, &config());

        // AMZN entered BUY at 100 → exit SELL at 100 * 1.1 = 110.00
        let amzn = &exits[0];
        assert_eq!(amzn.trip, Trip::Exit);
        assert_eq!(amzn.action, Action::Sell);
        assert_eq!(amzn.status, Status::Pending);
        assert!((amzn.price - 110.0).abs() < f64::EPSILON);
        assert!((amzn.size - entries[0].size).abs() < f64::EPSILON);

        // WMT entered SELL at 52.5 → exit BUY at 52.5 * 0.9 = 47.25
        let wmt = &exits[1];
        assert_eq!(wmt.action, Action::Buy);
        assert!((wmt.price - 47.25).abs() < f64::EPSILON);
    }

    #[test]
    fn exit_date_is_entry_plus_holding_cap_business_days() {
        let series = sample_series();
        let entries = entry_pair(&series, date(17), &config()).unwrap();
        let exits = exit_pair(&series, &entries, &config());
        // Thu Jan 18 + 5 business days → Thu Jan 25 (weekend skipped)
        assert_eq!(exits[0].date, date(25));
        assert_eq!(exits[1].date, date(25));
    }

    #[test]
    fn risk_free_widens_the_exit_target() {
        let series = sample_series();
        let cfg = BacktestConfig {
            include_risk_free: true,
            ..config()
        };
        let entries = entry_pair(&series, date(17), &cfg).unwrap();
        let exits = exit_pair(&series, &entries, &cfg);

        // SELL exit: 100 * (1 + 0.1 + 0.05) = 115.00
        assert!((exits[0].price - 115.0).abs() < f64::EPSILON);
        // BUY exit: 52.5 * (1 - 0.1 - 0.05) = 44.625 → 44.63 at 2 decimals
        assert!((exits[1].price - 44.63).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_risk_free_rate_is_treated_as_zero() {
        let bars = vec![
            PairBar::new(date(15), quote(103.0, 102.0, 1000), quote(50.0, 50.0, 1000), None),
            PairBar::new(date(16), quote(102.0, 101.0, 1000), quote(50.5, 51.0, 1000), None),
            PairBar::new(date(17), quote(101.0, 100.0, 1000), quote(51.5, 52.0, 1000), None),
            PairBar::new(date(18), quote(100.0, 100.5, 1000), quote(52.5, 53.0, 1000), None),
        ];
        let series = MarketSeries::new(bars, 3);
        let cfg = BacktestConfig {
            include_risk_free: true,
            ..config()
        };
        let entries = entry_pair(&series, date(17), &cfg).unwrap();
        let exits = exit_pair(&series, &entries, &cfg);
        assert!((exits[0].price - 110.0).abs() < f64::EPSILON);
    }

    #[test]
    fn forced_trade_closes_at_bar_close_same_action() {
        let series = sample_series();
        let bar = series.bar(date(18)).unwrap();
        let trade = forced_trade(date(18), Symbol::Wmt, Action::Buy, 476.1905, bar);

        assert_eq!(trade.trip, Trip::Exit);
        assert_eq!(trade.action, Action::Buy);
        assert_eq!(trade.status, Status::Forced);
        assert!((trade.price - 53.0).abs() < f64::EPSILON);
        assert!((trade.size - 476.1905).abs() < f64::EPSILON);
    }

    #[test]
    fn round_to_fractional_share_floor() {
        assert!((round_to(245.098039, 4) - 245.098).abs() < 1e-9);
        assert!((round_to(47.249999, 2) - 47.25).abs() < 1e-9);
    }
}
