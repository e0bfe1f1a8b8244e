//! Backtest engine: the day-by-day state walk.
//!
//! The run state is FLAT or OPEN, recomputed each bar from the blotter: OPEN
//! iff any exit row is still PENDING. A flat day with a negative correlation
//! coefficient opens a new pair position (entries fill at the *next* bar's
//! open); an open day monitors each pending exit leg independently — force
//! close past expiry, fill on a limit touch, otherwise hold. Exits still
//! pending after the last bar stay pending.

use super::bar::Quote;
use super::blotter::{Action, Blotter, Status};
use super::signal::DirectionPolicy;
use super::trade_factory::{entry_pair, exit_pair, forced_trade};
use super::series::MarketSeries;

/// Tunable parameters for one run. Passed explicitly into [`run_backtest`];
/// nothing is ambient, so runs are independently reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Correlation/signal window length in bars.
    pub period: usize,
    /// Dollar notional per leg.
    pub lot_value: f64,
    /// Target fractional price move defining the exit limit.
    pub gain_cap: f64,
    /// Add the entry date's risk-free rate to the exit target.
    pub include_risk_free: bool,
    /// Business days before an unfilled exit is force-closed.
    pub holding_period_cap_days: u32,
    pub direction_policy: DirectionPolicy,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            period: 3,
            lot_value: 25_000.0,
            gain_cap: 0.10,
            include_risk_free: false,
            holding_period_cap_days: 5,
            direction_policy: DirectionPolicy::default(),
        }
    }
}

/// Run the simulation over the whole series, returning a fresh blotter.
///
/// The series must have been derived with the same `period` as the config so
/// the correlation column matches the signal window.
pub fn run_backtest(series: &MarketSeries, config: &BacktestConfig) -> Blotter {
    debug_assert_eq!(
        series.period(),
        config.period,
        "series derived with a different correlation period than the config"
    );

    let mut blotter = Blotter::new();

    for bar in series.bars() {
        let pending = blotter.pending_exits();

        if pending.is_empty() {
            // FLAT: an undefined correlation (warmup) never compares below zero.
            if !bar.corr_coef.is_some_and(|corr| corr < 0.0) {
                continue;
            }
            // Warmup window or signal on the last bar: cannot open, skip the bar.
            let Ok(entries) = entry_pair(series, bar.date, config) else {
                continue;
            };
            let exits = exit_pair(series, &entries, config);
            for trade in entries {
                blotter.push(trade);
            }
            for trade in exits {
                blotter.push(trade);
            }
        } else {
            // OPEN: each pending leg resolves independently.
            for id in pending {
                let Some(record) = blotter.get(id) else {
                    continue;
                };
                let (exit_date, symbol, action, price, size) = (
                    record.date,
                    record.symbol,
                    record.action,
                    record.price,
                    record.size,
                );

                if exit_date < bar.date {
                    // Expiry passed without a fill: cancel the limit order and
                    // close at today's market close instead.
                    blotter.set_status(id, Status::Canceled);
                    blotter.push(forced_trade(bar.date, symbol, action, size, bar));
                } else if limit_touched(action, price, bar.quote(symbol)) {
                    blotter.set_status(id, Status::Filled);
                }
            }
        }
    }

    blotter
}

fn limit_touched(action: Action, limit_price: f64, quote: &Quote) -> bool {
    match action {
        Action::Sell => quote.high >= limit_price,
        Action::Buy => quote.low <= limit_price,
    }
}
