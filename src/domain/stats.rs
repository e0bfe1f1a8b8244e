//! Blotter reduction into gain/loss statistics.

use super::bar::Symbol;
use super::blotter::{Action, Blotter, Status, Trip};
use super::series::MarketSeries;

const DAYS_PER_YEAR: f64 = 365.2425;

/// Realized cash flows for one instrument. CANCELED rows are excluded; the
/// BUY/SELL actions already encode the direction of each flow, so
/// `sales − purchases` is the realized gain/loss for long and short legs
/// alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolGainLoss {
    pub symbol: Symbol,
    pub total_sales: f64,
    pub total_purchases: f64,
    pub gain_loss: f64,
}

pub fn gain_loss(symbol: Symbol, blotter: &Blotter) -> SymbolGainLoss {
    let mut total_sales = 0.0_f64;
    let mut total_purchases = 0.0_f64;

    for record in blotter.iter() {
        if record.symbol != symbol || record.status == Status::Canceled {
            continue;
        }
        let notional = record.price * record.size;
        match record.action {
            Action::Sell => total_sales += notional,
            Action::Buy => total_purchases += notional,
        }
    }

    SymbolGainLoss {
        symbol,
        total_sales,
        total_purchases,
        gain_loss: total_sales - total_purchases,
    }
}

/// Order-status counts over the finished blotter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCounts {
    pub filled_entries: usize,
    pub filled_exits: usize,
    pub canceled_exits: usize,
    pub forced_exits: usize,
}

/// Summary figures for one run: a pure reduction over the immutable blotter
/// and the series span, so recomputing always yields identical numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestStats {
    pub orders: OrderCounts,
    pub amzn: SymbolGainLoss,
    pub wmt: SymbolGainLoss,
    pub total_gain_loss: f64,
    pub years: f64,
    pub annualized_gain_loss: f64,
}

impl BacktestStats {
    pub fn compute(series: &MarketSeries, blotter: &Blotter) -> Self {
        let count = |trip: Trip, status: Status| {
            blotter
                .iter()
                .filter(|r| r.trip == trip && r.status == status)
                .count()
        };
        let orders = OrderCounts {
            filled_entries: count(Trip::Entry, Status::Filled),
            filled_exits: count(Trip::Exit, Status::Filled),
            canceled_exits: count(Trip::Exit, Status::Canceled),
            forced_exits: count(Trip::Exit, Status::Forced),
        };

        let amzn = gain_loss(Symbol::Amzn, blotter);
        let wmt = gain_loss(Symbol::Wmt, blotter);
        let total_gain_loss = amzn.gain_loss + wmt.gain_loss;

        let span_days = series
            .data_range()
            .map(|(first, last, _)| (last - first).num_days())
            .unwrap_or(0);
        // Rounded to two decimals before annualizing.
        let years = (span_days as f64 / DAYS_PER_YEAR * 100.0).round() / 100.0;
        let annualized_gain_loss = if years > 0.0 {
            total_gain_loss / years
        } else {
            0.0
        };

        BacktestStats {
            orders,
            amzn,
            wmt,
            total_gain_loss,
            years,
            annualized_gain_loss,
        }
    }
}
