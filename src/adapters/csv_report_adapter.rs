//! Blotter and summary report adapter.
//!
//! Writes the finished blotter as a CSV file and renders the summary figures
//! as the section-formatted text the backtest prints.

use crate::domain::blotter::Blotter;
use crate::domain::error::PairtraderError;
use crate::domain::stats::{BacktestStats, SymbolGainLoss};
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        blotter: &Blotter,
        _stats: &BacktestStats,
        output_path: &str,
    ) -> Result<(), PairtraderError> {
        let mut writer = csv::Writer::from_path(output_path).map_err(|e| PairtraderError::Data {
            reason: format!("failed to open {}: {}", output_path, e),
        })?;

        writer
            .write_record(["Date", "Symbol", "Trip", "Action", "Price", "Size", "Status"])
            .map_err(|e| PairtraderError::Data {
                reason: format!("CSV write error: {}", e),
            })?;

        for record in blotter.iter() {
            writer
                .write_record([
                    record.date.to_string(),
                    record.symbol.to_string(),
                    record.trip.to_string(),
                    record.action.to_string(),
                    format!("{}", record.price),
                    format!("{:.4}", record.size),
                    record.status.to_string(),
                ])
                .map_err(|e| PairtraderError::Data {
                    reason: format!("CSV write error: {}", e),
                })?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// The summary sections: order counts, per-symbol cash flows, aggregate.
pub fn render_summary(stats: &BacktestStats) -> String {
    let mut lines = Vec::new();

    lines.push("******  Orders  ******".to_string());
    lines.push(format!("Entry Orders: {}", stats.orders.filled_entries));
    lines.push(format!("Filled Exit Orders: {}", stats.orders.filled_exits));
    lines.push(format!(
        "Canceled Exit Orders: {}",
        stats.orders.canceled_exits
    ));
    lines.push(format!("Forced Exit Orders: {}", stats.orders.forced_exits));

    lines.push(String::new());
    lines.extend(symbol_section(&stats.amzn));
    lines.push(String::new());
    lines.extend(symbol_section(&stats.wmt));

    lines.push(String::new());
    lines.push("******  Total Gain/Loss  ******".to_string());
    lines.push(format!("Years: {:.2}", stats.years));
    lines.push(format!(
        "Total Gain or Loss: {}",
        format_currency(stats.total_gain_loss)
    ));
    lines.push(format!(
        "Total Gain or Loss Per Year: {}",
        format_currency(stats.annualized_gain_loss)
    ));

    lines.join("\n")
}

fn symbol_section(figures: &SymbolGainLoss) -> Vec<String> {
    vec![
        format!("******  {}  ******", figures.symbol),
        format!("Total Sales: {}", format_currency(figures.total_sales)),
        format!(
            "Total Purchases: {}",
            format_currency(figures.total_purchases)
        ),
        format!("Gain or Loss: {}", format_currency(figures.gain_loss)),
    ]
}

/// `$1,234,567.89`, sign in front of the dollar sign.
fn format_currency(value: f64) -> String {
    let unsigned = format!("{:.2}", value.abs());
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}
