//! CSV file data adapter.
//!
//! Reads the two-instrument daily history (`amzn_*` / `wmt_*` columns) and an
//! optional risk-free rate file, left-merging the rates onto the history by
//! date. History rows may arrive in any order, newest-first included; bars
//! are returned sorted ascending.

use crate::domain::bar::{PairBar, Quote};
use crate::domain::error::PairtraderError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CsvAdapter {
    history_path: PathBuf,
    risk_free_path: Option<PathBuf>,
}

impl CsvAdapter {
    pub fn new(history_path: PathBuf, risk_free_path: Option<PathBuf>) -> Self {
        Self {
            history_path,
            risk_free_path,
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PairtraderError> {
        let history_path = config
            .get_string("data", "history_path")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PairtraderError::ConfigMissing {
                section: "data".to_string(),
                key: "history_path".to_string(),
            })?;
        let risk_free_path = config
            .get_string("data", "risk_free_path")
            .filter(|s| !s.trim().is_empty());
        Ok(Self::new(
            PathBuf::from(history_path),
            risk_free_path.map(PathBuf::from),
        ))
    }

    /// Rates keyed by date, converted from percent to fraction. Empty map
    /// when no rate file is configured.
    fn load_risk_free(&self) -> Result<HashMap<NaiveDate, f64>, PairtraderError> {
        let Some(path) = &self.risk_free_path else {
            return Ok(HashMap::new());
        };
        let content = fs::read_to_string(path).map_err(|e| PairtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = read_headers(&mut rdr)?;
        let date_idx = column(&headers, "Date")?;
        let rate_idx = column(&headers, "interest_rate")?;

        let mut rates = HashMap::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PairtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let date = parse_date(&record, date_idx)?;
            let rate = parse_f64(&record, rate_idx, "interest_rate")?;
            rates.insert(date, rate / 100.0);
        }
        Ok(rates)
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_history(&self) -> Result<Vec<PairBar>, PairtraderError> {
        let rates = self.load_risk_free()?;

        let content =
            fs::read_to_string(&self.history_path).map_err(|e| PairtraderError::Data {
                reason: format!("failed to read {}: {}", self.history_path.display(), e),
            })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = read_headers(&mut rdr)?;
        let date_idx = column(&headers, "Date")?;
        let amzn_cols = QuoteColumns::resolve(&headers, "amzn")?;
        let wmt_cols = QuoteColumns::resolve(&headers, "wmt")?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PairtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let date = parse_date(&record, date_idx)?;
            bars.push(PairBar::new(
                date,
                amzn_cols.parse(&record)?,
                wmt_cols.parse(&record)?,
                rates.get(&date).copied(),
            ));
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Header indices of one instrument's OHLCV columns.
struct QuoteColumns {
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl QuoteColumns {
    fn resolve(headers: &csv::StringRecord, prefix: &str) -> Result<Self, PairtraderError> {
        Ok(QuoteColumns {
            open: column(headers, &format!("{prefix}_Open"))?,
            high: column(headers, &format!("{prefix}_High"))?,
            low: column(headers, &format!("{prefix}_Low"))?,
            close: column(headers, &format!("{prefix}_Close"))?,
            volume: column(headers, &format!("{prefix}_Volume"))?,
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<Quote, PairtraderError> {
        Ok(Quote {
            open: parse_f64(record, self.open, "open")?,
            high: parse_f64(record, self.high, "high")?,
            low: parse_f64(record, self.low, "low")?,
            close: parse_f64(record, self.close, "close")?,
            volume: parse_i64(record, self.volume, "volume")?,
        })
    }
}

fn read_headers(
    rdr: &mut csv::Reader<&[u8]>,
) -> Result<csv::StringRecord, PairtraderError> {
    rdr.headers()
        .map(|h| h.clone())
        .map_err(|e| PairtraderError::Data {
            reason: format!("CSV header error: {}", e),
        })
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, PairtraderError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| PairtraderError::Data {
            reason: format!("missing column {name}"),
        })
}

fn field<'a>(
    record: &'a csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<&'a str, PairtraderError> {
    record.get(idx).ok_or_else(|| PairtraderError::Data {
        reason: format!("missing {name} field"),
    })
}

fn parse_date(record: &csv::StringRecord, idx: usize) -> Result<NaiveDate, PairtraderError> {
    let raw = field(record, idx, "date")?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| PairtraderError::Data {
        reason: format!("invalid date {raw:?}: {e}"),
    })
}

fn parse_f64(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, PairtraderError> {
    field(record, idx, name)?
        .parse()
        .map_err(|e| PairtraderError::Data {
            reason: format!("invalid {name} value: {e}"),
        })
}

fn parse_i64(record: &csv::StringRecord, idx: usize, name: &str) -> Result<i64, PairtraderError> {
    field(record, idx, name)?
        .parse()
        .map_err(|e| PairtraderError::Data {
            reason: format!("invalid {name} value: {e}"),
        })
}
