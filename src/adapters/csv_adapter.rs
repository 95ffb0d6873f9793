//! CSV file data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with a
//! `Date,Open,High,Low,Close,Volume` header (column names are matched
//! case-insensitively). Rows with a missing value, a zero range, or a
//! malformed price are dropped; flat-body rows are dropped when configured.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::universe::{select_listed, ListingEntry};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct BarRecord {
    #[serde(alias = "Date", alias = "DATE")]
    date: String,
    #[serde(alias = "Open")]
    open: Option<f64>,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
    #[serde(alias = "Volume")]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ListingRecord {
    symbol: String,
    exchange: String,
    #[serde(rename = "assetType")]
    asset_type: String,
}

pub struct CsvAdapter {
    base_path: PathBuf,
    listing: Option<PathBuf>,
    exchanges: Vec<String>,
    drop_flat_body: bool,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            listing: None,
            exchanges: Vec::new(),
            drop_flat_body: false,
        }
    }

    /// Take the universe from a listing file instead of the directory.
    pub fn with_listing(mut self, listing: PathBuf, exchanges: Vec<String>) -> Self {
        self.listing = Some(listing);
        self.exchanges = exchanges;
        self
    }

    pub fn drop_flat_body(mut self, drop: bool) -> Self {
        self.drop_flat_body = drop;
        self
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn to_bar(&self, symbol: &str, record: BarRecord) -> Option<OhlcvBar> {
        let date = NaiveDate::parse_from_str(record.date.get(..10)?, "%Y-%m-%d").ok()?;
        let bar = OhlcvBar {
            symbol: symbol.to_string(),
            date,
            open: record.open?,
            high: record.high?,
            low: record.low?,
            close: record.close?,
            volume: record.volume?.round() as i64,
        };
        if !bar.is_well_formed() || bar.is_degenerate() {
            return None;
        }
        if self.drop_flat_body && bar.open == bar.close {
            return None;
        }
        Some(bar)
    }
}

fn read_listing(path: &Path) -> Result<Vec<ListingEntry>, ScreenerError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();
    for record in rdr.deserialize::<ListingRecord>() {
        let record = record?;
        entries.push(ListingEntry {
            symbol: record.symbol,
            exchange: record.exchange,
            asset_type: record.asset_type,
        });
    }
    Ok(entries)
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(&self, symbol: &str, start: NaiveDate) -> Result<Vec<OhlcvBar>, ScreenerError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| ScreenerError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.deserialize::<BarRecord>() {
            let Ok(record) = result else {
                dropped += 1;
                continue;
            };
            match self.to_bar(symbol, record) {
                Some(bar) if bar.date >= start => bars.push(bar),
                Some(_) => {}
                None => dropped += 1,
            }
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        if dropped > 0 {
            tracing::debug!(symbol, dropped, "dropped unusable rows");
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        if let Some(listing) = &self.listing {
            return Ok(select_listed(&read_listing(listing)?, &self.exchanges));
        }

        let entries = fs::read_dir(&self.base_path).map_err(|e| ScreenerError::Data {
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_uppercase());
            }
        }

        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "Date,Open,High,Low,Close,Volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-18,110.0,110.0,110.0,110.0,1000\n\
            2024-01-19,111.0,114.0,109.0,,7000\n\
            2024-01-22,112.0,113.0,108.0,112.0,8000.0\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(path.join("CBA.csv"), "Date,Open,High,Low,Close,Volume\n").unwrap();
        fs::write(path.join("notes.txt"), "not a csv").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_ohlcv_cleans_and_sorts() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = adapter.fetch_ohlcv("BHP", start).unwrap();

        let dates: Vec<String> = bars.iter().map(|b| b.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-15", "2024-01-16", "2024-01-17", "2024-01-22"]);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[3].volume, 8000);
        assert_eq!(bars[0].symbol, "BHP");
    }

    #[test]
    fn fetch_ohlcv_respects_start() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        let bars = adapter.fetch_ohlcv("bhp", start).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, start);
    }

    #[test]
    fn flat_body_rows_dropped_when_enabled() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path).drop_flat_body(true);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = adapter.fetch_ohlcv("BHP", start).unwrap();
        assert!(bars.iter().all(|b| b.open != b.close));
        assert_eq!(bars.len(), 3);
    }

    #[test]
    fn fetch_ohlcv_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            adapter.fetch_ohlcv("XYZ", start),
            Err(ScreenerError::Data { .. })
        ));
    }

    #[test]
    fn list_symbols_from_directory() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["BHP", "CBA"]);
    }

    #[test]
    fn list_symbols_from_listing() {
        let (_dir, path) = setup_test_data();
        let listing = path.join("listing.csv");
        fs::write(
            &listing,
            "symbol,exchange,assetType\nMSFT,NASDAQ,Stock\nSPY,NYSE ARCA,ETF\nIBM,NYSE,Stock\n",
        )
        .unwrap();

        let adapter =
            CsvAdapter::new(path).with_listing(listing, vec!["NASDAQ".into(), "NYSE".into()]);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["IBM", "MSFT"]);
    }
}
