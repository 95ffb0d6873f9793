//! On-disk bar cache, one CSV per symbol under a cache directory.
//!
//! Each row repeats the fetch timestamp and start date so a file is
//! self-contained. Entries outlive the process, so the staleness policy
//! applies across separate screener runs.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::cache_port::{BarCache, CachedBars};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct CachedBarRecord {
    fetched_at: NaiveDateTime,
    start: NaiveDate,
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn read(&self, symbol: &str) -> Result<Option<CachedBars>, ScreenerError> {
        let path = self.path(symbol);
        if !path.exists() {
            return Ok(None);
        }
        let mut rdr = csv::Reader::from_path(&path)?;
        let mut stamp = None;
        let mut bars = Vec::new();
        for record in rdr.deserialize::<CachedBarRecord>() {
            let record = record?;
            stamp.get_or_insert((record.fetched_at, record.start));
            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date: record.date,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }
        Ok(stamp.map(|(fetched_at, start)| CachedBars {
            fetched_at,
            start,
            bars,
        }))
    }

    fn write(&self, symbol: &str, entry: &CachedBars) -> Result<(), ScreenerError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(symbol);
        let tmp = path.with_extension("csv.tmp");
        let mut wtr = csv::Writer::from_path(&tmp)?;
        for bar in &entry.bars {
            wtr.serialize(CachedBarRecord {
                fetched_at: entry.fetched_at,
                start: entry.start,
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            })?;
        }
        wtr.flush()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl BarCache for FileCache {
    fn get(&self, symbol: &str) -> Option<CachedBars> {
        match self.read(symbol) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "unreadable cache file");
                None
            }
        }
    }

    fn put(&self, symbol: &str, entry: CachedBars) {
        if let Err(e) = self.write(symbol, &entry) {
            tracing::warn!(symbol, error = %e, "failed to write cache file");
        }
    }

    fn clear(&self) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        for path in entries.filter_map(Result::ok).map(|e| e.path()) {
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!(path = %path.display(), error = %e, "cache file not removed");
                }
            }
        }
    }
}
