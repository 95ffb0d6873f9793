//! Dated CSV files for screener output and outcome reports.
//!
//! Screener runs land in `<screener_dir>/YYYY-MM-DD.csv`, reports in
//! `<report_dir>/YYYY-MM-DD.csv`. Older screener files have no `date`
//! column; their file is named after the day the signals were meant for,
//! so those rows load with that date as the entry bar.

use crate::domain::error::ScreenerError;
use crate::domain::report::Report;
use crate::domain::signal::{DateAnchor, Direction, Signal, SignalMetadata};
use crate::ports::signal_store::SignalStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize)]
struct SignalRecord {
    #[serde(default)]
    date: Option<NaiveDate>,
    symbol: String,
    direction: String,
    kk: f64,
    sl: f64,
    tp: f64,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    distance_tp_atr: Option<f64>,
    #[serde(default)]
    adx_day: Option<f64>,
    #[serde(default)]
    adx_week: Option<f64>,
    #[serde(default)]
    up_volume: Option<i64>,
    #[serde(default)]
    down_volume: Option<i64>,
}

impl From<&Signal> for SignalRecord {
    fn from(signal: &Signal) -> Self {
        SignalRecord {
            date: Some(signal.signal_date),
            symbol: signal.symbol.to_lowercase(),
            direction: signal.direction.to_string(),
            kk: signal.trigger_price,
            sl: signal.stop_loss,
            tp: signal.take_profit,
            industry: signal.metadata.industry.clone(),
            distance_tp_atr: signal.metadata.distance_tp_atr,
            adx_day: signal.metadata.adx_day,
            adx_week: signal.metadata.adx_week,
            up_volume: signal.metadata.up_volume,
            down_volume: signal.metadata.down_volume,
        }
    }
}

impl SignalRecord {
    fn into_signal(self, file_date: NaiveDate) -> Result<Signal, ScreenerError> {
        let direction: Direction = self
            .direction
            .parse()
            .map_err(|reason| ScreenerError::Data { reason })?;
        let (signal_date, anchor) = match self.date {
            Some(date) => (date, DateAnchor::Setup),
            None => (file_date, DateAnchor::Entry),
        };
        Ok(Signal {
            symbol: self.symbol.trim().to_uppercase(),
            direction,
            trigger_price: self.kk,
            stop_loss: self.sl,
            take_profit: self.tp,
            signal_date,
            anchor,
            metadata: SignalMetadata {
                industry: self.industry.filter(|i| !i.is_empty()),
                distance_tp_atr: self.distance_tp_atr,
                adx_day: self.adx_day,
                adx_week: self.adx_week,
                up_volume: self.up_volume,
                down_volume: self.down_volume,
            },
        })
    }
}

#[derive(Debug, Serialize)]
struct ReportRecord<'a> {
    date: NaiveDate,
    symbol: String,
    direction: String,
    kk: f64,
    sl: f64,
    tp: f64,
    risk: f64,
    entry: Option<f64>,
    exit: Option<f64>,
    status: Option<String>,
    duration: Option<usize>,
    r: Option<f64>,
    r_sum: Option<f64>,
    note: &'a str,
}

pub struct CsvSignalStore {
    screener_dir: PathBuf,
    report_dir: PathBuf,
}

impl CsvSignalStore {
    pub fn new(screener_dir: PathBuf, report_dir: PathBuf) -> Self {
        Self {
            screener_dir,
            report_dir,
        }
    }

    fn dated_path(dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(format!("{}.csv", date.format(FILE_DATE_FORMAT)))
    }

    fn screener_files(&self) -> Result<Vec<(NaiveDate, PathBuf)>, ScreenerError> {
        if !self.screener_dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.screener_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let date = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NaiveDate::parse_from_str(s, FILE_DATE_FORMAT).ok());
            match date {
                Some(date) => files.push((date, path)),
                None => {
                    tracing::warn!(path = %path.display(), "screener file name is not a date")
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

impl SignalStore for CsvSignalStore {
    fn write_signals(&self, date: NaiveDate, signals: &[Signal]) -> Result<PathBuf, ScreenerError> {
        fs::create_dir_all(&self.screener_dir)?;
        let path = Self::dated_path(&self.screener_dir, date);
        let mut wtr = csv::Writer::from_path(&path)?;
        for signal in signals {
            wtr.serialize(SignalRecord::from(signal))?;
        }
        wtr.flush()?;
        Ok(path)
    }

    fn load_signals(&self) -> Result<Vec<Signal>, ScreenerError> {
        let mut signals = Vec::new();
        for (file_date, path) in self.screener_files()? {
            let mut rdr = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(&path)?;
            for record in rdr.deserialize::<SignalRecord>() {
                signals.push(record?.into_signal(file_date)?);
            }
        }
        Ok(signals)
    }

    fn write_report(&self, date: NaiveDate, report: &Report) -> Result<PathBuf, ScreenerError> {
        fs::create_dir_all(&self.report_dir)?;
        let path = Self::dated_path(&self.report_dir, date);
        let mut wtr = csv::Writer::from_path(&path)?;
        for row in &report.rows {
            let signal = &row.trade.signal;
            let note = if row.trade.anomaly.is_some() { "tie" } else { "" };
            wtr.serialize(ReportRecord {
                date: signal.signal_date,
                symbol: signal.symbol.to_lowercase(),
                direction: signal.direction.to_string(),
                kk: signal.trigger_price,
                sl: signal.stop_loss,
                tp: signal.take_profit,
                risk: row.risk,
                entry: row.trade.entry,
                exit: row.trade.exit,
                status: row.trade.status.map(|s| s.to_string()),
                duration: row.trade.duration,
                r: row.r,
                r_sum: row.r_sum,
                note,
            })
            .map_err(|e| ScreenerError::Report {
                reason: format!("failed to write {}: {}", path.display(), e),
            })?;
        }
        wtr.flush()?;
        Ok(path)
    }
}
