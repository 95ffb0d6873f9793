//! Persistence port for daily screener output and outcome reports.

use crate::domain::error::ScreenerError;
use crate::domain::report::Report;
use crate::domain::signal::Signal;
use chrono::NaiveDate;
use std::path::PathBuf;

pub trait SignalStore {
    /// Writes one run's signals, returning the file written.
    fn write_signals(&self, date: NaiveDate, signals: &[Signal]) -> Result<PathBuf, ScreenerError>;

    /// Every signal previously written, in no particular order.
    fn load_signals(&self) -> Result<Vec<Signal>, ScreenerError>;

    fn write_report(&self, date: NaiveDate, report: &Report) -> Result<PathBuf, ScreenerError>;
}
