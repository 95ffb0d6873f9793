//! Price history access port.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort: Sync {
    /// Daily bars on or after `start`, ascending by date with unique dates.
    fn fetch_ohlcv(&self, symbol: &str, start: NaiveDate) -> Result<Vec<OhlcvBar>, ScreenerError>;

    /// Symbols making up the screening universe, sorted.
    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError>;
}
