//! Trade signal emitted by the pattern matcher.
//!
//! A signal is self-describing: the outcome simulator needs nothing but the
//! signal and the bars that follow its setup date.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => f.write_str("LONG"),
            Direction::Short => f.write_str("SHORT"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LONG" => Ok(Direction::Long),
            "SHORT" => Ok(Direction::Short),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// What a signal's date refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DateAnchor {
    /// The bar the pattern matched on; the entry bar is the next one.
    #[default]
    Setup,
    /// The day the signal was published for, which is itself the entry bar.
    Entry,
}

/// Informational fields carried alongside the price levels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalMetadata {
    pub industry: Option<String>,
    pub distance_tp_atr: Option<f64>,
    pub adx_day: Option<f64>,
    pub adx_week: Option<f64>,
    pub up_volume: Option<i64>,
    pub down_volume: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    /// Entry trigger ("kk").
    pub trigger_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub signal_date: NaiveDate,
    pub anchor: DateAnchor,
    pub metadata: SignalMetadata,
}

impl Signal {
    /// |trigger - stop|
    pub fn risk(&self) -> f64 {
        (self.trigger_price - self.stop_loss).abs()
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
