#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use candlescreen::adapters::file_config_adapter::FileConfigAdapter;
use candlescreen::domain::error::ScreenerError;
pub use candlescreen::domain::ohlcv::OhlcvBar;
use candlescreen::domain::settings::Settings;
use candlescreen::ports::data_port::DataPort;
use std::collections::HashMap;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(&self, symbol: &str, start: NaiveDate) -> Result<Vec<OhlcvBar>, ScreenerError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScreenerError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| bars.iter().filter(|b| b.date >= start).cloned().collect())
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        let mut symbols: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` consecutive weekdays starting at `start`.
pub fn business_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = start;
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day = day.succ_opt().unwrap();
    }
    days
}

pub fn bar(
    symbol: &str,
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open,
        high,
        low,
        close,
        volume,
    }
}

pub const SETUP_START: (i32, u32, u32) = (2023, 1, 2);
pub const SETUP_BARS: usize = 255;

/// 250 bars of steady advance, four sharp down days, then a small bullish
/// bar on the last day (2023-12-22). The last bar matches the LONG rule set
/// with default thresholds: ATR(10) = 0.71, trigger 96.70, stop 95.96,
/// target 97.88.
pub fn long_setup_bars(symbol: &str) -> Vec<OhlcvBar> {
    let (y, m, d) = SETUP_START;
    let days = business_days(date(y, m, d), SETUP_BARS);
    let mut bars = Vec::with_capacity(SETUP_BARS);

    for (i, day) in days.iter().enumerate().take(250) {
        let close = 50.0 + 0.2 * i as f64;
        bars.push(bar(symbol, *day, close - 0.1, close + 0.1, close - 0.2, close, 3_000_000));
    }

    let mut open = bars[249].close;
    for day in &days[250..254] {
        let close = open - 1.0;
        bars.push(bar(symbol, *day, open, open + 0.1, close - 0.1, close, 1_500_000));
        open = close;
    }

    bars.push(bar(symbol, days[254], 95.9, 96.6, 95.8, 96.5, 1_500_000));
    bars
}

/// Price mirror of [`long_setup_bars`] around 200; matches the SHORT rule set
/// with trigger 103.30, stop 104.04, target 102.12.
pub fn short_setup_bars(symbol: &str) -> Vec<OhlcvBar> {
    long_setup_bars(symbol).into_iter().map(mirror).collect()
}

pub fn mirror(b: OhlcvBar) -> OhlcvBar {
    OhlcvBar {
        open: 200.0 - b.open,
        high: 200.0 - b.low,
        low: 200.0 - b.high,
        close: 200.0 - b.close,
        ..b
    }
}

/// Sideways series that passes every eligibility filter but matches nothing.
pub fn flat_bars(symbol: &str, count: usize) -> Vec<OhlcvBar> {
    let (y, m, d) = SETUP_START;
    business_days(date(y, m, d), count)
        .into_iter()
        .enumerate()
        .map(|(i, day)| {
            let close = if i % 2 == 0 { 40.0 } else { 40.5 };
            bar(symbol, day, 40.2, 41.0, 39.5, close, 2_000_000)
        })
        .collect()
}

/// Bars after the setup date for forward simulation.
pub fn forward_bars(
    symbol: &str,
    after: NaiveDate,
    ohlc: &[(f64, f64, f64, f64)],
) -> Vec<OhlcvBar> {
    business_days(after.succ_opt().unwrap(), ohlc.len())
        .into_iter()
        .zip(ohlc)
        .map(|(day, &(o, h, l, c))| bar(symbol, day, o, h, l, c, 1_000_000))
        .collect()
}

pub fn write_bars_csv(dir: &Path, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("Date,Open,High,Low,Close,Volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

pub fn settings_ini(data_dir: &Path, work_dir: &Path) -> String {
    format!(
        "[data]\ndir = {}\n\n[report]\nscreener_dir = {}\nreport_dir = {}\n",
        data_dir.display(),
        work_dir.join("screener").display(),
        work_dir.join("report").display()
    )
}

pub fn default_settings(data_dir: &Path, work_dir: &Path) -> Settings {
    let ini = settings_ini(data_dir, work_dir);
    let adapter = FileConfigAdapter::from_string(&ini).unwrap();
    Settings::from_config(&adapter).unwrap()
}
