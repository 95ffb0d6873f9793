//! Daily → weekly resampling.
//!
//! Bars are bucketed by ISO (year, week). Each bucket yields one bar:
//! open = first open, close = last close, high = max high, low = min low,
//! volume = sum of volumes, date = last daily date in the bucket.

use crate::domain::ohlcv::OhlcvBar;
use chrono::Datelike;
use std::collections::BTreeMap;

/// ISO (year, week) bucket a date belongs to.
pub fn week_key(date: chrono::NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

pub fn resample_week(bars: &[OhlcvBar]) -> Vec<OhlcvBar> {
    let mut buckets: BTreeMap<(i32, u32), OhlcvBar> = BTreeMap::new();

    for bar in bars {
        buckets
            .entry(week_key(bar.date))
            .and_modify(|week| {
                if bar.date < week.date {
                    week.open = bar.open;
                } else {
                    week.date = bar.date;
                    week.close = bar.close;
                }
                week.high = week.high.max(bar.high);
                week.low = week.low.min(bar.low);
                week.volume += bar.volume;
            })
            .or_insert_with(|| bar.clone());
    }

    let mut weeks: Vec<OhlcvBar> = buckets.into_values().collect();
    weeks.sort_by_key(|w| w.date);
    weeks
}
