//! Bar cache port and its freshness rule.

use crate::domain::ohlcv::OhlcvBar;
use chrono::{Duration, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct CachedBars {
    pub fetched_at: NaiveDateTime,
    /// Start date the bars were fetched from.
    pub start: NaiveDate,
    pub bars: Vec<OhlcvBar>,
}

pub trait BarCache: Send + Sync {
    fn get(&self, symbol: &str) -> Option<CachedBars>;
    fn put(&self, symbol: &str, entry: CachedBars);
    fn clear(&self);
}

impl<T: BarCache + ?Sized> BarCache for Box<T> {
    fn get(&self, symbol: &str) -> Option<CachedBars> {
        (**self).get(symbol)
    }

    fn put(&self, symbol: &str, entry: CachedBars) {
        (**self).put(symbol, entry)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// Cached bars expire after `max_age` or when the calendar day changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    pub max_age: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        StalenessPolicy {
            max_age: Duration::hours(12),
        }
    }
}

impl StalenessPolicy {
    pub fn hours(hours: i64) -> Self {
        StalenessPolicy {
            max_age: Duration::hours(hours),
        }
    }

    pub fn is_stale(&self, fetched_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        fetched_at.date() != now.date() || now - fetched_at > self.max_age
    }
}
