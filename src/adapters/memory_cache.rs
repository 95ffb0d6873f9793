//! In-process bar cache and the caching [`DataPort`] decorator.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::cache_port::{BarCache, CachedBars, StalenessPolicy};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedBars>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BarCache for MemoryCache {
    fn get(&self, symbol: &str) -> Option<CachedBars> {
        let entries = self.entries.lock().ok()?;
        entries.get(symbol).cloned()
    }

    fn put(&self, symbol: &str, entry: CachedBars) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(symbol.to_string(), entry);
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Serves bars from `cache` while fresh, otherwise fetches from `inner`.
///
/// An entry holds the history from the start it was fetched with; a request
/// is answered from cache only when it asks for the same or a later start.
pub struct CachingDataPort<D, C> {
    inner: D,
    cache: C,
    policy: StalenessPolicy,
    clock: Clock,
}

impl<D: DataPort, C: BarCache> CachingDataPort<D, C> {
    pub fn new(inner: D, cache: C, policy: StalenessPolicy) -> Self {
        Self {
            inner,
            cache,
            policy,
            clock: Box::new(|| chrono::Local::now().naive_local()),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<D: DataPort, C: BarCache> DataPort for CachingDataPort<D, C> {
    fn fetch_ohlcv(&self, symbol: &str, start: NaiveDate) -> Result<Vec<OhlcvBar>, ScreenerError> {
        let now = (self.clock)();
        if let Some(entry) = self.cache.get(symbol) {
            if entry.start <= start && !self.policy.is_stale(entry.fetched_at, now) {
                tracing::trace!(symbol, "bar cache hit");
                return Ok(entry.bars.into_iter().filter(|b| b.date >= start).collect());
            }
        }

        let bars = self.inner.fetch_ohlcv(symbol, start)?;
        self.cache.put(
            symbol,
            CachedBars {
                fetched_at: now,
                start,
                bars: bars.clone(),
            },
        );
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        self.inner.list_symbols()
    }
}
