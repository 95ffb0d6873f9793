//! Daily screening run over a universe of symbols.
//!
//! Symbols are independent, so each one is fetched, filtered, featurised and
//! matched on the rayon pool. Output order does not depend on scheduling.

use crate::domain::features::{build_features, SkipReason};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pattern::match_pattern;
use crate::domain::settings::Settings;
use crate::domain::signal::Signal;
use crate::domain::universe::{check_metadata, SkippedSymbol};
use crate::ports::data_port::DataPort;
use crate::ports::metadata_port::MetadataPort;
use chrono::NaiveDate;
use rayon::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenResult {
    /// Sorted by symbol.
    pub signals: Vec<Signal>,
    /// Sorted by symbol.
    pub skipped: Vec<SkippedSymbol>,
    /// Symbols that passed every filter without matching a rule set.
    pub screened: usize,
}

enum SymbolResult {
    Matched(Signal),
    NoMatch,
    Skipped(SkippedSymbol),
}

pub fn screen_universe(
    data: &dyn DataPort,
    metadata: Option<&dyn MetadataPort>,
    symbols: &[String],
    settings: &Settings,
    run_date: NaiveDate,
) -> ScreenResult {
    let results: Vec<SymbolResult> = symbols
        .par_iter()
        .map(|symbol| screen_symbol(data, metadata, symbol, settings, run_date))
        .collect();

    let mut out = ScreenResult::default();
    for result in results {
        match result {
            SymbolResult::Matched(signal) => out.signals.push(signal),
            SymbolResult::NoMatch => out.screened += 1,
            SymbolResult::Skipped(skip) => out.skipped.push(skip),
        }
    }
    out.signals.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    out.skipped.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    tracing::info!(
        universe = symbols.len(),
        signals = out.signals.len(),
        skipped = out.skipped.len(),
        %run_date,
        "screening finished"
    );
    out
}

fn screen_symbol(
    data: &dyn DataPort,
    metadata: Option<&dyn MetadataPort>,
    symbol: &str,
    settings: &Settings,
    run_date: NaiveDate,
) -> SymbolResult {
    let skip = |reason: SkipReason| {
        tracing::debug!(symbol, %reason, "skipping");
        SymbolResult::Skipped(SkippedSymbol {
            symbol: symbol.to_string(),
            reason,
        })
    };

    let info = match metadata.map(|port| port.lookup(symbol)) {
        Some(Ok(info)) => info,
        Some(Err(e)) => {
            tracing::warn!(symbol, error = %e, "metadata lookup failed");
            None
        }
        None => None,
    };
    if let Some(info) = &info {
        if let Err(reason) = check_metadata(info, &settings.filter, run_date) {
            return skip(reason);
        }
    }

    let mut bars: Vec<OhlcvBar> = match data.fetch_ohlcv(symbol, settings.data.history_start) {
        Ok(bars) => bars,
        Err(e) => {
            tracing::warn!(symbol, error = %e, "could not load bars");
            return skip(SkipReason::NoData);
        }
    };
    bars.retain(|b| b.date <= run_date);

    let features = match build_features(symbol, &bars, &settings.features) {
        Ok(features) => features,
        Err(reason) => return skip(reason),
    };

    match match_pattern(&features, &settings.pattern) {
        Some(mut signal) => {
            signal.metadata.industry = info.and_then(|i| i.industry);
            tracing::debug!(
                symbol,
                direction = %signal.direction,
                trigger = signal.trigger_price,
                "signal"
            );
            SymbolResult::Matched(signal)
        }
        None => SymbolResult::NoMatch,
    }
}
