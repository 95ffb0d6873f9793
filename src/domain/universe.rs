//! Screening universe: listing filters and per-symbol reference-data filters.

use crate::domain::features::SkipReason;
use crate::domain::settings::FilterSettings;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// One line of an exchange listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub symbol: String,
    pub exchange: String,
    pub asset_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolMetadata {
    pub sector: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub next_earnings: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Common stock on one of `exchanges`, uppercased, deduplicated and sorted.
pub fn select_listed(entries: &[ListingEntry], exchanges: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.asset_type.eq_ignore_ascii_case("stock"))
        .filter(|e| exchanges.iter().any(|x| x.eq_ignore_ascii_case(&e.exchange)))
        .map(|e| e.symbol.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sector, country and earnings-window exclusions.
///
/// Fields missing from the metadata never exclude a symbol.
pub fn check_metadata(
    metadata: &SymbolMetadata,
    filter: &FilterSettings,
    run_date: NaiveDate,
) -> Result<(), SkipReason> {
    if let Some(sector) = &metadata.sector {
        if filter.exclude_sectors.iter().any(|s| s.eq_ignore_ascii_case(sector)) {
            return Err(SkipReason::Excluded {
                reason: format!("sector {sector}"),
            });
        }
    }

    if let (Some(target), Some(country)) = (&filter.target_country, &metadata.country) {
        if !target.eq_ignore_ascii_case(country) {
            return Err(SkipReason::Excluded {
                reason: format!("country {country}"),
            });
        }
    }

    if let (Some(days), Some(earnings)) = (filter.earnings_window_days, metadata.next_earnings) {
        let until = (earnings - run_date).num_days();
        if (0..=days).contains(&until) {
            return Err(SkipReason::Excluded {
                reason: format!("earnings on {earnings}"),
            });
        }
    }

    Ok(())
}
