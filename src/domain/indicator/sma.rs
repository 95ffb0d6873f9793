//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(F[i-n+1..=i]) for any bar field F.
//! Warmup: first (n-1) bars invalid.

use crate::domain::indicator::rolling::RollingMean;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, PriceField};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], field: PriceField, period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Sma { field, period };
    if period == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let mut acc = RollingMean::new(period);
    let values = bars
        .iter()
        .map(|bar| {
            acc.push(field.extract(bar));
            match acc.mean() {
                Some(mean) => IndicatorPoint::valid(bar.date, mean),
                None => IndicatorPoint::invalid(bar.date),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
