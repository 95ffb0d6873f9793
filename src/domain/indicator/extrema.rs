//! Rolling extrema over a bar field (e.g. highest high of the last n bars).
//! Warmup: first (n-1) bars invalid.

use crate::domain::indicator::rolling::RollingExtreme;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, PriceField};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rolling_max(
    bars: &[OhlcvBar],
    field: PriceField,
    period: usize,
) -> IndicatorSeries {
    rolling(
        bars,
        field,
        IndicatorType::RollingMax { field, period },
        RollingExtreme::max(period),
    )
}

pub fn calculate_rolling_min(
    bars: &[OhlcvBar],
    field: PriceField,
    period: usize,
) -> IndicatorSeries {
    rolling(
        bars,
        field,
        IndicatorType::RollingMin { field, period },
        RollingExtreme::min(period),
    )
}

fn rolling(
    bars: &[OhlcvBar],
    field: PriceField,
    indicator_type: IndicatorType,
    mut acc: RollingExtreme,
) -> IndicatorSeries {
    let values = bars
        .iter()
        .map(|bar| {
            acc.push(field.extract(bar));
            match acc.value() {
                Some(v) => IndicatorPoint::valid(bar.date, v),
                None => IndicatorPoint::invalid(bar.date),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
