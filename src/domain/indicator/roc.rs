//! Rate of Change.
//!
//! PCT_CHANGE(n)[i] = (C[i] - C[i-n]) / C[i-n] * 100
//! ROC(n)[i] = round(PCT_CHANGE(n)[i]) to the nearest whole percent.
//! If C[i-n] == 0 the point stays invalid.
//! Warmup: first n bars invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_pct_change(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::PctChange(period),
        values: change_points(bars, period, |pct| pct),
    }
}

pub fn calculate_roc(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Roc(period),
        values: change_points(bars, period, f64::round),
    }
}

fn change_points(bars: &[OhlcvBar], period: usize, finish: fn(f64) -> f64) -> Vec<IndicatorPoint> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i < period {
                return IndicatorPoint::invalid(bar.date);
            }
            let prev_close = bars[i - period].close;
            if prev_close == 0.0 {
                return IndicatorPoint::invalid(bar.date);
            }
            let pct = (bar.close - prev_close) / prev_close * 100.0;
            IndicatorPoint::valid(bar.date, finish(pct))
        })
        .collect()
}
