//! Average True Range with selectable smoothing.
//!
//! TR[0] = H[0] - L[0]; TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! - `sma`: trailing mean of n true ranges, first (n-1) bars invalid.
//! - `rma`: y[0] = TR[0], y[i] = y[i-1] + (TR[i] - y[i-1]) / n, first (n-1) bars invalid.
//! - `ema`: same recursion with alpha = 2/(n+1), first 9 bars invalid.

use crate::domain::indicator::rolling::RollingMean;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, Smoothing};
use crate::domain::ohlcv::OhlcvBar;

/// Warm-up for `ema` smoothing does not scale with the period.
pub const EMA_MIN_SAMPLES: usize = 10;

pub fn true_ranges(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[OhlcvBar], period: usize, smoothing: Smoothing) -> IndicatorSeries {
    let indicator_type = IndicatorType::Atr { period, smoothing };
    if period == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let tr = true_ranges(bars);
    let smoothed = match smoothing {
        Smoothing::Sma => smooth_sma(&tr, period),
        Smoothing::Rma => smooth_exponential(&tr, 1.0 / period as f64, period),
        Smoothing::Ema => smooth_exponential(&tr, 2.0 / (period as f64 + 1.0), EMA_MIN_SAMPLES),
    };

    let values = bars
        .iter()
        .zip(smoothed)
        .map(|(bar, value)| match value {
            Some(v) => IndicatorPoint::valid(bar.date, v),
            None => IndicatorPoint::invalid(bar.date),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

fn smooth_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut acc = RollingMean::new(period);
    values
        .iter()
        .map(|&v| {
            acc.push(v);
            acc.mean()
        })
        .collect()
}

fn smooth_exponential(values: &[f64], alpha: f64, min_samples: usize) -> Vec<Option<f64>> {
    let mut state: Option<f64> = None;
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let next = match state {
                None => v,
                Some(prev) => prev + alpha * (v - prev),
            };
            state = Some(next);
            (i + 1 >= min_samples).then_some(next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            symbol: "TEST".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    fn constant_range_bars(count: u32) -> Vec<OhlcvBar> {
        (1..=count).map(|d| make_bar(d, 110.0, 90.0, 100.0)).collect()
    }

    #[test]
    fn first_true_range_is_high_minus_low() {
        let bars = vec![make_bar(1, 110.0, 100.0, 105.0), make_bar(2, 130.0, 120.0, 125.0)];
        let tr = true_ranges(&bars);
        assert!((tr[0] - 10.0).abs() < 1e-12);
        // gap up: |130 - 105| = 25
        assert!((tr[1] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn sma_smoothing_converges_to_constant_range() {
        let bars = constant_range_bars(12);
        let series = calculate_atr(&bars, 5, Smoothing::Sma);

        for i in 0..4 {
            assert_eq!(series.value_at(i), None);
        }
        for i in 4..12 {
            assert_eq!(series.value_at(i), Some(20.0));
        }
    }

    #[test]
    fn sma_smoothing_is_trailing_mean() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 115.0, 105.0, 110.0),
            make_bar(3, 121.0, 110.0, 115.0),
        ];
        let series = calculate_atr(&bars, 3, Smoothing::Sma);
        // 10, 10, 11
        assert!((series.last_value().unwrap() - 31.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn rma_warmup_matches_period() {
        let bars = constant_range_bars(6);
        let series = calculate_atr(&bars, 4, Smoothing::Rma);
        assert_eq!(series.value_at(2), None);
        assert_eq!(series.value_at(3), Some(20.0));
    }

    #[test]
    fn rma_recursion() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 116.0, 100.0, 105.0),
        ];
        let series = calculate_atr(&bars, 2, Smoothing::Rma);
        // y0 = 10, y1 = 10 + (16 - 10) / 2 = 13
        assert_eq!(series.value_at(0), None);
        assert!((series.value_at(1).unwrap() - 13.0).abs() < 1e-12);
    }

    #[test]
    fn ema_uses_fixed_warmup() {
        let bars = constant_range_bars(12);
        let series = calculate_atr(&bars, 3, Smoothing::Ema);
        assert_eq!(series.value_at(8), None);
        assert_eq!(series.value_at(9), Some(20.0));
    }

    #[test]
    fn series_records_its_smoothing() {
        let bars = constant_range_bars(3);
        let series = calculate_atr(&bars, 2, "sma".parse().unwrap());
        assert_eq!(
            series.indicator_type,
            IndicatorType::Atr {
                period: 2,
                smoothing: Smoothing::Sma
            }
        );
    }

    #[test]
    fn atr_period_0() {
        let bars = constant_range_bars(3);
        assert!(calculate_atr(&bars, 0, Smoothing::Sma).is_empty());
    }
}
