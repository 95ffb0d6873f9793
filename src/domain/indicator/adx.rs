//! Average Directional Index (Wilder).
//!
//! +DM = H[i]-H[i-1] when it exceeds L[i-1]-L[i] and is positive, else 0 (mirror for -DM).
//! TR, +DM and -DM are Wilder-smoothed: seed = sum of the first n values
//! (bars 1..=n), then S = S - S/n + x.
//! +DI = 100 * S(+DM) / S(TR), -DI likewise, DX = 100 * |+DI - -DI| / (+DI + -DI).
//! ADX seed = mean of the first n DX values, then ADX = (ADX*(n-1) + DX) / n.
//! Warmup: first (2n-1) bars invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Adx(period);
    if period == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let n = period as f64;
    let mut values = Vec::with_capacity(bars.len());

    let mut tr_sum = 0.0;
    let mut plus_sum = 0.0;
    let mut minus_sum = 0.0;
    let mut dx_sum = 0.0;
    let mut adx: Option<f64> = None;

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let prev = &bars[i - 1];
        let up = bar.high - prev.high;
        let down = prev.low - bar.low;
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
        let tr = bar.true_range(prev.close);

        if i <= period {
            tr_sum += tr;
            plus_sum += plus_dm;
            minus_sum += minus_dm;
        } else {
            tr_sum = tr_sum - tr_sum / n + tr;
            plus_sum = plus_sum - plus_sum / n + plus_dm;
            minus_sum = minus_sum - minus_sum / n + minus_dm;
        }

        if i < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let dx = directional_index(tr_sum, plus_sum, minus_sum);

        // DX is defined from bar n onwards; the ADX seed needs n of them.
        if i < 2 * period - 1 {
            dx_sum += dx;
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let next = match adx {
            None => (dx_sum + dx) / n,
            Some(prev_adx) => (prev_adx * (n - 1.0) + dx) / n,
        };
        adx = Some(next);
        values.push(IndicatorPoint::valid(bar.date, next));
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

fn directional_index(tr_sum: f64, plus_sum: f64, minus_sum: f64) -> f64 {
    if tr_sum <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_sum / tr_sum;
    let minus_di = 100.0 * minus_sum / tr_sum;
    let di_sum = plus_di + minus_di;
    if di_sum <= 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / di_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trending_bars(count: usize, step: f64) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..count)
            .map(|i| {
                let base = 100.0 + step * i as f64;
                OhlcvBar {
                    symbol: "TEST".into(),
                    date: start + chrono::Duration::days(i as i64),
                    open: base,
                    high: base + 1.0,
                    low: base - 1.0,
                    close: base + 0.5,
                    volume: 1000,
                }
            })
            .collect()
    }

    #[test]
    fn adx_warmup_is_two_periods_minus_one() {
        let bars = trending_bars(40, 1.0);
        let series = calculate_adx(&bars, 14);

        assert_eq!(series.len(), 40);
        assert_eq!(series.value_at(26), None);
        assert!(series.value_at(27).is_some());
    }

    #[test]
    fn steady_uptrend_has_maximal_strength() {
        // Every bar makes a higher high and a higher low: -DM is always 0,
        // so DX is 100 on every bar and ADX converges to 100.
        let bars = trending_bars(40, 1.0);
        let series = calculate_adx(&bars, 5);
        let last = series.last_value().unwrap();
        assert!((last - 100.0).abs() < 1e-9);
    }

    #[test]
    fn steady_downtrend_has_maximal_strength() {
        let bars = trending_bars(40, -1.0);
        let series = calculate_adx(&bars, 5);
        assert!((series.last_value().unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn flat_market_has_no_strength() {
        let bars = trending_bars(30, 0.0);
        let series = calculate_adx(&bars, 5);
        assert_eq!(series.last_value(), Some(0.0));
    }

    #[test]
    fn choppy_market_is_weaker_than_trend() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars: Vec<OhlcvBar> = (0..60)
            .map(|i| {
                let base = if i % 2 == 0 { 100.0 } else { 103.0 };
                OhlcvBar {
                    symbol: "TEST".into(),
                    date: start + chrono::Duration::days(i),
                    open: base,
                    high: base + 1.0,
                    low: base - 1.0,
                    close: base,
                    volume: 1000,
                }
            })
            .collect();
        let chop = calculate_adx(&bars, 5).last_value().unwrap();
        let trend = calculate_adx(&trending_bars(60, 1.0), 5).last_value().unwrap();
        assert!(chop < trend);
    }

    #[test]
    fn hand_computed_wilder_values() {
        // period 2
        // bar  +DM -DM  TR   S(TR)  S(+DM) S(-DM)  DX
        //  1    1   0   2    -      -      -       -
        //  2    1   0   3    5      2      0       100
        //  3    0   2   4    6.5    1      2       100/3
        //  4    1   0   4    7.25   1.5    1       20
        //  5    0   2   5    8.625  0.75   2.5     700/13
        let start = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        let hlc = [
            (10.0, 8.0, 9.0),
            (11.0, 9.0, 10.0),
            (12.0, 9.0, 11.0),
            (11.0, 7.0, 8.0),
            (12.0, 8.0, 11.0),
            (10.0, 6.0, 7.0),
        ];
        let bars: Vec<OhlcvBar> = hlc
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| OhlcvBar {
                symbol: "TEST".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high,
                low,
                close,
                volume: 1000,
            })
            .collect();

        let series = calculate_adx(&bars, 2);
        assert_eq!(series.value_at(2), None);
        // seed = (100 + 100/3) / 2
        assert!((series.value_at(3).unwrap() - 200.0 / 3.0).abs() < 1e-9);
        assert!((series.value_at(4).unwrap() - 130.0 / 3.0).abs() < 1e-9);
        assert!((series.value_at(5).unwrap() - 3790.0 / 78.0).abs() < 1e-9);
    }

    #[test]
    fn adx_period_0() {
        assert!(calculate_adx(&trending_bars(5, 1.0), 0).is_empty());
    }
}
