//! Doji candle detection.
//!
//! A bar is a doji when both the upper and the lower wick are at least twice
//! the body. Body colour and overall size are ignored; equality counts.

use crate::domain::ohlcv::OhlcvBar;

pub fn is_doji(bar: &OhlcvBar) -> bool {
    let body = bar.body();
    bar.upper_wick() >= 2.0 * body && bar.lower_wick() >= 2.0 * body
}

pub fn calculate_doji(bars: &[OhlcvBar]) -> Vec<bool> {
    bars.iter().map(is_doji).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            symbol: "TEST".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn long_wicks_both_sides() {
        assert!(is_doji(&bar(100.0, 104.0, 96.0, 101.0)));
    }

    #[test]
    fn exact_ratio_counts_as_doji() {
        // body 1, wicks exactly 2 each
        assert!(is_doji(&bar(100.0, 103.0, 98.0, 101.0)));
    }

    #[test]
    fn one_short_wick_is_not_doji() {
        assert!(!is_doji(&bar(100.0, 104.0, 99.5, 101.0)));
    }

    #[test]
    fn marubozu_is_not_doji() {
        assert!(!is_doji(&bar(100.0, 110.0, 100.0, 110.0)));
    }

    #[test]
    fn series_matches_per_bar() {
        let bars = vec![bar(100.0, 104.0, 96.0, 101.0), bar(100.0, 110.0, 100.0, 110.0)];
        assert_eq!(calculate_doji(&bars), vec![true, false]);
    }

    proptest! {
        #[test]
        fn swapping_open_and_close_keeps_classification(
            low in 1.0f64..100.0,
            a in 0.0f64..50.0,
            b in 0.0f64..50.0,
            up in 0.0f64..50.0,
        ) {
            let open = low + a;
            let close = low + b;
            let high = open.max(close) + up;
            let original = bar(open, high, low, close);
            let mirrored = bar(close, high, low, open);
            prop_assert_eq!(is_doji(&original), is_doji(&mirrored));
        }
    }
}
