//! Daily OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// |open - close|
    pub fn body(&self) -> f64 {
        (self.open - self.close).abs()
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Zero-range bars carry no price information and are dropped at ingest.
    pub fn is_degenerate(&self) -> bool {
        self.high == self.low
    }

    /// high >= max(open, close) >= min(open, close) >= low, all finite.
    pub fn is_well_formed(&self) -> bool {
        let fields = [self.open, self.high, self.low, self.close];
        fields.iter().all(|v| v.is_finite())
            && self.high >= self.open.max(self.close)
            && self.open.min(self.close) >= self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            symbol: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn candle_anatomy() {
        let bar = sample_bar();
        assert!((bar.body() - 5.0).abs() < f64::EPSILON);
        assert!((bar.upper_wick() - 5.0).abs() < f64::EPSILON);
        assert!((bar.lower_wick() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_and_well_formed() {
        let mut bar = sample_bar();
        assert!(bar.is_well_formed());
        assert!(!bar.is_degenerate());

        bar.high = 90.0;
        assert!(bar.is_degenerate());
        assert!(!bar.is_well_formed());

        let mut nan = sample_bar();
        nan.close = f64::NAN;
        assert!(!nan.is_well_formed());
    }
}
