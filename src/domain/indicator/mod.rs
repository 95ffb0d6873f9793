//! Technical indicator implementations.
//!
//! Every indicator is a pure function over a slice of [`OhlcvBar`]s and
//! returns an [`IndicatorSeries`] aligned bar-for-bar with its input. Positions
//! inside an indicator's warm-up window are flagged `valid: false`; readers
//! go through [`IndicatorSeries::value_at`] which maps those to `None`.

pub mod adx;
pub mod atr;
pub mod doji;
pub mod extrema;
pub mod roc;
pub mod rolling;
pub mod sma;
pub mod weekly;

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub fn valid(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }
}

/// Bar field an indicator reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    pub fn extract(self, bar: &OhlcvBar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
            PriceField::Volume => bar.volume as f64,
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        };
        f.write_str(name)
    }
}

/// ATR smoothing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Smoothing {
    /// Trailing arithmetic mean.
    Sma,
    /// Span-based exponential mean, alpha = 2/(n+1), 10-sample warm-up.
    Ema,
    /// Wilder's running mean, alpha = 1/n, n-sample warm-up.
    Rma,
}

impl FromStr for Smoothing {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sma" => Ok(Smoothing::Sma),
            "ema" => Ok(Smoothing::Ema),
            "rma" => Ok(Smoothing::Rma),
            _ => Err(ScreenerError::UnknownSmoothing(s.to_string())),
        }
    }
}

impl fmt::Display for Smoothing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Smoothing::Sma => "sma",
            Smoothing::Ema => "ema",
            Smoothing::Rma => "rma",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma { field: PriceField, period: usize },
    Atr { period: usize, smoothing: Smoothing },
    Roc(usize),
    PctChange(usize),
    Adx(usize),
    RollingMax { field: PriceField, period: usize },
    RollingMin { field: PriceField, period: usize },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn empty(indicator_type: IndicatorType) -> Self {
        Self {
            indicator_type,
            values: Vec::new(),
        }
    }

    /// Value at `index`, or `None` when out of range or still warming up.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.len().checked_sub(1).and_then(|i| self.value_at(i))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma { field, period } => write!(f, "SMA({},{})", field, period),
            IndicatorType::Atr { period, smoothing } => {
                write!(f, "ATR({},{})", period, smoothing)
            }
            IndicatorType::Roc(period) => write!(f, "ROC({})", period),
            IndicatorType::PctChange(period) => write!(f, "PCT_CHANGE({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::RollingMax { field, period } => write!(f, "MAX({},{})", field, period),
            IndicatorType::RollingMin { field, period } => write!(f, "MIN({},{})", field, period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display() {
        let sma = IndicatorType::Sma {
            field: PriceField::Close,
            period: 200,
        };
        assert_eq!(sma.to_string(), "SMA(close,200)");

        let atr = IndicatorType::Atr {
            period: 10,
            smoothing: Smoothing::Sma,
        };
        assert_eq!(atr.to_string(), "ATR(10,sma)");
        assert_eq!(IndicatorType::Adx(14).to_string(), "ADX(14)");
    }

    #[test]
    fn smoothing_parses_known_identifiers() {
        assert_eq!("sma".parse::<Smoothing>().unwrap(), Smoothing::Sma);
        assert_eq!("EMA".parse::<Smoothing>().unwrap(), Smoothing::Ema);
        assert_eq!(" rma ".parse::<Smoothing>().unwrap(), Smoothing::Rma);
    }

    #[test]
    fn smoothing_rejects_unknown_identifier() {
        let err = "wilder".parse::<Smoothing>().unwrap_err();
        assert!(matches!(err, ScreenerError::UnknownSmoothing(s) if s == "wilder"));
    }

    #[test]
    fn value_at_hides_warmup() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Roc(1),
            values: vec![IndicatorPoint::invalid(d), IndicatorPoint::valid(d, 3.0)],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(3.0));
        assert_eq!(series.value_at(2), None);
        assert_eq!(series.last_value(), Some(3.0));
    }

    #[test]
    fn price_field_extracts_volume_as_float() {
        let bar = OhlcvBar {
            symbol: "T".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 1_500_000,
        };
        assert_eq!(PriceField::Volume.extract(&bar), 1_500_000.0);
        assert_eq!(PriceField::High.extract(&bar), 2.0);
    }
}
