//! Per-symbol feature builder.
//!
//! Turns a daily OHLCV series into a table of [`FeatureRow`]s (one per bar)
//! and the weekly counterpart. Every field of row `i` depends only on bars
//! `0..=i`, so the last row never sees the future.
//!
//! [`build_features`] applies the warm-up and liquidity/price filters and
//! returns only the final daily and weekly rows, which is all the pattern
//! matcher consumes.

use crate::domain::indicator::adx::calculate_adx;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::doji::calculate_doji;
use crate::domain::indicator::extrema::{calculate_rolling_max, calculate_rolling_min};
use crate::domain::indicator::roc::{calculate_pct_change, calculate_roc};
use crate::domain::indicator::rolling::RollingMean;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::weekly::resample_week;
use crate::domain::indicator::{IndicatorSeries, PriceField, Smoothing};
use crate::domain::ohlcv::OhlcvBar;
use chrono::{Datelike, NaiveDate, Weekday};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    pub min_bars: usize,
    pub volume_avg_period: usize,
    pub min_avg_volume: f64,
    pub min_close: f64,
    pub sma_short: usize,
    pub sma_long: usize,
    pub atr_period: usize,
    pub atr_smoothing: Smoothing,
    pub adx_period: usize,
    pub weekly_adx_period: usize,
    pub roc_period: usize,
    pub momentum_short: usize,
    pub momentum_medium: usize,
    pub breakout_short: usize,
    pub breakout_long: usize,
    pub volume_regime_window: usize,
    pub exclude_triple_witching: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            min_bars: 200,
            volume_avg_period: 10,
            min_avg_volume: 1_000_000.0,
            min_close: 10.0,
            sma_short: 5,
            sma_long: 200,
            atr_period: 10,
            atr_smoothing: Smoothing::Sma,
            adx_period: 14,
            weekly_adx_period: 14,
            roc_period: 10,
            momentum_short: 5,
            momentum_medium: 60,
            breakout_short: 3,
            breakout_long: 8,
            volume_regime_window: 5,
            exclude_triple_witching: true,
        }
    }
}

/// One daily bar plus everything derived from it and its history.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,

    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub atr: Option<f64>,
    pub adx: Option<f64>,
    pub roc: Option<f64>,
    pub momentum_short: Option<f64>,
    pub momentum_medium: Option<f64>,

    pub high_max_short: Option<f64>,
    pub low_min_short: Option<f64>,
    pub high_max_long: Option<f64>,
    pub low_min_long: Option<f64>,

    pub doji: bool,
    pub prev_open: Option<f64>,
    pub prev_high: Option<f64>,
    pub prev_low: Option<f64>,
    pub prev_close: Option<f64>,
    pub prev_doji: Option<bool>,

    /// False while the long SMA is still warming up.
    pub close_above_sma_long: bool,
    /// (highest high over the short window - close) / atr
    pub atr_distance_high_short: Option<f64>,
    /// (close - lowest low over the short window) / atr
    pub atr_distance_low_short: Option<f64>,
    /// (highest high over the long window - high) / atr
    pub atr_distance_high_long: Option<f64>,
    /// (low - lowest low over the long window) / atr
    pub atr_distance_low_long: Option<f64>,

    pub up_volume: Option<f64>,
    pub down_volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub adx: Option<f64>,
}

/// Latest daily and weekly rows for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub symbol: String,
    pub day: FeatureRow,
    pub week: WeekRow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize, minimum: usize },
    LowVolume { average: f64, minimum: f64 },
    LowPrice { close: f64, minimum: f64 },
    Excluded { reason: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::InsufficientBars { bars, minimum } => {
                write!(f, "only {} bars, minimum {} required", bars, minimum)
            }
            SkipReason::LowVolume { average, minimum } => {
                write!(f, "average volume {:.0} below {:.0}", average, minimum)
            }
            SkipReason::LowPrice { close, minimum } => {
                write!(f, "close {:.2} below {:.2}", close, minimum)
            }
            SkipReason::Excluded { reason } => write!(f, "excluded: {}", reason),
        }
    }
}

/// Third Friday of March, June, September and December.
pub fn is_triple_witching(date: NaiveDate) -> bool {
    matches!(date.month(), 3 | 6 | 9 | 12)
        && date.weekday() == Weekday::Fri
        && (15..=21).contains(&date.day())
}

/// Applies the eligibility filters and returns the latest feature rows.
pub fn build_features(
    symbol: &str,
    bars: &[OhlcvBar],
    config: &FeatureConfig,
) -> Result<FeatureSet, SkipReason> {
    let last = bars.last().ok_or(SkipReason::NoData)?;

    if bars.len() < config.min_bars {
        return Err(SkipReason::InsufficientBars {
            bars: bars.len(),
            minimum: config.min_bars,
        });
    }

    let avg_volume = calculate_sma(bars, PriceField::Volume, config.volume_avg_period)
        .last_value()
        .unwrap_or(0.0);
    if avg_volume < config.min_avg_volume {
        return Err(SkipReason::LowVolume {
            average: avg_volume,
            minimum: config.min_avg_volume,
        });
    }

    if last.close < config.min_close {
        return Err(SkipReason::LowPrice {
            close: last.close,
            minimum: config.min_close,
        });
    }

    let day = build_feature_table(bars, config)
        .pop()
        .ok_or(SkipReason::NoData)?;
    let week = build_week_table(bars, config)
        .pop()
        .ok_or(SkipReason::NoData)?;

    Ok(FeatureSet {
        symbol: symbol.to_string(),
        day,
        week,
    })
}

/// Full daily feature table, one row per input bar.
pub fn build_feature_table(bars: &[OhlcvBar], config: &FeatureConfig) -> Vec<FeatureRow> {
    let sma_short = calculate_sma(bars, PriceField::Close, config.sma_short);
    let sma_long = calculate_sma(bars, PriceField::Close, config.sma_long);
    let atr = calculate_atr(bars, config.atr_period, config.atr_smoothing);
    let adx = calculate_adx(bars, config.adx_period);
    let roc = calculate_roc(bars, config.roc_period);
    let momentum_short = calculate_pct_change(bars, config.momentum_short);
    let momentum_medium = calculate_pct_change(bars, config.momentum_medium);
    let high_max_short = calculate_rolling_max(bars, PriceField::High, config.breakout_short);
    let low_min_short = calculate_rolling_min(bars, PriceField::Low, config.breakout_short);
    let high_max_long = calculate_rolling_max(bars, PriceField::High, config.breakout_long);
    let low_min_long = calculate_rolling_min(bars, PriceField::Low, config.breakout_long);
    let doji = calculate_doji(bars);
    let (up_volume, down_volume) = volume_regimes(bars, &sma_short, config);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev = i.checked_sub(1).map(|p| &bars[p]);
            let atr_i = atr.value_at(i).filter(|v| *v > 0.0);
            let sma_long_i = sma_long.value_at(i);
            let high_max_short_i = high_max_short.value_at(i);
            let low_min_short_i = low_min_short.value_at(i);
            let high_max_long_i = high_max_long.value_at(i);
            let low_min_long_i = low_min_long.value_at(i);

            FeatureRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                sma_short: sma_short.value_at(i),
                sma_long: sma_long_i,
                atr: atr.value_at(i),
                adx: adx.value_at(i),
                roc: roc.value_at(i),
                momentum_short: momentum_short.value_at(i),
                momentum_medium: momentum_medium.value_at(i),
                high_max_short: high_max_short_i,
                low_min_short: low_min_short_i,
                high_max_long: high_max_long_i,
                low_min_long: low_min_long_i,
                doji: doji[i],
                prev_open: prev.map(|p| p.open),
                prev_high: prev.map(|p| p.high),
                prev_low: prev.map(|p| p.low),
                prev_close: prev.map(|p| p.close),
                prev_doji: i.checked_sub(1).map(|p| doji[p]),
                close_above_sma_long: sma_long_i.is_some_and(|sma| bar.close > sma),
                atr_distance_high_short: distance(high_max_short_i, Some(bar.close), atr_i),
                atr_distance_low_short: distance(Some(bar.close), low_min_short_i, atr_i),
                atr_distance_high_long: distance(high_max_long_i, Some(bar.high), atr_i),
                atr_distance_low_long: distance(Some(bar.low), low_min_long_i, atr_i),
                up_volume: up_volume[i],
                down_volume: down_volume[i],
            }
        })
        .collect()
}

/// Weekly rows with trend strength computed on the resampled series.
pub fn build_week_table(bars: &[OhlcvBar], config: &FeatureConfig) -> Vec<WeekRow> {
    let weeks = resample_week(bars);
    let adx = calculate_adx(&weeks, config.weekly_adx_period);

    weeks
        .iter()
        .enumerate()
        .map(|(i, w)| WeekRow {
            date: w.date,
            open: w.open,
            high: w.high,
            low: w.low,
            close: w.close,
            volume: w.volume,
            adx: adx.value_at(i),
        })
        .collect()
}

fn distance(upper: Option<f64>, lower: Option<f64>, atr: Option<f64>) -> Option<f64> {
    Some((upper? - lower?) / atr?)
}

/// Mean volume of the last `window` bars closing above (up) or below (down)
/// the short SMA, carried forward onto every following bar until the next
/// qualifying bar updates it.
fn volume_regimes(
    bars: &[OhlcvBar],
    sma_short: &IndicatorSeries,
    config: &FeatureConfig,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut up_acc = RollingMean::new(config.volume_regime_window);
    let mut down_acc = RollingMean::new(config.volume_regime_window);
    let mut up_last: Option<f64> = None;
    let mut down_last: Option<f64> = None;
    let mut up = Vec::with_capacity(bars.len());
    let mut down = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let excluded = config.exclude_triple_witching && is_triple_witching(bar.date);
        if let (Some(sma), false) = (sma_short.value_at(i), excluded) {
            let volume = bar.volume as f64;
            if bar.close > sma {
                up_acc.push(volume);
                up_last = up_acc.mean();
            } else if bar.close < sma {
                down_acc.push(volume);
                down_last = down_acc.mean();
            }
        }
        up.push(up_last);
        down.push(down_last);
    }

    (up, down)
}
