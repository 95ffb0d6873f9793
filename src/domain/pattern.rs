//! Pattern matcher.
//!
//! Two mirrored rule sets (LONG, SHORT) are evaluated against the latest
//! daily and weekly feature rows. Each rule set is an ordered list of named
//! predicates combined with AND; evaluation stops at the first predicate that
//! fails and reports its name. There is no scoring: a rule set either matches
//! completely or produces nothing.
//!
//! Any predicate that reads a field still inside its warm-up window fails.

use crate::domain::features::{FeatureRow, FeatureSet, WeekRow};
use crate::domain::signal::{round_to, DateAnchor, Direction, Signal, SignalMetadata};

/// Thresholds for the rule sets. Defaults reproduce the reference variant;
/// every value is configurable.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternConfig {
    /// Minimum (highest high - high) / atr for LONG, mirrored for SHORT.
    pub breakout_distance_min: f64,
    /// Maximum (close - lowest low) / atr for LONG, mirrored for SHORT.
    pub pullback_distance_max: f64,
    /// Optional cap on |short-term momentum| in percent.
    pub momentum_short_max_abs: Option<f64>,
    /// Optional minimum daily trend strength.
    pub daily_adx_min: Option<f64>,
    pub weekly_adx_min: f64,
    pub stop_atr_mult: f64,
    pub target_atr_mult: f64,
    /// Trigger buffer as a percentage of the setup bar's low.
    pub trigger_buffer_pct: f64,
    /// Minimum trigger buffer in price units.
    pub trigger_buffer_floor: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig {
            breakout_distance_min: 1.8,
            pullback_distance_max: 1.5,
            momentum_short_max_abs: None,
            daily_adx_min: None,
            weekly_adx_min: 25.0,
            stop_atr_mult: 0.9,
            target_atr_mult: 1.8,
            trigger_buffer_pct: 0.1,
            trigger_buffer_floor: 0.01,
        }
    }
}

type Check = fn(&FeatureRow, &WeekRow, &PatternConfig) -> bool;

#[derive(Clone, Copy)]
pub struct Predicate {
    pub name: &'static str,
    check: Check,
}

impl Predicate {
    pub fn holds(&self, day: &FeatureRow, week: &WeekRow, config: &PatternConfig) -> bool {
        (self.check)(day, week, config)
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Matched,
    Rejected { failed: &'static str },
}

fn gt(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v > threshold)
}

fn lt(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v < threshold)
}

fn within_abs(value: Option<f64>, bound: Option<f64>) -> bool {
    match (value, bound) {
        (Some(v), Some(b)) => v.abs() <= b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn weekly_trend(_: &FeatureRow, week: &WeekRow, c: &PatternConfig) -> bool {
    gt(week.adx, c.weekly_adx_min)
}

fn daily_trend(day: &FeatureRow, _: &WeekRow, c: &PatternConfig) -> bool {
    match c.daily_adx_min {
        Some(min) => gt(day.adx, min),
        None => true,
    }
}

fn not_doji(day: &FeatureRow, _: &WeekRow, _: &PatternConfig) -> bool {
    !day.doji
}

const LONG_RULES: &[Predicate] = &[
    Predicate {
        name: "close_above_long_sma",
        check: |d, _, _| d.close_above_sma_long,
    },
    Predicate {
        name: "not_doji",
        check: not_doji,
    },
    Predicate {
        name: "short_momentum_negative",
        check: |d, _, c| {
            lt(d.momentum_short, 0.0) && within_abs(d.momentum_short, c.momentum_short_max_abs)
        },
    },
    Predicate {
        name: "bullish_candle",
        check: |d, _, _| d.close > d.open,
    },
    Predicate {
        name: "no_bullish_predecessor_breakout",
        check: |d, _, _| {
            let engulfing = match (d.prev_open, d.prev_close, d.prev_high, d.prev_doji) {
                (Some(o), Some(c), Some(h), Some(doji)) => o < c && h < d.high && !doji,
                _ => false,
            };
            !engulfing
        },
    },
    Predicate {
        name: "medium_momentum_positive",
        check: |d, _, _| gt(d.momentum_medium, 0.0),
    },
    Predicate {
        name: "distance_below_recent_high",
        check: |d, _, c| gt(d.atr_distance_high_long, c.breakout_distance_min),
    },
    Predicate {
        name: "close_near_recent_low",
        check: |d, _, c| lt(d.atr_distance_low_short, c.pullback_distance_max),
    },
    Predicate {
        name: "up_volume_dominates",
        check: |d, _, _| matches!((d.up_volume, d.down_volume), (Some(u), Some(v)) if u > v),
    },
    Predicate {
        name: "daily_trend_strength",
        check: daily_trend,
    },
    Predicate {
        name: "weekly_trend_strength",
        check: weekly_trend,
    },
];

const SHORT_RULES: &[Predicate] = &[
    Predicate {
        name: "close_below_long_sma",
        check: |d, _, _| d.sma_long.is_some() && !d.close_above_sma_long,
    },
    Predicate {
        name: "not_doji",
        check: not_doji,
    },
    Predicate {
        name: "short_momentum_positive",
        check: |d, _, c| {
            gt(d.momentum_short, 0.0) && within_abs(d.momentum_short, c.momentum_short_max_abs)
        },
    },
    Predicate {
        name: "bearish_candle",
        check: |d, _, _| d.close < d.open,
    },
    Predicate {
        name: "no_bearish_predecessor_breakout",
        check: |d, _, _| {
            let engulfing = match (d.prev_open, d.prev_close, d.prev_low, d.prev_doji) {
                (Some(o), Some(c), Some(l), Some(doji)) => o > c && l > d.low && !doji,
                _ => false,
            };
            !engulfing
        },
    },
    Predicate {
        name: "medium_momentum_negative",
        check: |d, _, _| lt(d.momentum_medium, 0.0),
    },
    Predicate {
        name: "distance_above_recent_low",
        check: |d, _, c| gt(d.atr_distance_low_long, c.breakout_distance_min),
    },
    Predicate {
        name: "close_near_recent_high",
        check: |d, _, c| lt(d.atr_distance_high_short, c.pullback_distance_max),
    },
    Predicate {
        name: "down_volume_dominates",
        check: |d, _, _| matches!((d.up_volume, d.down_volume), (Some(u), Some(v)) if u < v),
    },
    Predicate {
        name: "daily_trend_strength",
        check: daily_trend,
    },
    Predicate {
        name: "weekly_trend_strength",
        check: weekly_trend,
    },
];

pub fn rule_set(direction: Direction) -> &'static [Predicate] {
    match direction {
        Direction::Long => LONG_RULES,
        Direction::Short => SHORT_RULES,
    }
}

/// Evaluates one rule set, short-circuiting on the first failed predicate.
pub fn evaluate(
    direction: Direction,
    day: &FeatureRow,
    week: &WeekRow,
    config: &PatternConfig,
) -> Evaluation {
    for predicate in rule_set(direction) {
        if !predicate.holds(day, week, config) {
            return Evaluation::Rejected {
                failed: predicate.name,
            };
        }
    }
    Evaluation::Matched
}

/// Runs both rule sets and builds the signal for whichever matches.
pub fn match_pattern(features: &FeatureSet, config: &PatternConfig) -> Option<Signal> {
    for direction in [Direction::Long, Direction::Short] {
        match evaluate(direction, &features.day, &features.week, config) {
            Evaluation::Matched => return build_signal(features, direction, config),
            Evaluation::Rejected { failed } => {
                tracing::trace!(symbol = %features.symbol, %direction, failed, "rule set rejected");
            }
        }
    }
    None
}

/// Entry trigger, stop and target from the setup bar and its ATR.
pub fn build_signal(
    features: &FeatureSet,
    direction: Direction,
    config: &PatternConfig,
) -> Option<Signal> {
    let day = &features.day;
    let atr = day.atr?;
    let buffer = (day.low * config.trigger_buffer_pct / 100.0).max(config.trigger_buffer_floor);

    let (trigger, stop, target, distance) = match direction {
        Direction::Long => (
            day.high + buffer,
            day.high - config.stop_atr_mult * atr,
            day.high + config.target_atr_mult * atr,
            day.atr_distance_high_long,
        ),
        Direction::Short => (
            day.low - buffer,
            day.low + config.stop_atr_mult * atr,
            day.low - config.target_atr_mult * atr,
            day.atr_distance_low_long,
        ),
    };

    Some(Signal {
        symbol: features.symbol.clone(),
        direction,
        trigger_price: round_to(trigger, 2),
        stop_loss: round_to(stop, 2),
        take_profit: round_to(target, 2),
        signal_date: day.date,
        anchor: DateAnchor::Setup,
        metadata: SignalMetadata {
            industry: None,
            distance_tp_atr: distance.map(|d| round_to(d, 1)),
            adx_day: day.adx.map(f64::round),
            adx_week: features.week.adx.map(f64::round),
            up_volume: day.up_volume.map(|v| v as i64),
            down_volume: day.down_volume.map(|v| v as i64),
        },
    })
}
