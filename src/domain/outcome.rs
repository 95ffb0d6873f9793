//! Trade outcome simulation.
//!
//! Walks the bars following a signal, at most `horizon` of them, and
//! classifies what happened:
//!
//! ```text
//! Pending ──► ExpiredUntriggered                      (bar 0 never crosses the trigger)
//!    │
//!    └──► Triggered ──► GapThrough                    (bar 0 already beyond target)
//!                   ├─► TargetHit / StopHit           (first touch in bars 1..horizon)
//!                   ├─► AmbiguousTie                  (both touched on the same bar)
//!                   ├─► TimeExit                      (full window, no touch)
//!                   └─► InconclusiveShortWindow       (data ends early, no touch)
//! ```
//!
//! Targets and stops count as reached when a bar's range touches them.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{DateAnchor, Direction, Signal};
use chrono::NaiveDate;
use std::fmt;

pub const DEFAULT_HORIZON: usize = 5;

/// Terminal status written to reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeStatus {
    TakeProfit,
    StopLoss,
    TimeExit,
    /// Window shorter than the horizon; exit is provisional.
    Provisional,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            TradeStatus::TakeProfit => "TP",
            TradeStatus::StopLoss => "SL",
            TradeStatus::TimeExit => "TE",
            TradeStatus::Provisional => "-",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeState {
    /// No forward bars yet.
    Pending,
    ExpiredUntriggered,
    GapThrough,
    TargetHit,
    StopHit,
    TimeExit,
    InconclusiveShortWindow,
    AmbiguousTie,
}

/// Target and stop both touched on the same bar; the bar's path is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub symbol: String,
    pub signal_date: NaiveDate,
    pub bar_index: usize,
    pub bar_date: NaiveDate,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} signal of {}: target and stop both touched on bar {} ({})",
            self.symbol, self.signal_date, self.bar_index, self.bar_date
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub signal: Signal,
    pub entry: Option<f64>,
    pub exit: Option<f64>,
    pub status: Option<TradeStatus>,
    /// Bars from entry to resolution.
    pub duration: Option<usize>,
    pub risk: f64,
    pub r: Option<f64>,
    pub anomaly: Option<Anomaly>,
}

impl Trade {
    fn unresolved(signal: &Signal) -> Self {
        Trade {
            risk: signal.risk(),
            signal: signal.clone(),
            entry: None,
            exit: None,
            status: None,
            duration: None,
            r: None,
            anomaly: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub state: OutcomeState,
    pub trade: Trade,
}

/// Forward bars for `signal`, truncated to `horizon`.
///
/// A setup-dated signal starts on the bar after its date; an entry-dated one
/// starts on its date.
pub fn forward_window<'a>(bars: &'a [OhlcvBar], signal: &Signal, horizon: usize) -> &'a [OhlcvBar] {
    let date = signal.signal_date;
    let start = match signal.anchor {
        DateAnchor::Setup => bars.partition_point(|b| b.date <= date),
        DateAnchor::Entry => bars.partition_point(|b| b.date < date),
    };
    let end = (start + horizon).min(bars.len());
    &bars[start..end]
}

pub fn simulate(signal: &Signal, window: &[OhlcvBar], horizon: usize) -> Outcome {
    let mut trade = Trade::unresolved(signal);
    let window = &window[..window.len().min(horizon)];

    let Some(first) = window.first() else {
        return Outcome {
            state: OutcomeState::Pending,
            trade,
        };
    };

    let trigger = signal.trigger_price;
    let entry = match signal.direction {
        Direction::Long if first.high > trigger => first.open.max(trigger),
        Direction::Short if first.low < trigger => first.open.min(trigger),
        _ => {
            return Outcome {
                state: OutcomeState::ExpiredUntriggered,
                trade,
            };
        }
    };

    let gap_through = match signal.direction {
        Direction::Long => first.high > signal.take_profit,
        Direction::Short => first.low < signal.take_profit,
    };
    if gap_through {
        tracing::debug!(
            symbol = %signal.symbol,
            date = %first.date,
            "entry bar gapped through target"
        );
        return Outcome {
            state: OutcomeState::GapThrough,
            trade,
        };
    }
    trade.entry = Some(entry);

    let target_hit = first_touch(window, |bar| match signal.direction {
        Direction::Long => bar.high >= signal.take_profit,
        Direction::Short => bar.low <= signal.take_profit,
    });
    let stop_hit = first_touch(window, |bar| match signal.direction {
        Direction::Long => bar.low <= signal.stop_loss,
        Direction::Short => bar.high >= signal.stop_loss,
    });

    let (state, exit, duration) = match (target_hit, stop_hit) {
        (Some(t), Some(s)) if t == s => {
            let anomaly = Anomaly {
                symbol: signal.symbol.clone(),
                signal_date: signal.signal_date,
                bar_index: t,
                bar_date: window[t].date,
            };
            tracing::warn!(%anomaly, "unresolved target/stop tie");
            trade.anomaly = Some(anomaly);
            return Outcome {
                state: OutcomeState::AmbiguousTie,
                trade,
            };
        }
        (Some(t), Some(s)) if s < t => (OutcomeState::StopHit, signal.stop_loss, s),
        (Some(t), _) => (OutcomeState::TargetHit, signal.take_profit, t),
        (None, Some(s)) => (OutcomeState::StopHit, signal.stop_loss, s),
        (None, None) => {
            let last = &window[window.len() - 1];
            if window.len() < horizon {
                (OutcomeState::InconclusiveShortWindow, last.close, window.len())
            } else {
                (OutcomeState::TimeExit, last.close, window.len())
            }
        }
    };

    trade.status = Some(match state {
        OutcomeState::TargetHit => TradeStatus::TakeProfit,
        OutcomeState::StopHit => TradeStatus::StopLoss,
        OutcomeState::InconclusiveShortWindow => TradeStatus::Provisional,
        _ => TradeStatus::TimeExit,
    });
    trade.exit = Some(exit);
    trade.duration = Some(duration);
    trade.r = Some(r_multiple(signal.direction, entry, exit, trade.risk));

    Outcome { state, trade }
}

/// First index in 1..len where `touched` holds; bar 0 is the entry bar.
fn first_touch(window: &[OhlcvBar], touched: impl Fn(&OhlcvBar) -> bool) -> Option<usize> {
    window
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, bar)| touched(bar))
        .map(|(i, _)| i)
}

pub fn r_multiple(direction: Direction, entry: f64, exit: f64, risk: f64) -> f64 {
    if risk <= 0.0 {
        return 0.0;
    }
    match direction {
        Direction::Long => (exit - entry) / risk,
        Direction::Short => (entry - exit) / risk,
    }
}
