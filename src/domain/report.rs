//! Outcome report over a batch of historical signals.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::outcome::{self, OutcomeState, Trade, TradeStatus};
use crate::domain::signal::{round_to, Signal};
use rayon::prelude::*;
use std::collections::HashMap;

/// One output line: a trade with rounded risk/R and the running R total.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub trade: Trade,
    pub state: OutcomeState,
    pub risk: f64,
    pub r: Option<f64>,
    /// Running sum of unrounded R over resolved trades, rounded for display.
    pub r_sum: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub signals: usize,
    pub take_profit: usize,
    pub stop_loss: usize,
    pub time_exit: usize,
    pub provisional: usize,
    pub untriggered: usize,
    pub gap_through: usize,
    pub pending: usize,
    pub anomalies: usize,
    pub win_rate: Option<f64>,
    pub total_r: f64,
    pub average_r: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}

/// Simulates every signal against its symbol's bars.
///
/// Signals whose symbol has no bars come back as `Pending`.
pub fn simulate_signals(
    signals: &[Signal],
    bars_by_symbol: &HashMap<String, Vec<OhlcvBar>>,
    horizon: usize,
) -> Vec<outcome::Outcome> {
    signals
        .par_iter()
        .map(|signal| {
            let bars = bars_by_symbol
                .get(&signal.symbol)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let window = outcome::forward_window(bars, signal, horizon);
            outcome::simulate(signal, window, horizon)
        })
        .collect()
}

pub fn build_report(mut outcomes: Vec<outcome::Outcome>) -> Report {
    outcomes.sort_by(|a, b| {
        a.trade
            .signal
            .signal_date
            .cmp(&b.trade.signal.signal_date)
            .then_with(|| a.trade.signal.symbol.cmp(&b.trade.signal.symbol))
    });

    let mut summary = ReportSummary {
        signals: outcomes.len(),
        ..ReportSummary::default()
    };
    let mut running = 0.0;
    let mut resolved = 0usize;
    let mut wins = 0usize;
    let mut rows = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        match outcome.state {
            OutcomeState::Pending => summary.pending += 1,
            OutcomeState::ExpiredUntriggered => summary.untriggered += 1,
            OutcomeState::GapThrough => summary.gap_through += 1,
            OutcomeState::AmbiguousTie => summary.anomalies += 1,
            _ => {}
        }
        match outcome.trade.status {
            Some(TradeStatus::TakeProfit) => summary.take_profit += 1,
            Some(TradeStatus::StopLoss) => summary.stop_loss += 1,
            Some(TradeStatus::TimeExit) => summary.time_exit += 1,
            Some(TradeStatus::Provisional) => summary.provisional += 1,
            None => {}
        }

        let r_sum = outcome.trade.r.map(|r| {
            running += r;
            resolved += 1;
            if r > 0.0 {
                wins += 1;
            }
            round_to(running, 1)
        });

        rows.push(ReportRow {
            risk: round_to(outcome.trade.risk, 1),
            r: outcome.trade.r.map(|r| round_to(r, 1)),
            r_sum,
            state: outcome.state,
            trade: outcome.trade,
        });
    }

    summary.total_r = round_to(running, 1);
    if resolved > 0 {
        summary.win_rate = Some(round_to(wins as f64 / resolved as f64 * 100.0, 1));
        summary.average_r = Some(round_to(running / resolved as f64, 2));
    }

    tracing::info!(
        signals = summary.signals,
        tp = summary.take_profit,
        sl = summary.stop_loss,
        te = summary.time_exit,
        untriggered = summary.untriggered,
        anomalies = summary.anomalies,
        total_r = summary.total_r,
        "report built"
    );

    Report { rows, summary }
}
