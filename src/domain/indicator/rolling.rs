//! Fixed-size sliding window accumulators.
//!
//! Each accumulator is fed one sample at a time and answers in O(1)
//! (amortised for the extremum windows) instead of re-scanning a slice.

use std::collections::VecDeque;

/// Trailing sum/mean over the last `period` samples.
#[derive(Debug, Clone)]
pub struct RollingMean {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.period {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
            }
        }
    }

    pub fn is_full(&self) -> bool {
        self.period > 0 && self.window.len() == self.period
    }

    /// Mean of the window once `period` samples have been seen.
    pub fn mean(&self) -> Option<f64> {
        self.is_full().then(|| self.sum / self.period as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

/// Trailing maximum or minimum over the last `period` samples.
///
/// Monotonic deque of `(sample_index, value)`; the front is always the
/// current extremum.
#[derive(Debug, Clone)]
pub struct RollingExtreme {
    period: usize,
    kind: Extreme,
    deque: VecDeque<(usize, f64)>,
    seen: usize,
}

impl RollingExtreme {
    pub fn max(period: usize) -> Self {
        Self::new(period, Extreme::Max)
    }

    pub fn min(period: usize) -> Self {
        Self::new(period, Extreme::Min)
    }

    fn new(period: usize, kind: Extreme) -> Self {
        Self {
            period,
            kind,
            deque: VecDeque::with_capacity(period),
            seen: 0,
        }
    }

    pub fn push(&mut self, value: f64) {
        let index = self.seen;
        self.seen += 1;

        while let Some(&(_, back)) = self.deque.back() {
            let dominated = match self.kind {
                Extreme::Max => back <= value,
                Extreme::Min => back >= value,
            };
            if !dominated {
                break;
            }
            self.deque.pop_back();
        }
        self.deque.push_back((index, value));

        while let Some(&(front_index, _)) = self.deque.front() {
            if front_index + self.period > index {
                break;
            }
            self.deque.pop_front();
        }
    }

    /// Extremum of the window once `period` samples have been seen.
    pub fn value(&self) -> Option<f64> {
        if self.period == 0 || self.seen < self.period {
            return None;
        }
        self.deque.front().map(|&(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_warms_up_then_slides() {
        let mut acc = RollingMean::new(3);
        acc.push(1.0);
        acc.push(2.0);
        assert_eq!(acc.mean(), None);
        acc.push(3.0);
        assert_eq!(acc.mean(), Some(2.0));
        acc.push(10.0);
        assert!((acc.mean().unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rolling_mean_zero_period_never_full() {
        let mut acc = RollingMean::new(0);
        acc.push(1.0);
        assert_eq!(acc.mean(), None);
    }

    #[test]
    fn rolling_max_tracks_window() {
        let mut acc = RollingExtreme::max(3);
        let mut out = Vec::new();
        for v in [5.0, 1.0, 4.0, 2.0, 3.0, 0.0] {
            acc.push(v);
            out.push(acc.value());
        }
        assert_eq!(
            out,
            vec![None, None, Some(5.0), Some(4.0), Some(4.0), Some(3.0)]
        );
    }

    #[test]
    fn rolling_min_tracks_window() {
        let mut acc = RollingExtreme::min(2);
        let mut out = Vec::new();
        for v in [5.0, 1.0, 4.0, 2.0, 3.0] {
            acc.push(v);
            out.push(acc.value());
        }
        assert_eq!(out, vec![None, Some(1.0), Some(1.0), Some(2.0), Some(2.0)]);
    }
}
