//! Core domain types and logic.

pub mod error;
pub mod features;
pub mod indicator;
pub mod ohlcv;
pub mod outcome;
pub mod pattern;
pub mod report;
pub mod screener;
pub mod settings;
pub mod signal;
pub mod universe;
