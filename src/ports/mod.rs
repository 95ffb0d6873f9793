//! Port traits the domain depends on.

pub mod cache_port;
pub mod config_port;
pub mod data_port;
pub mod metadata_port;
pub mod signal_store;
