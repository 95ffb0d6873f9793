//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_metadata_adapter;
pub mod csv_signal_store;
pub mod file_cache;
pub mod file_config_adapter;
pub mod memory_cache;
