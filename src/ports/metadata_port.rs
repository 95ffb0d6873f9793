//! Per-symbol reference data port.

use crate::domain::error::ScreenerError;
use crate::domain::universe::SymbolMetadata;

pub trait MetadataPort: Sync {
    fn lookup(&self, symbol: &str) -> Result<Option<SymbolMetadata>, ScreenerError>;
}
