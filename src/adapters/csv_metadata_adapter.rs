//! Symbol reference data from a CSV file.
//!
//! Header: `symbol,sector,country,industry,next_earnings`. Empty cells are
//! treated as unknown.

use crate::domain::error::ScreenerError;
use crate::domain::universe::SymbolMetadata;
use crate::ports::metadata_port::MetadataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct MetadataRecord {
    symbol: String,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    next_earnings: Option<NaiveDate>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub struct CsvMetadataAdapter {
    by_symbol: HashMap<String, SymbolMetadata>,
}

impl CsvMetadataAdapter {
    pub fn from_path(path: &Path) -> Result<Self, ScreenerError> {
        let file = std::fs::File::open(path).map_err(|e| ScreenerError::Data {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, ScreenerError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut by_symbol = HashMap::new();

        for record in rdr.deserialize::<MetadataRecord>() {
            let record = record?;
            by_symbol.insert(
                record.symbol.trim().to_uppercase(),
                SymbolMetadata {
                    sector: non_empty(record.sector),
                    country: non_empty(record.country),
                    industry: non_empty(record.industry),
                    next_earnings: record.next_earnings,
                },
            );
        }

        Ok(Self { by_symbol })
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

impl MetadataPort for CsvMetadataAdapter {
    fn lookup(&self, symbol: &str) -> Result<Option<SymbolMetadata>, ScreenerError> {
        Ok(self.by_symbol.get(&symbol.to_uppercase()).cloned())
    }
}
