//! Catalog CSV ingestion.
//!
//! Reads the assessment catalog once at startup into an immutable `CatalogStore`.
//! Row indices follow file order, starting at zero.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::mapping::{CatalogField, ColumnLayout, MappingError};
use crate::catalog::store::CatalogStore;
use crate::models::catalog::CatalogRecord;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {0}")]
    NotFound(String),

    #[error("failed to read catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Loads the catalog from a CSV file on disk.
pub fn load_catalog(path: &Path) -> Result<CatalogStore, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.display().to_string()));
    }
    info!("Loading catalog from {}", path.display());
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_catalog(file)
}

/// Parses catalog CSV from any reader. The header row is required.
pub fn read_catalog<R: Read>(reader: R) -> Result<CatalogStore, CatalogError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let layout = ColumnLayout::from_headers(reader.headers()?)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |field| layout.cell(&row, field).to_string();
        records.push(CatalogRecord {
            name: cell(CatalogField::AssessmentName),
            description: cell(CatalogField::Description),
            url: cell(CatalogField::Url),
            duration: parse_duration(layout.cell(&row, CatalogField::Duration)),
            adaptive_support: cell(CatalogField::AdaptiveSupport),
            remote_support: cell(CatalogField::RemoteSupport),
            test_type: cell(CatalogField::TestType),
        });
    }

    debug!("Parsed {} catalog rows", records.len());
    Ok(CatalogStore::new(records))
}

/// Extracts minutes from a free-form length cell: the first run of digits, if any.
///
/// `"30"` → 30, `"Approximate Completion Time in minutes = 45"` → 45, `"TBC"` → None.
pub fn parse_duration(cell: &str) -> Option<u64> {
    let digits: String = cell
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    match digits.parse::<u64>() {
        Ok(minutes) => Some(minutes),
        Err(_) => {
            warn!("Assessment length '{cell}' is out of range; treating as unknown");
            None
        }
    }
}
