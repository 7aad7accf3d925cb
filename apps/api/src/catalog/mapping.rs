//! Column mapping between the catalog CSV and `CatalogRecord`.
//!
//! The table is fixed at compile time and checked against the CSV header once at
//! startup. A header mismatch aborts startup; rows are never re-validated per request.

use csv::StringRecord;
use thiserror::Error;

/// A catalog field and the JSON key it is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogField {
    Url,
    AdaptiveSupport,
    Description,
    Duration,
    RemoteSupport,
    TestType,
    AssessmentName,
}

impl CatalogField {
    pub const ALL: [CatalogField; 7] = [
        CatalogField::Url,
        CatalogField::AdaptiveSupport,
        CatalogField::Description,
        CatalogField::Duration,
        CatalogField::RemoteSupport,
        CatalogField::TestType,
        CatalogField::AssessmentName,
    ];

    /// Source column in the catalog CSV.
    pub fn column(self) -> &'static str {
        match self {
            CatalogField::Url => "Relative_URL",
            CatalogField::AdaptiveSupport => "Adaptive/IRT",
            CatalogField::Description => "description",
            CatalogField::Duration => "Assessment Length",
            CatalogField::RemoteSupport => "Remote Testing",
            CatalogField::TestType => "Test Type",
            CatalogField::AssessmentName => "Assessment Name",
        }
    }

    /// Key in the published JSON projection.
    pub fn json_key(self) -> &'static str {
        match self {
            CatalogField::Url => "url",
            CatalogField::AdaptiveSupport => "adaptive_support",
            CatalogField::Description => "description",
            CatalogField::Duration => "duration",
            CatalogField::RemoteSupport => "remote_support",
            CatalogField::TestType => "test_type",
            CatalogField::AssessmentName => "assessment_name",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Human-readable `json_key <- column` summary, logged at startup.
pub fn describe_mapping() -> String {
    CatalogField::ALL
        .iter()
        .map(|f| format!("{} <- '{}'", f.json_key(), f.column()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("catalog CSV is missing expected columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("catalog CSV has duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// Resolved positions of every `CatalogField` within a concrete CSV header.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    positions: [usize; CatalogField::ALL.len()],
}

impl ColumnLayout {
    /// Builds the layout from a header row. Extra columns are ignored; header
    /// cells are matched after trimming surrounding whitespace.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, MappingError> {
        let mut positions = [0usize; CatalogField::ALL.len()];
        let mut missing = Vec::new();

        for field in CatalogField::ALL {
            let mut matches = headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.trim() == field.column())
                .map(|(i, _)| i);

            match (matches.next(), matches.next()) {
                (Some(pos), None) => positions[field.slot()] = pos,
                (Some(_), Some(_)) => {
                    return Err(MappingError::DuplicateColumn(field.column().to_string()))
                }
                (None, _) => missing.push(field.column().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(MappingError::MissingColumns(missing));
        }

        Ok(Self { positions })
    }

    /// Reads the cell for `field`, treating short rows as blank.
    pub fn cell<'r>(&self, row: &'r StringRecord, field: CatalogField) -> &'r str {
        row.get(self.positions[field.slot()]).unwrap_or("")
    }
}
