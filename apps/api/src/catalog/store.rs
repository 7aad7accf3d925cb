use crate::models::catalog::CatalogRecord;

/// Read-only, in-memory catalog. A record's row index is its position here.
///
/// Built once at startup and shared behind an `Arc`; lookups need no locking.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    records: Vec<CatalogRecord>,
}

/// A record's embedding text paired with the row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    pub row_index: usize,
    pub text: String,
}

impl CatalogStore {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row_index: usize) -> Option<&CatalogRecord> {
        self.records.get(row_index)
    }

    /// Bulk export for index construction, in row order.
    pub fn index_documents(&self) -> Vec<IndexDocument> {
        self.records
            .iter()
            .enumerate()
            .map(|(row_index, record)| IndexDocument {
                row_index,
                text: record.index_text(row_index),
            })
            .collect()
    }
}
