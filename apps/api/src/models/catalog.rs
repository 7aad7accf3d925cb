/// One assessment product, loaded once from the catalog CSV and never mutated.
///
/// The record's row index is its position in `CatalogStore`; it is not stored here.
/// Text cells are blank-filled at load time, so an absent value is an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub name: String,
    pub description: String,
    /// Often a relative path into the vendor site.
    pub url: String,
    /// Minutes. `None` when the cell carries no digits.
    pub duration: Option<u64>,
    pub adaptive_support: String,
    pub remote_support: String,
    /// Raw cell; normalized by `recommendation::coercion` on the way out.
    pub test_type: String,
}

impl CatalogRecord {
    /// Text submitted to the embedding model for this record.
    ///
    /// One `"<column>: <value>"` line per non-blank content column. Rows with
    /// no content fall back to a placeholder naming the row.
    pub fn index_text(&self, row_index: usize) -> String {
        let parts: Vec<String> = [
            ("Assessment Name", &self.name),
            ("description", &self.description),
            ("Test Type", &self.test_type),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(column, value)| format!("{column}: {value}"))
        .collect();

        if parts.is_empty() {
            format!("Assessment details row index {row_index}")
        } else {
            parts.join("\n")
        }
    }
}
