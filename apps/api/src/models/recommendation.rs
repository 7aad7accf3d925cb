use serde::{Deserialize, Serialize};

/// Request body for `POST /recommend`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// A single recommended assessment: the public projection of a `CatalogRecord`.
///
/// Blank catalog cells surface as `null`. `test_type` is always a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedAssessment {
    pub url: Option<String>,
    pub adaptive_support: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u64>,
    pub remote_support: Option<String>,
    pub test_type: Vec<String>,
    pub assessment_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub recommended_assessments: Vec<RecommendedAssessment>,
}
