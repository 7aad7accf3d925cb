//! Recommendation Assembler: orchestrates the recommendation pipeline.
//!
//! Flow: validate → extract criteria → rewrite (or keep raw query) → retrieve →
//!       dedupe + resolve + project → truncate.
//!
//! Ordering is the retriever's. The assembler never re-sorts.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::CatalogStore;
use crate::errors::AppError;
use crate::models::catalog::CatalogRecord;
use crate::models::recommendation::RecommendedAssessment;
use crate::recommendation::coercion::coerce_test_type;
use crate::recommendation::criteria::{CriteriaExtractor, Extraction};
use crate::recommendation::retriever::{CandidateMatch, Retriever};
use crate::recommendation::rewriter::{rewrite, RewriteWeights};

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Immutable pipeline. Built once at startup and shared across requests.
pub struct RecommendationEngine {
    catalog: Arc<CatalogStore>,
    retriever: Arc<dyn Retriever>,
    extractor: Arc<dyn CriteriaExtractor>,
    weights: RewriteWeights,
    max_results: usize,
}

#[derive(Default)]
pub struct EngineBuilder {
    catalog: Option<Arc<CatalogStore>>,
    retriever: Option<Arc<dyn Retriever>>,
    extractor: Option<Arc<dyn CriteriaExtractor>>,
    weights: RewriteWeights,
    max_results: Option<usize>,
}

impl EngineBuilder {
    pub fn catalog(mut self, catalog: Arc<CatalogStore>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn CriteriaExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn weights(mut self, weights: RewriteWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Fails with `AppError::Configuration` when any collaborator is missing.
    pub fn build(self) -> Result<RecommendationEngine, AppError> {
        let missing = |what: &str| AppError::Configuration(format!("{what} not initialized"));
        let max_results = self.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if max_results == 0 {
            return Err(AppError::Configuration(
                "max_results must be greater than zero".to_string(),
            ));
        }
        Ok(RecommendationEngine {
            catalog: self.catalog.ok_or_else(|| missing("Catalog"))?,
            retriever: self.retriever.ok_or_else(|| missing("Retriever"))?,
            extractor: self.extractor.ok_or_else(|| missing("Criteria extractor"))?,
            weights: self.weights,
            max_results,
        })
    }
}

impl RecommendationEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Runs the full pipeline for one query.
    ///
    /// Errors:
    /// - `Configuration` when the catalog is empty
    /// - `Validation` when the query is blank
    /// - `Provider` when extraction or retrieval fails
    pub async fn recommend(&self, query: &str) -> Result<Vec<RecommendedAssessment>, AppError> {
        if self.catalog.is_empty() {
            return Err(AppError::Configuration("Catalog is empty".to_string()));
        }
        if query.trim().is_empty() {
            return Err(AppError::Validation("query cannot be empty".to_string()));
        }

        let search_text = self.effective_search_text(query).await?;
        debug!("Effective search text: {search_text}");

        let candidates = self.retriever.retrieve(&search_text).await?;
        let recommendations = assemble(&candidates, &self.catalog, self.max_results);

        info!(
            "Recommended {} assessments from {} candidates",
            recommendations.len(),
            candidates.len()
        );
        Ok(recommendations)
    }

    /// Rewritten query when extraction yields criteria, otherwise the raw query verbatim.
    async fn effective_search_text(&self, query: &str) -> Result<String, AppError> {
        match self.extractor.extract(query).await? {
            Extraction::Criteria(criteria) if !criteria.is_empty() => {
                debug!("Extracted criteria: {criteria:?}");
                Ok(rewrite(&criteria, &self.weights))
            }
            _ => {
                debug!("No criteria extracted, searching with raw query");
                Ok(query.to_string())
            }
        }
    }
}

/// Walks candidates in rank order, skipping unresolvable and repeated rows, and
/// stops after `max_results` projections.
pub fn assemble(
    candidates: &[CandidateMatch],
    catalog: &CatalogStore,
    max_results: usize,
) -> Vec<RecommendedAssessment> {
    let mut emitted = HashSet::new();
    let mut recommendations = Vec::new();

    for (rank, candidate) in candidates.iter().enumerate() {
        if recommendations.len() >= max_results {
            break;
        }
        let Some(row_index) = candidate.row_index else {
            debug!("Skipping candidate at rank {rank}: no row index");
            continue;
        };
        let Some(record) = catalog.get(row_index) else {
            debug!("Skipping candidate at rank {rank}: row {row_index} not in catalog");
            continue;
        };
        if !emitted.insert(row_index) {
            continue;
        }
        debug!(
            "Rank {rank}: row {row_index} (similarity {:.4})",
            candidate.similarity
        );
        recommendations.push(project(record));
    }

    recommendations
}

/// Maps a catalog record to its published projection. Blank cells become `None`.
pub fn project(record: &CatalogRecord) -> RecommendedAssessment {
    RecommendedAssessment {
        url: present(&record.url),
        adaptive_support: present(&record.adaptive_support),
        description: present(&record.description),
        duration: record.duration,
        remote_support: present(&record.remote_support),
        test_type: coerce_test_type(&Value::String(record.test_type.clone())),
        assessment_name: present(&record.name),
    }
}

fn present(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::criteria::SearchCriteria;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ── Fakes ────────────────────────────────────────────────────────────────

    struct FixedExtractor(Result<Extraction, ()>);

    #[async_trait]
    impl CriteriaExtractor for FixedExtractor {
        async fn extract(&self, _query: &str) -> Result<Extraction, AppError> {
            match &self.0 {
                Ok(extraction) => Ok(extraction.clone()),
                Err(()) => Err(AppError::Provider(
                    "Criteria extraction failed: HTTP error: connection refused".to_string(),
                )),
            }
        }
    }

    /// Returns a fixed candidate list and records every query it receives.
    struct RecordingRetriever {
        hits: Vec<Option<usize>>,
        queries: Mutex<Vec<String>>,
    }

    impl RecordingRetriever {
        fn new(hits: Vec<Option<usize>>) -> Arc<Self> {
            Arc::new(Self {
                hits,
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Retriever for RecordingRetriever {
        async fn retrieve(&self, query_text: &str) -> Result<Vec<CandidateMatch>, AppError> {
            self.queries.lock().unwrap().push(query_text.to_string());
            Ok(self
                .hits
                .iter()
                .enumerate()
                .map(|(i, row_index)| CandidateMatch {
                    row_index: *row_index,
                    similarity: 1.0 - i as f32 * 0.01,
                })
                .collect())
        }
    }

    struct FailingRetriever;

    #[async_trait]
    impl Retriever for FailingRetriever {
        async fn retrieve(&self, _query_text: &str) -> Result<Vec<CandidateMatch>, AppError> {
            Err(AppError::Provider("Retrieval failed: quota exceeded".to_string()))
        }
    }

    // ── Fixtures ─────────────────────────────────────────────────────────────

    fn record(name: &str, test_type: &str) -> CatalogRecord {
        CatalogRecord {
            name: name.to_string(),
            description: format!("{name} description"),
            url: format!("/products/{}/", name.to_lowercase().replace(' ', "-")),
            duration: Some(20),
            adaptive_support: "No".to_string(),
            remote_support: "Yes".to_string(),
            test_type: test_type.to_string(),
        }
    }

    fn catalog_of(n: usize) -> Arc<CatalogStore> {
        Arc::new(CatalogStore::new(
            (0..n).map(|i| record(&format!("Assessment {i}"), "K")).collect(),
        ))
    }

    fn developer_criteria() -> Extraction {
        Extraction::Criteria(SearchCriteria {
            job_role: Some("Developer".to_string()),
            candidate_level: Some("junior".to_string()),
            key_skills_or_concepts: Some(vec!["coding".to_string()]),
        })
    }

    fn engine(
        catalog: Arc<CatalogStore>,
        extraction: Result<Extraction, ()>,
        retriever: Arc<dyn Retriever>,
    ) -> RecommendationEngine {
        RecommendationEngine::builder()
            .catalog(catalog)
            .extractor(Arc::new(FixedExtractor(extraction)))
            .retriever(retriever)
            .build()
            .unwrap()
    }

    // ── End-to-end ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_single_matching_developer_record() {
        let catalog = Arc::new(CatalogStore::new(vec![record(
            "Developer Coding Test",
            "Knowledge & Skills, Simulations",
        )]));
        let retriever = RecordingRetriever::new(vec![Some(0)]);
        let engine = engine(catalog, Ok(developer_criteria()), retriever.clone());

        let result = engine
            .recommend("I need a remote coding test for junior developers")
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0],
            RecommendedAssessment {
                url: Some("/products/developer-coding-test/".to_string()),
                adaptive_support: Some("No".to_string()),
                description: Some("Developer Coding Test description".to_string()),
                duration: Some(20),
                remote_support: Some("Yes".to_string()),
                test_type: vec!["Knowledge & Skills".to_string(), "Simulations".to_string()],
                assessment_name: Some("Developer Coding Test".to_string()),
            }
        );
        assert_eq!(
            retriever.queries(),
            vec!["assessment for Developer junior coding".to_string()]
        );
    }

    #[tokio::test]
    async fn test_degraded_extraction_searches_raw_query_verbatim() {
        let retriever = RecordingRetriever::new(vec![Some(0)]);
        let engine = engine(catalog_of(1), Ok(Extraction::Degraded), retriever.clone());

        let query = "  Need a Sales test, 30 mins max ";
        engine.recommend(query).await.unwrap();
        assert_eq!(retriever.queries(), vec![query.to_string()]);
    }

    #[tokio::test]
    async fn test_all_empty_criteria_searches_raw_query() {
        let retriever = RecordingRetriever::new(vec![]);
        let engine = engine(
            catalog_of(1),
            Ok(Extraction::Criteria(SearchCriteria::default())),
            retriever.clone(),
        );
        engine.recommend("cognitive ability").await.unwrap();
        assert_eq!(retriever.queries(), vec!["cognitive ability".to_string()]);
    }

    #[tokio::test]
    async fn test_extraction_provider_failure_aborts_without_retrieval() {
        let retriever = RecordingRetriever::new(vec![Some(0)]);
        let engine = engine(catalog_of(1), Err(()), retriever.clone());

        let err = engine.recommend("Java developer").await.unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
        assert!(retriever.queries().is_empty());
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_provider_error() {
        let engine = engine(catalog_of(1), Ok(Extraction::Degraded), Arc::new(FailingRetriever));
        let err = engine.recommend("Java developer").await.unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }

    #[tokio::test]
    async fn test_empty_catalog_is_configuration_error() {
        let engine = engine(
            Arc::new(CatalogStore::default()),
            Ok(Extraction::Degraded),
            RecordingRetriever::new(vec![]),
        );
        let err = engine.recommend("Java developer").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_blank_query_is_validation_error() {
        let retriever = RecordingRetriever::new(vec![Some(0)]);
        let engine = engine(catalog_of(1), Ok(Extraction::Degraded), retriever.clone());
        let err = engine.recommend("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(retriever.queries().is_empty());
    }

    #[tokio::test]
    async fn test_empty_retrieval_yields_empty_result() {
        let engine = engine(
            catalog_of(3),
            Ok(developer_criteria()),
            RecordingRetriever::new(vec![]),
        );
        assert!(engine.recommend("anything").await.unwrap().is_empty());
    }

    #[test]
    fn test_missing_retriever_is_configuration_error() {
        let result = RecommendationEngine::builder()
            .catalog(catalog_of(1))
            .extractor(Arc::new(FixedExtractor(Ok(Extraction::Degraded))))
            .build();
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_missing_extractor_is_configuration_error() {
        let result = RecommendationEngine::builder()
            .catalog(catalog_of(1))
            .retriever(RecordingRetriever::new(vec![]))
            .build();
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_zero_max_results_is_configuration_error() {
        let result = RecommendationEngine::builder()
            .catalog(catalog_of(1))
            .retriever(RecordingRetriever::new(vec![]))
            .extractor(Arc::new(FixedExtractor(Ok(Extraction::Degraded))))
            .max_results(0)
            .build();
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    // ── Assembly ─────────────────────────────────────────────────────────────

    fn hits(rows: &[Option<usize>]) -> Vec<CandidateMatch> {
        rows.iter()
            .map(|r| CandidateMatch {
                row_index: *r,
                similarity: 0.5,
            })
            .collect()
    }

    fn names(result: &[RecommendedAssessment]) -> Vec<String> {
        result
            .iter()
            .map(|r| r.assessment_name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_assemble_skips_missing_unknown_and_duplicate_rows() {
        let catalog = catalog_of(3);
        let result = assemble(
            &hits(&[Some(2), None, Some(99), Some(2), Some(0)]),
            &catalog,
            10,
        );
        assert_eq!(names(&result), vec!["Assessment 2", "Assessment 0"]);
    }

    #[test]
    fn test_assemble_preserves_retrieval_order() {
        let catalog = catalog_of(5);
        let result = assemble(&hits(&[Some(4), Some(1), Some(3)]), &catalog, 10);
        assert_eq!(names(&result), vec!["Assessment 4", "Assessment 1", "Assessment 3"]);
    }

    #[test]
    fn test_assemble_truncates_to_max_results() {
        let catalog = catalog_of(25);
        let rows: Vec<Option<usize>> = (0..20).map(Some).collect();
        let result = assemble(&hits(&rows), &catalog, 10);
        assert_eq!(result.len(), 10);
        assert_eq!(result[9].assessment_name.as_deref(), Some("Assessment 9"));
    }

    #[test]
    fn test_assemble_never_repeats_and_never_exceeds_limit() {
        let catalog = catalog_of(4);
        // Repeats, gaps and unknown rows.
        let patterns: Vec<Vec<Option<usize>>> = vec![
            vec![Some(0); 20],
            (0..20).map(|i| Some(i % 4)).collect(),
            (0..20).map(|i| if i % 3 == 0 { None } else { Some(i % 6) }).collect(),
        ];
        for pattern in patterns {
            let result = assemble(&hits(&pattern), &catalog, 10);
            assert!(result.len() <= 10);
            let mut seen = HashSet::new();
            assert!(names(&result).into_iter().all(|n| seen.insert(n)));
        }
    }

    #[test]
    fn test_duplicates_do_not_count_toward_limit() {
        let catalog = catalog_of(3);
        let result = assemble(&hits(&[Some(0), Some(0), Some(1), Some(2)]), &catalog, 2);
        assert_eq!(names(&result), vec!["Assessment 0", "Assessment 1"]);
    }

    #[test]
    fn test_project_blank_cells_become_none() {
        let blank = CatalogRecord {
            name: String::new(),
            description: " ".to_string(),
            url: String::new(),
            duration: None,
            adaptive_support: String::new(),
            remote_support: String::new(),
            test_type: String::new(),
        };
        let projected = project(&blank);
        assert!(projected.url.is_none());
        assert!(projected.description.is_none());
        assert!(projected.duration.is_none());
        assert!(projected.test_type.is_empty());
    }
}
