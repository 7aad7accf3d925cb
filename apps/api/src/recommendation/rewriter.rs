//! Query Rewriter: turns extracted criteria into a weighted pseudo-query.
//!
//! Repeating a term biases the query embedding toward it. After repetition the
//! terms are de-duplicated case-insensitively, so the surviving text lists each
//! distinct term once, in first-seen order and casing.

use std::collections::HashSet;

use crate::recommendation::criteria::SearchCriteria;

/// Returned when the criteria contribute no terms at all.
pub const FALLBACK_QUERY: &str = "job assessment";
const QUERY_PREFIX: &str = "assessment for ";

/// Per-field repetition counts. Tuned constants, overridable through config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteWeights {
    pub job_role: usize,
    pub candidate_level: usize,
    pub skill: usize,
}

impl Default for RewriteWeights {
    fn default() -> Self {
        Self {
            job_role: 9,
            candidate_level: 2,
            skill: 3,
        }
    }
}

pub fn rewrite(criteria: &SearchCriteria, weights: &RewriteWeights) -> String {
    let mut terms: Vec<&str> = Vec::new();

    if let Some(role) = non_blank(criteria.job_role.as_deref()) {
        terms.extend(std::iter::repeat(role).take(weights.job_role));
    }
    if let Some(level) = non_blank(criteria.candidate_level.as_deref()) {
        terms.extend(std::iter::repeat(level).take(weights.candidate_level));
    }
    if let Some(skills) = &criteria.key_skills_or_concepts {
        for skill in skills.iter().filter_map(|s| non_blank(Some(s.as_str()))) {
            terms.extend(std::iter::repeat(skill).take(weights.skill));
        }
    }

    let mut seen = HashSet::new();
    let unique: Vec<&str> = terms
        .into_iter()
        .filter(|term| seen.insert(term.to_lowercase()))
        .collect();

    if unique.is_empty() {
        return FALLBACK_QUERY.to_string();
    }
    format!("{QUERY_PREFIX}{}", unique.join(" "))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
