// LLM prompt constants for criteria extraction.
// Reuses the JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for criteria extraction. Restricts the model to role, level and skills.
pub fn criteria_system() -> String {
    format!(
        "You are an expert query analyst specializing in job assessment matching. \
        Analyze the user's request and extract the primary job role, candidate level, \
        and key skills or concepts relevant to the role. \
        Focus exclusively on these aspects. \
        Ignore mentions of duration, test types, or preferences unless essential to job requirements. \
        {JSON_ONLY_SYSTEM}"
    )
}

/// Extraction prompt template. Replace `{original_query}` before sending.
pub const CRITERIA_PROMPT_TEMPLATE: &str = r#"Analyze the following user query and return a JSON object with this EXACT schema (no extra fields):
{
  "job_role": "The primary job role or title mentioned, e.g. \"Software Engineer\", \"Sales Manager\". null if absent.",
  "candidate_level": "The seniority or experience level, e.g. \"entry-level\", \"senior\", \"manager\". null if absent.",
  "key_skills_or_concepts": ["Essential skills, knowledge areas, or responsibilities, e.g. \"Python\", \"data analysis\". null if absent."]
}

Fill ONLY job_role, candidate_level, and key_skills_or_concepts.

Query: ```{original_query}```"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_restricts_fields_and_demands_json() {
        let system = criteria_system();
        assert!(system.contains("job role"));
        assert!(system.contains("candidate level"));
        assert!(system.contains("valid JSON only"));
    }

    #[test]
    fn test_template_has_single_query_placeholder() {
        assert_eq!(CRITERIA_PROMPT_TEMPLATE.matches("{original_query}").count(), 1);
    }
}
