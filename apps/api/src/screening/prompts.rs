// Screening prompt templates.
// Reuses the JSON-only system fragment from llm_client::prompts.

pub use crate::llm_client::prompts::JSON_ONLY_SYSTEM as SCREENING_SYSTEM;

/// ATS evaluation prompt. Replace `{resume_text}`, `{job_description}` and
/// `{candidate_name}` before sending.
pub const SCREENING_PROMPT_TEMPLATE: &str = r#"You are an ATS evaluator. Compare the resume against the job description.

Return ONLY a JSON object with this schema:
{
  "score": 0-100,
  "required_skills": ["skill1", "skill2"] OR ["all required skills are there"],
  "feedback": "detailed feedback",
  "short_summary": "1-2 line summary"
}

"required_skills" lists the skills the job requires that the resume does not show.

Resume Text:
{resume_text}

Job Description:
{job_description}

Candidate: {candidate_name}

Return ONLY JSON."#;

pub fn build_screening_prompt(
    resume_text: &str,
    job_description: &str,
    candidate_name: Option<&str>,
) -> String {
    // Substituted last-to-first: inserted text always lands after the remaining
    // placeholders, so placeholder-like input is never expanded.
    SCREENING_PROMPT_TEMPLATE
        .replacen("{candidate_name}", candidate_name.unwrap_or("Unknown"), 1)
        .replacen("{job_description}", job_description, 1)
        .replacen("{resume_text}", resume_text, 1)
}
