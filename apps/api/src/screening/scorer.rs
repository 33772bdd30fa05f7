use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::screening::normalize::ScreeningVerdict;
use crate::screening::prompts::{build_screening_prompt, SCREENING_SYSTEM};

/// Asks the model to score `resume_text` against `job_description`.
/// Returns the raw model object alongside its normalised verdict.
pub async fn score_resume(
    llm: &LlmClient,
    resume_text: &str,
    job_description: &str,
    candidate_name: Option<&str>,
) -> Result<(Value, ScreeningVerdict), AppError> {
    let prompt = build_screening_prompt(resume_text, job_description, candidate_name);
    let raw: Value = llm
        .call_json(&prompt, SCREENING_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Resume screening failed: {e}")))?;

    if !raw.is_object() {
        return Err(AppError::Llm(format!(
            "Resume screening returned a non-object: {raw}"
        )));
    }

    let verdict = ScreeningVerdict::from_model(&raw);
    info!(
        "Screening scored {:?} with {} missing skill(s)",
        verdict.score,
        verdict.required_skills.len()
    );
    Ok((raw, verdict))
}
