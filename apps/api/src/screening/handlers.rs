//! Axum route handlers for the Screening API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::result::ScreeningResultRow;
use crate::screening::normalize::ScreeningVerdict;
use crate::screening::scorer::score_resume;
use crate::screening::store::{insert_result, list_results, NewResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckResumeRequest {
    pub user_id: Uuid,
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub job_description: String,
    pub file_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResumeResponse {
    pub model_response: Value,
    pub verdict: ScreeningVerdict,
    pub saved: ScreeningResultRow,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// POST /api/check-resume
///
/// Scores extracted resume text against a job description and stores the result.
pub async fn handle_check_resume(
    State(state): State<AppState>,
    Json(request): Json<CheckResumeRequest>,
) -> Result<Json<CheckResumeResponse>, AppError> {
    validate_check_request(&request)?;

    let candidate_name = request
        .candidate_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let (model_response, verdict) = score_resume(
        &state.llm,
        &request.extracted_text,
        &request.job_description,
        candidate_name,
    )
    .await?;

    let saved = insert_result(
        &state.db,
        NewResult {
            user_id: request.user_id,
            candidate_name,
            file_url: request.file_url.as_deref(),
            verdict: &verdict,
        },
    )
    .await?;

    Ok(Json(CheckResumeResponse {
        model_response,
        verdict,
        saved,
    }))
}

/// GET /api/results?user_id=
///
/// Lists a user's screening results, newest first.
pub async fn handle_list_results(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ScreeningResultRow>>, AppError> {
    let rows = list_results(&state.db, params.user_id).await?;
    Ok(Json(rows))
}

fn validate_check_request(request: &CheckResumeRequest) -> Result<(), AppError> {
    if request.extracted_text.trim().is_empty() || request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "extracted_text and job_description are required".to_string(),
        ));
    }
    Ok(())
}
