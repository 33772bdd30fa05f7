use sqlx::{PgPool, Result};
use tracing::info;
use uuid::Uuid;

use crate::models::result::ScreeningResultRow;
use crate::screening::normalize::ScreeningVerdict;

pub struct NewResult<'a> {
    pub user_id: Uuid,
    pub candidate_name: Option<&'a str>,
    pub file_url: Option<&'a str>,
    pub verdict: &'a ScreeningVerdict,
}

/// Inserts one scoring run and returns the stored row.
pub async fn insert_result(pool: &PgPool, new: NewResult<'_>) -> Result<ScreeningResultRow> {
    let NewResult {
        user_id,
        candidate_name,
        file_url,
        verdict,
    } = new;

    let short_summary = Some(verdict.short_summary.as_str()).filter(|s| !s.is_empty());

    let row = sqlx::query_as::<_, ScreeningResultRow>(
        r#"
        INSERT INTO screening_results
            (id, user_id, candidate_name, score, required_skills, feedback, short_summary, file_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(candidate_name)
    .bind(verdict.score)
    .bind(verdict.skills_csv())
    .bind(verdict.combined_feedback())
    .bind(short_summary)
    .bind(file_url)
    .fetch_one(pool)
    .await?;

    info!("Stored screening result {} for user {user_id}", row.id);
    Ok(row)
}

/// All results for a user, newest first.
pub async fn list_results(pool: &PgPool, user_id: Uuid) -> Result<Vec<ScreeningResultRow>> {
    let rows = sqlx::query_as::<_, ScreeningResultRow>(
        "SELECT * FROM screening_results WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
