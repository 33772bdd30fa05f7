use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One scoring run, as stored in `screening_results`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScreeningResultRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub candidate_name: Option<String>,
    pub score: Option<i32>,
    pub required_skills: String,
    pub feedback: String,
    pub short_summary: Option<String>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
