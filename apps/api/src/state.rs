use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::extract::ExtractionPipeline;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Document-to-text pipeline; the extract handler takes only this.
    pub extractor: Arc<ExtractionPipeline>,
}
