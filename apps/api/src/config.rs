use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_OCR_SPACE_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Absent key disables the external OCR stage; extraction still runs.
    pub ocr_space_api_key: Option<String>,
    pub ocr_space_endpoint: String,
    pub tesseract_path: String,
    pub pdftoppm_path: String,
    pub ocr_dpi: u32,
    pub extract_deadline: Duration,
    pub fetch_timeout: Duration,
    pub max_upload_bytes: usize,
    pub upload_url_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            ocr_space_api_key: optional_env("OCR_SPACE_API_KEY"),
            ocr_space_endpoint: optional_env("OCR_SPACE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_OCR_SPACE_ENDPOINT.to_string()),
            tesseract_path: optional_env("TESSERACT_PATH")
                .unwrap_or_else(|| "tesseract".to_string()),
            pdftoppm_path: optional_env("PDFTOPPM_PATH").unwrap_or_else(|| "pdftoppm".to_string()),
            ocr_dpi: parse_env("OCR_DPI", 300)?,
            extract_deadline: Duration::from_secs(parse_env("EXTRACT_DEADLINE_SECS", 90)?),
            fetch_timeout: Duration::from_secs(parse_env("FETCH_TIMEOUT_SECS", 30)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            upload_url_ttl: Duration::from_secs(parse_env("UPLOAD_URL_TTL_SECS", 3600)?),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Blank values count as unset so an empty `OCR_SPACE_API_KEY=` in `.env` disables the stage.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
