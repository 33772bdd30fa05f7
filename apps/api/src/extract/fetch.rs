use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::classify::extension_from_url;

/// Upstream error bodies are cut to this many characters before being surfaced.
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid document URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch file: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to fetch file: {status} {body}")]
    Status { status: u16, body: String },
}

/// A downloaded document plus the signals used to classify it.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source: String,
    pub bytes: Bytes,
    /// Lowercased URL path suffix, may be empty.
    pub extension: String,
    /// Lowercased content-type header, may be empty.
    pub content_type: String,
}

impl FetchedDocument {
    pub fn new(source: impl Into<String>, bytes: impl Into<Bytes>, content_type: &str) -> Self {
        let source = source.into();
        Self {
            extension: extension_from_url(&source),
            content_type: content_type.trim().to_ascii_lowercase(),
            bytes: bytes.into(),
            source,
        }
    }
}

/// Single-shot document download over the shared HTTP client. No retries.
#[derive(Clone)]
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        let response = self.client.get(parsed).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Document fetch returned {status} for {url}");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response.bytes().await?;

        debug!(
            "Fetched {} bytes from {url} (content-type: {content_type:?})",
            bytes.len()
        );

        Ok(FetchedDocument::new(url, bytes, &content_type))
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
