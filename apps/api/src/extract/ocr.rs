//! OCR engines used by the PDF fallback stages.
//!
//! `TesseractCli` renders pages with `pdftoppm` and recognises them one at a time
//! with the `tesseract` binary. `OcrSpaceClient` hands the document URL to a hosted
//! OCR.space-compatible API, which downloads the file itself.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

pub const OCR_SPACE_PROVIDER: &str = "ocr.space";
const OCR_LANGUAGE: &str = "eng";
const PAGE_PREFIX: &str = "page";

/// In-process (local) OCR over a whole PDF.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;
    async fn recognize_pdf(&self, pdf: &[u8]) -> Result<String>;
}

/// Local OCR through the poppler and tesseract command-line tools.
pub struct TesseractCli {
    pdftoppm: PathBuf,
    tesseract: PathBuf,
    dpi: u32,
}

impl TesseractCli {
    pub fn new(pdftoppm: impl Into<PathBuf>, tesseract: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            pdftoppm: pdftoppm.into(),
            tesseract: tesseract.into(),
            dpi,
        }
    }

    async fn render_pages(&self, input: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
        let output = Command::new(&self.pdftoppm)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(input)
            .arg(dir.join(PAGE_PREFIX))
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.pdftoppm.display()))?;
        check_exit("pdftoppm", &output)?;

        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut pages = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(number) = page_number(&path) {
                pages.push((number, path));
            }
        }
        pages.sort_by_key(|(number, _)| *number);
        Ok(pages.into_iter().map(|(_, path)| path).collect())
    }

    async fn recognize_page(&self, image: &Path) -> Result<String> {
        let output = Command::new(&self.tesseract)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(OCR_LANGUAGE)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.tesseract.display()))?;
        check_exit("tesseract", &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize_pdf(&self, pdf: &[u8]) -> Result<String> {
        let dir = tempfile::tempdir().context("failed to create OCR scratch dir")?;
        let input = dir.path().join("document.pdf");
        tokio::fs::write(&input, pdf).await?;

        let pages = self.render_pages(&input, dir.path()).await?;
        if pages.is_empty() {
            bail!("pdftoppm produced no page images");
        }
        debug!("Rendered {} page(s) for OCR", pages.len());

        // Page order matters: output is concatenated as the document reads.
        let mut text = String::new();
        for page in &pages {
            let page_text = self.recognize_page(page).await?;
            text.push_str(page_text.trim_end());
            text.push_str("\n\n");
        }
        Ok(text)
    }
}

fn check_exit(tool: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    bail!("{tool} exited with {}: {}", output.status, stderr.trim())
}

/// Parses the page number out of pdftoppm output names such as `page-7.png` or `page-007.png`.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (prefix, number) = stem.rsplit_once('-')?;
    if prefix != PAGE_PREFIX {
        return None;
    }
    number.parse().ok()
}

#[derive(Debug, Error)]
pub enum OcrServiceError {
    #[error("OCR service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OCR service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("OCR service response was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("OCR service reported an error: {0}")]
    Processing(String),

    #[error("OCR service returned no text")]
    NoText,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

/// Client for an OCR.space-compatible parse endpoint.
#[derive(Clone)]
pub struct OcrSpaceClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OcrSpaceClient {
    pub fn new(client: Client, api_key: String, endpoint: String) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }

    /// Asks the service to fetch and recognise `document_url`; returns the first page's text.
    pub async fn parse_url(&self, document_url: &str) -> Result<String, OcrServiceError> {
        let form = [
            ("apikey", self.api_key.as_str()),
            ("url", document_url),
            ("language", OCR_LANGUAGE),
            ("isOverlayRequired", "false"),
        ];

        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OcrServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        first_parsed_text(&body)
    }
}

fn first_parsed_text(body: &str) -> Result<String, OcrServiceError> {
    let parsed: OcrSpaceResponse = serde_json::from_str(body)?;

    let text = parsed
        .parsed_results
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|r| r.parsed_text)
        .filter(|t| !t.trim().is_empty());

    match text {
        Some(text) => Ok(text),
        None if parsed.is_errored_on_processing => Err(OcrServiceError::Processing(
            parsed
                .error_message
                .map(|m| error_message_text(&m))
                .unwrap_or_else(|| "unknown error".to_string()),
        )),
        None => Err(OcrServiceError::NoText),
    }
}

/// `ErrorMessage` arrives either as a string or as a list of strings.
fn error_message_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}
