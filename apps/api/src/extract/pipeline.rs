use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::extract::classify::{classify, FormatClass};
use crate::extract::fetch::{DocumentFetcher, FetchError, FetchedDocument};
use crate::extract::ocr::{OcrSpaceClient, TesseractCli};
use crate::extract::outcome::{
    Diagnostics, DocumentMeta, ExtractionOutcome, StageAttempt, StageKind, StageReport,
    StageStatus, EXHAUSTED_REASON, NO_OCR_CREDENTIAL_NOTE,
};
use crate::extract::pdf::{default_stages, PdfStage};
use crate::extract::word::extract_docx_text;

/// Turns a document URL into plain text.
///
/// Stateless across calls; the only shared resource is the HTTP client's
/// connection pool inside `fetcher` and the OCR service client.
pub struct ExtractionPipeline {
    fetcher: DocumentFetcher,
    pdf_stages: Vec<Arc<dyn PdfStage>>,
    deadline: Duration,
}

impl ExtractionPipeline {
    pub fn new(
        fetcher: DocumentFetcher,
        pdf_stages: Vec<Arc<dyn PdfStage>>,
        deadline: Duration,
    ) -> Self {
        Self {
            fetcher,
            pdf_stages,
            deadline,
        }
    }

    /// Production wiring: text layer, tesseract, then OCR.space when a key is configured.
    pub fn from_config(config: &Config, http: Client) -> Self {
        let engine = Arc::new(TesseractCli::new(
            &config.pdftoppm_path,
            &config.tesseract_path,
            config.ocr_dpi,
        ));

        let ocr_service = config.ocr_space_api_key.clone().map(|key| {
            OcrSpaceClient::new(http.clone(), key, config.ocr_space_endpoint.clone())
        });
        if ocr_service.is_none() {
            warn!("OCR_SPACE_API_KEY not set; external OCR fallback is disabled");
        }

        Self::new(
            DocumentFetcher::new(http),
            default_stages(engine, ocr_service),
            config.extract_deadline,
        )
    }

    /// Fetches `url` once and extracts it. Only the fetch can fail as an error;
    /// every extraction problem is reported inside the outcome.
    pub async fn extract_url(&self, url: &str) -> Result<ExtractionOutcome, FetchError> {
        let doc = self.fetcher.fetch(url).await?;
        Ok(self.extract_document(&doc).await)
    }

    pub async fn extract_document(&self, doc: &FetchedDocument) -> ExtractionOutcome {
        let format = classify(&doc.source, &doc.content_type);
        let meta = DocumentMeta::of(doc, format);
        let deadline = Instant::now() + self.deadline;

        info!(
            "Extracting {} ({} bytes) as {:?}",
            doc.source,
            doc.bytes.len(),
            format
        );

        let outcome = match format {
            FormatClass::Pdf => self.extract_pdf(doc, meta, deadline).await,
            FormatClass::Word => extract_word(doc, meta, deadline).await,
            FormatClass::Plain => extract_plain(doc, meta),
        };

        match &outcome {
            ExtractionOutcome::Success { text, used_ocr, .. } => info!(
                "Extraction succeeded: {} chars, ocr={used_ocr}",
                text.chars().count()
            ),
            ExtractionOutcome::Failure {
                reason,
                diagnostics,
                ..
            } => warn!(
                "Extraction failed: {reason}; stages={:?}",
                diagnostics.stage_sequence()
            ),
        }

        outcome
    }

    async fn extract_pdf(
        &self,
        doc: &FetchedDocument,
        meta: DocumentMeta,
        deadline: Instant,
    ) -> ExtractionOutcome {
        let mut diagnostics = Diagnostics::default();
        let mut stages = self.pdf_stages.iter();

        while let Some(stage) = stages.next() {
            let started = Instant::now();
            let attempt = match timeout_at(deadline, stage.run(doc)).await {
                Ok(attempt) => attempt.normalized(),
                Err(_) => {
                    warn!("{:?} overran the extraction deadline", stage.kind());
                    diagnostics.stages.push(report(
                        stage.kind(),
                        StageStatus::TimedOut,
                        Some("deadline elapsed".to_string()),
                        started,
                    ));
                    for rest in stages.by_ref() {
                        diagnostics.stages.push(report(
                            rest.kind(),
                            StageStatus::Cancelled,
                            None,
                            Instant::now(),
                        ));
                    }
                    break;
                }
            };

            match attempt {
                StageAttempt::Text(text) => {
                    diagnostics.stages.push(report(
                        stage.kind(),
                        StageStatus::Succeeded,
                        None,
                        started,
                    ));
                    return ExtractionOutcome::Success {
                        text,
                        used_ocr: stage.is_ocr(),
                        used_external_ocr: stage.provider().map(str::to_string),
                        meta,
                        diagnostics,
                    };
                }
                StageAttempt::Empty => {
                    diagnostics
                        .stages
                        .push(report(stage.kind(), StageStatus::Empty, None, started));
                }
                StageAttempt::Failed(detail) => {
                    diagnostics.stages.push(report(
                        stage.kind(),
                        StageStatus::Failed,
                        Some(detail),
                        started,
                    ));
                }
                StageAttempt::Skipped(detail) => {
                    if stage.kind() == StageKind::ExternalOcr {
                        diagnostics.notes.push(NO_OCR_CREDENTIAL_NOTE.to_string());
                    }
                    diagnostics.stages.push(report(
                        stage.kind(),
                        StageStatus::Skipped,
                        Some(detail),
                        started,
                    ));
                }
            }
        }

        ExtractionOutcome::Failure {
            reason: EXHAUSTED_REASON.to_string(),
            meta,
            diagnostics,
        }
    }
}

async fn extract_word(
    doc: &FetchedDocument,
    meta: DocumentMeta,
    deadline: Instant,
) -> ExtractionOutcome {
    let started = Instant::now();
    let bytes = doc.bytes.clone();
    let converted = timeout_at(
        deadline,
        tokio::task::spawn_blocking(move || extract_docx_text(&bytes)),
    )
    .await;

    let (status, error) = match converted {
        Ok(Ok(Ok(text))) => {
            let status = if text.is_empty() {
                StageStatus::Empty
            } else {
                StageStatus::Succeeded
            };
            return ExtractionOutcome::Success {
                text,
                used_ocr: false,
                used_external_ocr: None,
                meta,
                diagnostics: Diagnostics {
                    stages: vec![report(StageKind::WordXml, status, None, started)],
                    notes: vec![],
                },
            };
        }
        Ok(Ok(Err(e))) => (StageStatus::Failed, e.to_string()),
        Ok(Err(e)) => (StageStatus::Failed, format!("parser aborted: {e}")),
        Err(_) => (StageStatus::TimedOut, "deadline elapsed".to_string()),
    };

    ExtractionOutcome::Failure {
        reason: format!("Failed to extract DOCX: {error}"),
        meta,
        diagnostics: Diagnostics {
            stages: vec![report(StageKind::WordXml, status, Some(error), started)],
            notes: vec![],
        },
    }
}

fn extract_plain(doc: &FetchedDocument, meta: DocumentMeta) -> ExtractionOutcome {
    let started = Instant::now();
    let text = String::from_utf8_lossy(&doc.bytes).into_owned();
    let status = if text.trim().is_empty() {
        StageStatus::Empty
    } else {
        StageStatus::Succeeded
    };

    ExtractionOutcome::Success {
        text,
        used_ocr: false,
        used_external_ocr: None,
        meta,
        diagnostics: Diagnostics {
            stages: vec![report(StageKind::PlainText, status, None, started)],
            notes: vec![],
        },
    }
}

fn report(
    stage: StageKind,
    status: StageStatus,
    detail: Option<String>,
    started: Instant,
) -> StageReport {
    StageReport {
        stage,
        status,
        detail,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}
