//! PDF strategy chain.
//!
//! PDFs are either machine-generated with a text layer or scanned images. The chain
//! tries the cheap text layer first, then local OCR, then the hosted OCR service,
//! stopping at the first stage that yields non-blank text. Stages never retry:
//! a stage's failure is deterministic for the same bytes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::extract::fetch::FetchedDocument;
use crate::extract::ocr::{OcrEngine, OcrSpaceClient, OCR_SPACE_PROVIDER};
use crate::extract::outcome::{StageAttempt, StageKind};

/// One strategy in the PDF chain.
#[async_trait]
pub trait PdfStage: Send + Sync {
    fn kind(&self) -> StageKind;

    /// Whether text from this stage came from character recognition.
    fn is_ocr(&self) -> bool {
        false
    }

    /// Provider name reported to callers when this stage is a hosted service.
    fn provider(&self) -> Option<&str> {
        None
    }

    async fn run(&self, doc: &FetchedDocument) -> StageAttempt;
}

/// Stage 1: the PDF's own text layer via `pdf-extract`.
pub struct TextLayerStage;

#[async_trait]
impl PdfStage for TextLayerStage {
    fn kind(&self) -> StageKind {
        StageKind::TextLayer
    }

    async fn run(&self, doc: &FetchedDocument) -> StageAttempt {
        let bytes = doc.bytes.clone();
        // pdf-extract is synchronous and may panic on malformed input.
        let joined =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

        match joined {
            Ok(Ok(text)) => StageAttempt::Text(text),
            Ok(Err(e)) => {
                debug!("Text layer parse failed: {e}");
                StageAttempt::Failed(format!("text layer parse failed: {e}"))
            }
            Err(e) => {
                warn!("Text layer parser aborted: {e}");
                StageAttempt::Failed(format!("text layer parser aborted: {e}"))
            }
        }
    }
}

/// Stage 2: render and recognise every page locally.
pub struct LocalOcrStage {
    engine: Arc<dyn OcrEngine>,
}

impl LocalOcrStage {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl PdfStage for LocalOcrStage {
    fn kind(&self) -> StageKind {
        StageKind::LocalOcr
    }

    fn is_ocr(&self) -> bool {
        true
    }

    async fn run(&self, doc: &FetchedDocument) -> StageAttempt {
        match self.engine.recognize_pdf(&doc.bytes).await {
            Ok(text) => StageAttempt::Text(text),
            Err(e) => {
                warn!("Local OCR ({}) failed: {e:#}", self.engine.name());
                StageAttempt::Failed(format!("{} failed: {e:#}", self.engine.name()))
            }
        }
    }
}

/// Stage 3: hosted OCR. Without a client (no API key) the stage is skipped.
pub struct ExternalOcrStage {
    client: Option<OcrSpaceClient>,
}

impl ExternalOcrStage {
    pub fn new(client: Option<OcrSpaceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PdfStage for ExternalOcrStage {
    fn kind(&self) -> StageKind {
        StageKind::ExternalOcr
    }

    fn is_ocr(&self) -> bool {
        true
    }

    fn provider(&self) -> Option<&str> {
        Some(OCR_SPACE_PROVIDER)
    }

    async fn run(&self, doc: &FetchedDocument) -> StageAttempt {
        let Some(client) = &self.client else {
            return StageAttempt::Skipped("no credential configured".to_string());
        };

        match client.parse_url(&doc.source).await {
            Ok(text) => StageAttempt::Text(text),
            Err(e) => {
                warn!("External OCR failed: {e}");
                StageAttempt::Failed(e.to_string())
            }
        }
    }
}

/// The production chain in priority order.
pub fn default_stages(
    engine: Arc<dyn OcrEngine>,
    ocr_service: Option<OcrSpaceClient>,
) -> Vec<Arc<dyn PdfStage>> {
    vec![
        Arc::new(TextLayerStage),
        Arc::new(LocalOcrStage::new(engine)),
        Arc::new(ExternalOcrStage::new(ocr_service)),
    ]
}
