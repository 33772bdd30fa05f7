use serde::Serialize;

use crate::extract::classify::FormatClass;
use crate::extract::fetch::FetchedDocument;

pub const EXHAUSTED_REASON: &str = "extraction exhausted";
pub const NO_OCR_CREDENTIAL_NOTE: &str = "external OCR skipped: no credential";

/// Identifies one extraction strategy in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    TextLayer,
    LocalOcr,
    ExternalOcr,
    WordXml,
    PlainText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Succeeded,
    Empty,
    Failed,
    Skipped,
    TimedOut,
    Cancelled,
}

/// What a single strategy produced. Failures never escape a stage as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StageAttempt {
    Text(String),
    Empty,
    Failed(String),
    Skipped(String),
}

impl StageAttempt {
    /// Collapses whitespace-only text into `Empty`.
    pub fn normalized(self) -> Self {
        match self {
            StageAttempt::Text(text) if text.trim().is_empty() => StageAttempt::Empty,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub stage: StageKind,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub elapsed_ms: u64,
}

/// File metadata echoed back to operators on failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub byte_length: usize,
    pub extension: String,
    pub content_type: String,
    pub format: FormatClass,
}

impl DocumentMeta {
    pub fn of(doc: &FetchedDocument, format: FormatClass) -> Self {
        Self {
            byte_length: doc.bytes.len(),
            extension: doc.extension.clone(),
            content_type: doc.content_type.clone(),
            format,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub stages: Vec<StageReport>,
    pub notes: Vec<String>,
}

impl Diagnostics {
    /// Stage order as attempted, including skipped and cancelled entries.
    pub fn stage_sequence(&self) -> Vec<(StageKind, StageStatus)> {
        self.stages.iter().map(|s| (s.stage, s.status)).collect()
    }

    pub fn was_invoked(&self, kind: StageKind) -> bool {
        self.stages.iter().any(|s| {
            s.stage == kind
                && !matches!(s.status, StageStatus::Skipped | StageStatus::Cancelled)
        })
    }
}

#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    Success {
        text: String,
        used_ocr: bool,
        used_external_ocr: Option<String>,
        meta: DocumentMeta,
        diagnostics: Diagnostics,
    },
    Failure {
        reason: String,
        meta: DocumentMeta,
        diagnostics: Diagnostics,
    },
}

impl ExtractionOutcome {
    pub fn meta(&self) -> &DocumentMeta {
        match self {
            ExtractionOutcome::Success { meta, .. } | ExtractionOutcome::Failure { meta, .. } => {
                meta
            }
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            ExtractionOutcome::Success { diagnostics, .. }
            | ExtractionOutcome::Failure { diagnostics, .. } => diagnostics,
        }
    }

    /// Text that callers may actually use: present and not blank.
    pub fn usable_text(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Success { text, .. } if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}
