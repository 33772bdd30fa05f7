use std::collections::BTreeMap;

use axum::Json;
use serde::Serialize;

/// Variables reported by the env probe. Values are never exposed.
const PROBED_VARS: &[&str] = &[
    "DATABASE_URL",
    "S3_BUCKET",
    "S3_ENDPOINT",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "ANTHROPIC_API_KEY",
    "OCR_SPACE_API_KEY",
    "TESSERACT_PATH",
    "PDFTOPPM_PATH",
];

#[derive(Debug, Serialize)]
pub struct EnvPresence {
    pub present: BTreeMap<&'static str, bool>,
}

/// GET /api/debug/env
pub async fn env_presence_handler() -> Json<EnvPresence> {
    Json(probe(|key| std::env::var_os(key).is_some_and(|v| !v.is_empty())))
}

fn probe(is_set: impl Fn(&str) -> bool) -> EnvPresence {
    EnvPresence {
        present: PROBED_VARS.iter().map(|k| (*k, is_set(k))).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_reports_booleans_only() {
        let report = probe(|k| k == "OCR_SPACE_API_KEY");
        assert_eq!(report.present.len(), PROBED_VARS.len());
        assert!(report.present["OCR_SPACE_API_KEY"]);
        assert!(!report.present["DATABASE_URL"]);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["present"]["ANTHROPIC_API_KEY"].is_boolean());
    }
}
