//! Axum route handler for the extraction API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::extract::fetch::FetchError;
use crate::extract::outcome::{Diagnostics, DocumentMeta, ExtractionOutcome};
use crate::extract::pipeline::ExtractionPipeline;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub file_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub used_ocr: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_external_ocr: Option<String>,
}

/// Error responses of the extract route: `{ error, meta, diagnostics }`.
#[derive(Debug)]
pub enum ExtractFailure {
    BadRequest(String),
    Upstream(FetchError),
    Extraction {
        reason: String,
        meta: DocumentMeta,
        diagnostics: Diagnostics,
    },
}

impl IntoResponse for ExtractFailure {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ExtractFailure::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "meta": null, "diagnostics": null }),
            ),
            ExtractFailure::Upstream(e) => {
                error!("Upstream fetch failed: {e}");
                let meta = match &e {
                    FetchError::Status { status, .. } => json!({ "upstreamStatus": status }),
                    _ => serde_json::Value::Null,
                };
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": e.to_string(), "meta": meta, "diagnostics": null }),
                )
            }
            ExtractFailure::Extraction {
                reason,
                meta,
                diagnostics,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": reason, "meta": meta, "diagnostics": diagnostics }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

fn into_result(outcome: ExtractionOutcome) -> Result<ExtractResponse, ExtractFailure> {
    match outcome {
        ExtractionOutcome::Success {
            text,
            used_ocr,
            used_external_ocr,
            ..
        } => Ok(ExtractResponse {
            text,
            used_ocr,
            used_external_ocr,
        }),
        ExtractionOutcome::Failure {
            reason,
            meta,
            diagnostics,
        } => Err(ExtractFailure::Extraction {
            reason,
            meta,
            diagnostics,
        }),
    }
}

/// POST /api/extract
///
/// Fetches the document at `file_url` and returns its plain text.
pub async fn handle_extract(
    State(pipeline): State<Arc<ExtractionPipeline>>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ExtractFailure> {
    let Json(request) = payload.map_err(|e| ExtractFailure::BadRequest(e.body_text()))?;

    let file_url = request
        .file_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ExtractFailure::BadRequest("file_url is required".to_string()))?;

    let outcome = match pipeline.extract_url(&file_url).await {
        Ok(outcome) => outcome,
        Err(FetchError::InvalidUrl(msg)) => {
            return Err(ExtractFailure::BadRequest(format!(
                "file_url is not a valid URL: {msg}"
            )))
        }
        Err(e) => return Err(ExtractFailure::Upstream(e)),
    };

    into_result(outcome).map(Json)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Form, Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::extract::fetch::DocumentFetcher;
    use crate::extract::fixtures;
    use crate::extract::ocr::{OcrSpaceClient, TesseractCli};
    use crate::extract::outcome::NO_OCR_CREDENTIAL_NOTE;
    use crate::extract::pdf::default_stages;

    fn app(ocr_service: Option<OcrSpaceClient>) -> Router {
        let engine = Arc::new(TesseractCli::new(
            "/nonexistent/screener-pdftoppm",
            "/nonexistent/screener-tesseract",
            150,
        ));
        let pipeline = ExtractionPipeline::new(
            DocumentFetcher::new(fixtures::http_client()),
            default_stages(engine, ocr_service),
            Duration::from_secs(30),
        );
        Router::new()
            .route("/api/extract", post(handle_extract))
            .with_state(Arc::new(pipeline))
    }

    async fn call(app: Router, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/extract")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn extract(app: Router, file_url: &str) -> (StatusCode, Value) {
        call(app, json!({ "file_url": file_url }).to_string()).await
    }

    #[tokio::test]
    async fn test_text_pdf_end_to_end() {
        let host = fixtures::serve(Router::new().route(
            "/files/resume.pdf",
            fixtures::document_route(fixtures::text_pdf("Hello World"), Some("application/pdf")),
        ))
        .await;

        let (status, body) =
            extract(app(None), &format!("http://{host}/files/resume.pdf")).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let text = body["text"].as_str().unwrap();
        assert!(fixtures::squash(text).contains("Hello World"), "{text:?}");
        assert!(body.get("usedOcr").is_none());
        assert!(body.get("usedExternalOcr").is_none());
    }

    #[tokio::test]
    async fn test_docx_end_to_end() {
        let host = fixtures::serve(Router::new().route(
            "/files/cv.docx",
            fixtures::document_route(fixtures::docx(&["Hello World"]), None),
        ))
        .await;

        let (status, body) = extract(app(None), &format!("http://{host}/files/cv.docx")).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body, json!({ "text": "Hello World" }));
    }

    #[tokio::test]
    async fn test_plain_text_end_to_end() {
        let host = fixtures::serve(Router::new().route(
            "/files/abc",
            fixtures::document_route(b"abc".to_vec(), Some("text/plain")),
        ))
        .await;

        let (status, body) = extract(app(None), &format!("http://{host}/files/abc")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": "abc" }));
    }

    #[tokio::test]
    async fn test_missing_file_url_is_bad_request() {
        let (status, body) = call(app(None), "{}".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "file_url is required");

        let (status, _) = call(app(None), json!({ "file_url": "  " }).to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, body) = call(app(None), "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_url_is_bad_request() {
        let (status, _) = extract(app(None), "resume.pdf").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_error_is_bad_gateway() {
        let host = fixtures::serve(Router::new()).await;

        let (status, body) = extract(app(None), &format!("http://{host}/missing.pdf")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("404"), "{body}");
        assert_eq!(body["meta"]["upstreamStatus"], 404);
    }

    #[tokio::test]
    async fn test_scanned_pdf_without_credential_reports_diagnostics() {
        let scan = fixtures::image_only_pdf();
        let scan_len = scan.len();
        let host = fixtures::serve(Router::new().route(
            "/files/scan.pdf",
            fixtures::document_route(scan, Some("application/pdf")),
        ))
        .await;

        let (status, body) = extract(app(None), &format!("http://{host}/files/scan.pdf")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "extraction exhausted");
        assert_eq!(body["meta"]["byteLength"], scan_len);
        assert_eq!(body["meta"]["extension"], "pdf");
        assert_eq!(body["meta"]["contentType"], "application/pdf");
        assert_eq!(body["meta"]["format"], "pdf");
        assert_eq!(body["diagnostics"]["notes"][0], NO_OCR_CREDENTIAL_NOTE);

        let stages: Vec<(&str, &str)> = body["diagnostics"]["stages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| (s["stage"].as_str().unwrap(), s["status"].as_str().unwrap()))
            .collect();
        assert_eq!(stages[0].0, "text_layer");
        assert_eq!(stages[1], ("local_ocr", "failed"));
        assert_eq!(stages[2], ("external_ocr", "skipped"));
    }

    #[tokio::test]
    async fn test_external_ocr_fallback_end_to_end() {
        let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();
        let recorder = seen.clone();
        let ocr_host = fixtures::serve(Router::new().route(
            "/parse/image",
            post(move |Form(fields): Form<HashMap<String, String>>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(fields);
                    Json(json!({
                        "ParsedResults": [{ "ParsedText": "Jane Doe\r\nRust Engineer" }],
                        "IsErroredOnProcessing": false
                    }))
                }
            }),
        ))
        .await;
        let doc_host = fixtures::serve(Router::new().route(
            "/files/scan.pdf",
            fixtures::document_route(fixtures::image_only_pdf(), Some("application/pdf")),
        ))
        .await;

        let ocr_service = OcrSpaceClient::new(
            fixtures::http_client(),
            "test-key".to_string(),
            format!("http://{ocr_host}/parse/image"),
        );
        let doc_url = format!("http://{doc_host}/files/scan.pdf");
        let (status, body) = extract(app(Some(ocr_service)), &doc_url).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["text"], "Jane Doe\r\nRust Engineer");
        assert_eq!(body["usedOcr"], true);
        assert_eq!(body["usedExternalOcr"], "ocr.space");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["apikey"], "test-key");
        assert_eq!(seen[0]["url"], doc_url);
        assert_eq!(seen[0]["language"], "eng");
        assert_eq!(seen[0]["isOverlayRequired"], "false");
    }

    #[tokio::test]
    async fn test_external_ocr_server_error_is_exhaustion() {
        let ocr_host = fixtures::serve(Router::new().route(
            "/parse/image",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        ))
        .await;
        let doc_host = fixtures::serve(Router::new().route(
            "/files/scan.pdf",
            fixtures::document_route(fixtures::image_only_pdf(), Some("application/pdf")),
        ))
        .await;
        let ocr_service = OcrSpaceClient::new(
            fixtures::http_client(),
            "test-key".to_string(),
            format!("http://{ocr_host}/parse/image"),
        );

        let (status, body) = extract(
            app(Some(ocr_service)),
            &format!("http://{doc_host}/files/scan.pdf"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "extraction exhausted");
        assert_eq!(body["diagnostics"]["stages"][2]["status"], "failed");
        assert!(body["diagnostics"]["notes"].as_array().unwrap().is_empty());
    }
}
