use aws_sdk_s3::{presigning::PresigningConfig, primitives::ByteStream};
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::object_key_for;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub key: String,
    pub file_url: String,
}

struct UploadForm {
    user_id: Uuid,
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /api/upload
///
/// Multipart fields: `user_id`, `file`. Stores the file in S3 and returns a
/// time-limited GET URL for it.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_upload_form(multipart, state.config.max_upload_bytes).await?;
    let key = object_key_for(form.user_id, &form.file_name);
    let size = form.data.len();

    let mut put = state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&key)
        .body(ByteStream::from(form.data));
    if let Some(ct) = form.content_type {
        put = put.content_type(ct);
    }
    put.send()
        .await
        .map_err(|e| AppError::S3(format!("put_object {key}: {e}")))?;

    let presigning = PresigningConfig::expires_in(state.config.upload_url_ttl)
        .map_err(|e| AppError::S3(format!("presigning config: {e}")))?;
    let presigned = state
        .s3
        .get_object()
        .bucket(&state.config.s3_bucket)
        .key(&key)
        .presigned(presigning)
        .await
        .map_err(|e| AppError::S3(format!("presign {key}: {e}")))?;

    info!("Stored upload {key} ({size} bytes)");

    Ok(Json(UploadResponse {
        key,
        file_url: presigned.uri().to_string(),
    }))
}

async fn read_upload_form(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<UploadForm, AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut file: Option<(String, Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "user_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read user_id: {e}")))?;
                let parsed = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?;
                user_id = Some(parsed);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file data: {e}")))?;
                file = Some((file_name, content_type, data));
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    let user_id = user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if data.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "file is {} bytes; the limit is {max_bytes}",
            data.len()
        )));
    }

    Ok(UploadForm {
        user_id,
        file_name,
        content_type,
        data,
    })
}
