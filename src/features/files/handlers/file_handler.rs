use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    is_mime_type_allowed, FileResponseDto, ListFilesQuery, UploadedFile, ALLOWED_MIME_TYPES,
    MAX_FILE_SIZE,
};
use crate::features::files::models::{FileSource, FileSourceType};
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `sourceType`: what the file is for (optional, defaults to `user_upload`)
/// - `relatedEntityId`: the news/talent/employment it belongs to (optional)
/// - `title`: title of the related entity (optional)
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let mut upload: Option<UploadedFile> = None;
    let mut source_type = FileSourceType::default();
    let mut related_entity_id: Option<Uuid> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let mime_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let original_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                upload = Some(UploadedFile {
                    data: data.to_vec(),
                    original_name,
                    mime_type,
                });
            }
            "sourceType" | "source_type" => {
                let text = read_text(field, &field_name).await?;
                if !text.is_empty() {
                    source_type = FileSourceType::parse(&text).ok_or_else(|| {
                        AppError::BadRequest(format!("Unknown source type '{}'", text))
                    })?;
                }
            }
            "relatedEntityId" | "related_entity_id" | "newsId" | "talentId" | "employmentId" => {
                let text = read_text(field, &field_name).await?;
                if !text.is_empty() {
                    let id = Uuid::parse_str(&text).map_err(|_| {
                        AppError::BadRequest(format!("Invalid {}: '{}'", field_name, text))
                    })?;
                    related_entity_id = Some(id);
                }
            }
            "title" => {
                title = Some(read_text(field, &field_name).await?);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    if upload.data.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }

    if upload.data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&upload.mime_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            upload.mime_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    let source = FileSource::new(source_type, related_entity_id, title);
    let response = service
        .upload(
            user.user_id,
            upload.data,
            &upload.original_name,
            &upload.mime_type,
            source,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("File uploaded".to_string()),
            None,
        )),
    ))
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|text| text.trim().to_string())
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

/// List the current user's files, newest first
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppQuery(query): AppQuery<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>, AppError> {
    let files = service.list_for_owner(user.user_id, query.source_type).await?;
    Ok(Json(ApiResponse::success(Some(files), None, None)))
}

/// Delete a file
///
/// Only the owner of the file can delete it. Every cover/avatar that still
/// shows the file is cleared first.
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    service.delete(file_id, user.user_id).await?;
    Ok(Json(ApiResponse::message("File deleted")))
}
