use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::files::models::{File, FileSource, FileSourceType};

/// Response DTO for file operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponseDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_name: String,
    pub extension: String,
    /// Size in bytes
    pub size: i64,
    pub mime_type: String,
    pub url: String,
    pub source: FileSource,
    pub created_at: DateTime<Utc>,
}

impl From<File> for FileResponseDto {
    fn from(file: File) -> Self {
        Self {
            source: file.source(),
            id: file.id,
            owner_id: file.owner_id,
            original_name: file.original_name,
            extension: file.extension,
            size: file.size,
            mime_type: file.mime_type,
            url: file.url,
            created_at: file.created_at,
        }
    }
}

/// Query params for listing the current user's files
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilesQuery {
    #[serde(alias = "sourceType")]
    pub source_type: Option<FileSourceType>,
}

/// Bytes received from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub original_name: String,
    pub mime_type: String,
}

/// Allowed MIME types for file uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
];

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Get file extension from content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        "application/pdf" => Some("pdf"),
        "application/msword" => Some("doc"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("docx"),
        "application/vnd.ms-excel" => Some("xls"),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some("xlsx"),
        "application/vnd.ms-powerpoint" => Some("ppt"),
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
            Some("pptx")
        }
        "text/plain" => Some("txt"),
        "text/csv" => Some("csv"),
        _ => None,
    }
}

/// Extension a file is stored under, taken from its validated MIME type.
///
/// The client's file name never decides the extension, since the static file
/// server picks the response content type from it.
pub fn stored_extension(content_type: &str) -> &'static str {
    get_extension_from_content_type(content_type).unwrap_or("bin")
}
