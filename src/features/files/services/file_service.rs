use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{is_mime_type_allowed, stored_extension, FileResponseDto};
use crate::features::files::models::{File, FileSnapshot, FileSource, FileSourceType};
use crate::features::files::services::inline_images::{promote_inline_images, InlineImageSink};
use crate::modules::storage::LocalStorage;

const FILE_COLUMNS: &str = "id, owner_id, original_name, extension, size, mime_type, \
     storage_path, url, source_type, related_entity_id, source_title, created_at";

/// Every JSONB column holding a [`FileSnapshot`], as `(table, column)`
pub const SNAPSHOT_COLUMNS: &[(&str, &str)] = &[
    ("news", "cover"),
    ("talents", "avatar"),
    ("employments", "cover"),
];

/// Service for file operations
pub struct FileService {
    pool: PgPool,
    storage: Arc<LocalStorage>,
}

impl FileService {
    pub fn new(pool: PgPool, storage: Arc<LocalStorage>) -> Self {
        Self { pool, storage }
    }

    /// Store uploaded bytes and record the file
    pub async fn upload(
        &self,
        owner_id: Uuid,
        data: Vec<u8>,
        original_name: &str,
        mime_type: &str,
        source: FileSource,
    ) -> Result<FileResponseDto> {
        let extension = stored_extension(mime_type);
        let file = self
            .store(owner_id, &data, original_name, extension, mime_type, &source)
            .await?;

        Ok(file.into())
    }

    /// Write bytes to storage, then insert the record. The bytes are removed again
    /// when the insert fails.
    async fn store(
        &self,
        owner_id: Uuid,
        data: &[u8],
        original_name: &str,
        extension: &str,
        mime_type: &str,
        source: &FileSource,
    ) -> Result<File> {
        let file_id = Uuid::now_v7();
        let stored = self.storage.save(owner_id, file_id, extension, data).await?;

        let inserted = sqlx::query_as::<_, File>(&format!(
            r#"
            INSERT INTO files (id, owner_id, original_name, extension, size, mime_type,
                               storage_path, url, source_type, related_entity_id, source_title)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(file_id)
        .bind(owner_id)
        .bind(original_name)
        .bind(extension)
        .bind(data.len() as i64)
        .bind(mime_type)
        .bind(&stored.storage_path)
        .bind(&stored.url)
        .bind(source.kind.as_str())
        .bind(source.related_entity_id)
        .bind(&source.title)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(file) => {
                info!(
                    "File saved: id={}, path={}, source={}, size={}",
                    file.id, file.storage_path, file.source_type, file.size
                );
                Ok(file)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored.storage_path).await {
                    warn!(
                        "Failed to remove orphaned file '{}': {}",
                        stored.storage_path, cleanup
                    );
                }
                Err(AppError::Database(e))
            }
        }
    }

    pub async fn find_by_id(&self, file_id: Uuid) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!(
            "SELECT {} FROM files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    /// The owner's files, newest first
    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
        source_type: Option<FileSourceType>,
    ) -> Result<Vec<FileResponseDto>> {
        let files = sqlx::query_as::<_, File>(&format!(
            r#"
            SELECT {} FROM files
            WHERE owner_id = $1 AND ($2::text IS NULL OR source_type = $2)
            ORDER BY created_at DESC
            "#,
            FILE_COLUMNS
        ))
        .bind(owner_id)
        .bind(source_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(files.into_iter().map(FileResponseDto::from).collect())
    }

    /// Snapshot of a file for embedding in a content entity
    pub async fn snapshot(&self, file_id: Uuid) -> Result<FileSnapshot> {
        let file = self
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        Ok(FileSnapshot::from(&file))
    }

    /// Delete a file on behalf of its owner
    pub async fn delete(&self, file_id: Uuid, actor_id: Uuid) -> Result<()> {
        let file = self
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if file.owner_id != actor_id {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this file".to_string(),
            ));
        }

        self.delete_cascade(&file).await
    }

    /// Clear every snapshot of the file and delete the record in one transaction,
    /// then remove the bytes.
    ///
    /// A database failure leaves the record, the snapshots and the bytes in place.
    /// Bytes that cannot be removed after commit are only logged.
    async fn delete_cascade(&self, file: &File) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let file_id = file.id.to_string();
        let mut cleared = 0;

        for (table, column) in SNAPSHOT_COLUMNS {
            let result = sqlx::query(&format!(
                "UPDATE {table} SET {column} = NULL, updated_at = NOW() WHERE {column} ->> 'id' = $1"
            ))
            .bind(&file_id)
            .execute(&mut *tx)
            .await?;
            cleared += result.rows_affected();
        }

        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        match self.storage.delete(&file.storage_path).await {
            Ok(true) => {}
            Ok(false) => warn!(
                "File {} was already missing from storage at '{}'",
                file.id, file.storage_path
            ),
            Err(e) => warn!(
                "File {} deleted but its bytes at '{}' could not be removed: {}",
                file.id, file.storage_path, e
            ),
        }

        info!(
            "File deleted: id={}, path={}, snapshots cleared={}",
            file.id, file.storage_path, cleared
        );
        Ok(())
    }

    /// Delete every file recorded against a content entity that is going away
    pub async fn purge_related(
        &self,
        source_types: &[FileSourceType],
        entity_id: Uuid,
    ) -> Result<usize> {
        let kinds: Vec<&str> = source_types.iter().map(|t| t.as_str()).collect();

        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {} FROM files WHERE related_entity_id = $1 AND source_type = ANY($2)",
            FILE_COLUMNS
        ))
        .bind(entity_id)
        .bind(&kinds)
        .fetch_all(&self.pool)
        .await?;

        for file in &files {
            self.delete_cascade(file).await?;
        }

        debug!("Purged {} files related to {}", files.len(), entity_id);
        Ok(files.len())
    }

    /// Promote inline base64 images in `content` to stored files
    pub async fn promote_content(
        &self,
        content: &str,
        owner_id: Uuid,
        source: &FileSource,
    ) -> String {
        promote_inline_images(content, owner_id, source, self)
            .await
            .content
    }
}

#[async_trait]
impl InlineImageSink for FileService {
    async fn store_inline_image(
        &self,
        owner_id: Uuid,
        mime_type: &str,
        data: Vec<u8>,
        source: &FileSource,
    ) -> Result<String> {
        if !is_mime_type_allowed(mime_type) {
            return Err(AppError::BadRequest(format!(
                "Inline image type '{}' is not allowed",
                mime_type
            )));
        }
        let extension = stored_extension(mime_type);
        let original_name = format!("image_{}.{}", Uuid::new_v4().simple(), extension);

        let file = self
            .store(owner_id, &data, &original_name, extension, mime_type, source)
            .await?;

        Ok(file.url)
    }
}
