//! Local disk storage for uploaded files
//!
//! Files live under `<root>/<owner_id>/<file_id>.<ext>` and are served by the
//! HTTP layer from `/uploads`, so the public URL mirrors the storage path.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;

/// Route prefix under which the storage root is served
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Where a saved file ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Path relative to the storage root, e.g. `<owner_id>/<file_id>.png`
    pub storage_path: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.upload_dir, &config.public_base_url)
    }

    /// Create the storage root if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create upload directory '{}': {}",
                self.root.display(),
                e
            ))
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative storage path for a file
    pub fn generate_key(owner_id: Uuid, file_id: Uuid, extension: &str) -> String {
        format!("{}/{}.{}", owner_id, file_id, extension)
    }

    /// Public URL for a storage path
    pub fn public_url(&self, storage_path: &str) -> String {
        format!("{}{}/{}", self.public_base_url, UPLOADS_ROUTE, storage_path)
    }

    /// Write bytes for a file, creating the owner folder on demand
    pub async fn save(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredObject, AppError> {
        let storage_path = Self::generate_key(owner_id, file_id, extension);
        let full_path = self.resolve(&storage_path)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Internal(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(&full_path, data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write file '{}': {}", storage_path, e))
        })?;

        debug!("Stored file '{}' ({} bytes)", storage_path, data.len());

        Ok(StoredObject {
            url: self.public_url(&storage_path),
            storage_path,
        })
    }

    /// Remove a stored file.
    ///
    /// Returns `false` when the file was already gone.
    pub async fn delete(&self, storage_path: &str) -> Result<bool, AppError> {
        let full_path = self.resolve(storage_path)?;

        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!("Deleted file '{}'", storage_path);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Internal(format!(
                "Failed to delete file '{}': {}",
                storage_path, e
            ))),
        }
    }

    pub async fn exists(&self, storage_path: &str) -> Result<bool, AppError> {
        let full_path = self.resolve(storage_path)?;
        tokio::fs::try_exists(&full_path).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to check if file '{}' exists: {}",
                storage_path, e
            ))
        })
    }

    fn resolve(&self, storage_path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(storage_path);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(AppError::BadRequest(format!(
                "Invalid storage path '{}'",
                storage_path
            )));
        }
        Ok(self.root.join(relative))
    }
}
