use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::files::models::File;

/// Copy of a file's metadata embedded in a content entity (`cover`, `avatar`).
///
/// A weak reference: nothing enforces that `id` still exists in `files`. Deleting
/// the file clears every snapshot carrying its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub id: Uuid,
    pub url: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&File> for FileSnapshot {
    fn from(file: &File) -> Self {
        Self {
            id: file.id,
            url: file.url.clone(),
            original_name: file.original_name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
            owner_id: file.owner_id,
            created_at: file.created_at,
        }
    }
}
