use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::features::files::models::FileSnapshot;

/// Database model for news, joined with the author's username
#[derive(Debug, Clone, FromRow)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub cover: Option<Json<FileSnapshot>>,
    pub category: String,
    pub tags: Vec<String>,
    pub author_id: Uuid,
    pub author_username: Option<String>,
    pub status: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
