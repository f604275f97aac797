use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::FileSnapshot;
use crate::features::news::models::News;
use crate::shared::types::PublishStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsAuthorDto {
    pub id: Uuid,
    pub username: Option<String>,
}

/// Response DTO for news
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsResponseDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub cover: Option<FileSnapshot>,
    pub category: String,
    pub tags: Vec<String>,
    pub author: NewsAuthorDto,
    pub status: PublishStatus,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<News> for NewsResponseDto {
    fn from(n: News) -> Self {
        Self {
            id: n.id,
            title: n.title,
            content: n.content,
            summary: n.summary,
            cover: n.cover.map(|c| c.0),
            category: n.category,
            tags: n.tags,
            author: NewsAuthorDto {
                id: n.author_id,
                username: n.author_username,
            },
            status: PublishStatus::parse(&n.status).unwrap_or_default(),
            view_count: n.view_count,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

/// Query params for listing news
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNewsQuery {
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub page_size: Option<i64>,
    pub category: Option<String>,
    pub status: Option<PublishStatus>,
    /// Substring match on title and summary
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNewsDto {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Derived from the content when blank
    pub summary: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub status: PublishStatus,

    /// An uploaded file to show as cover
    pub cover_file_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateNewsDto {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,

    pub summary: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,

    pub tags: Option<Vec<String>>,

    pub status: Option<PublishStatus>,

    pub cover_file_id: Option<Uuid>,

    /// Remove the current cover
    #[serde(default)]
    pub clear_cover: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults_to_draft_without_tags() {
        let dto: CreateNewsDto = serde_json::from_value(serde_json::json!({
            "title": "Campus opening",
            "content": "<p>Hello</p>",
            "category": "Campus"
        }))
        .unwrap();

        assert_eq!(dto.status, PublishStatus::Draft);
        assert!(dto.tags.is_empty());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_rejects_long_title() {
        let dto = CreateNewsDto {
            title: "t".repeat(101),
            content: "c".to_string(),
            summary: None,
            category: "Campus".to_string(),
            tags: vec![],
            status: PublishStatus::Published,
            cover_file_id: None,
        };
        assert!(dto.validate().is_err());
    }
}
