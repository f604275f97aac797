use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::employment::models::{Employment, EmploymentCategory, EmploymentTag};
use crate::features::files::models::FileSnapshot;
use crate::shared::types::PublishStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentAuthorDto {
    pub id: Uuid,
    pub username: Option<String>,
}

/// Response DTO for employment articles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentResponseDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub source: String,
    pub summary: String,
    pub cover: Option<FileSnapshot>,
    pub category: Option<EmploymentCategory>,
    pub tag: Option<EmploymentTag>,
    pub author: EmploymentAuthorDto,
    pub status: PublishStatus,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Employment> for EmploymentResponseDto {
    fn from(e: Employment) -> Self {
        Self {
            category: EmploymentCategory::parse(&e.category),
            tag: EmploymentTag::parse(&e.tag),
            status: PublishStatus::parse(&e.status).unwrap_or_default(),
            id: e.id,
            title: e.title,
            content: e.content,
            source: e.source,
            summary: e.summary,
            cover: e.cover.map(|c| c.0),
            author: EmploymentAuthorDto {
                id: e.author_id,
                username: e.author_username,
            },
            view_count: e.view_count,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Filters shared by the paginated and unpaginated lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEmploymentQuery {
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub page_size: Option<i64>,
    /// Substring match on the title
    pub title: Option<String>,
    pub category: Option<EmploymentCategory>,
    pub tag: Option<EmploymentTag>,
    pub status: Option<PublishStatus>,
    /// Author username; only honoured by the unpaginated list
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEmploymentDto {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[validate(length(min = 1, max = 100, message = "Source must be 1-100 characters"))]
    pub source: String,

    pub category: EmploymentCategory,

    pub tag: EmploymentTag,

    #[serde(default)]
    pub status: PublishStatus,

    pub cover_file_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEmploymentDto {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Source must be 1-100 characters"))]
    pub source: Option<String>,

    pub category: Option<EmploymentCategory>,

    pub tag: Option<EmploymentTag>,

    pub status: Option<PublishStatus>,

    pub cover_file_id: Option<Uuid>,

    #[serde(default)]
    pub clear_cover: bool,
}
