use sqlx::{types::Json, PgPool};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::employment::dtos::{
    CreateEmploymentDto, EmploymentResponseDto, ListEmploymentQuery, UpdateEmploymentDto,
};
use crate::features::employment::models::Employment;
use crate::features::files::models::{FileSnapshot, FileSource, FileSourceType};
use crate::features::files::FileService;
use crate::shared::text::content_summary;
use crate::shared::types::{Meta, PaginationQuery};
use crate::shared::validation::like_pattern;

const EMPLOYMENT_SELECT: &str = r#"
    SELECT e.id, e.title, e.content, e.source, e.summary, e.cover, e.category, e.tag,
           e.author_id, u.username AS author_username, e.status, e.view_count,
           e.created_at, e.updated_at
    FROM employments e
    LEFT JOIN users u ON u.id = e.author_id
"#;

const EMPLOYMENT_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR e.title ILIKE $1)
      AND ($2::text IS NULL OR e.category = $2)
      AND ($3::text IS NULL OR e.tag = $3)
      AND ($4::text IS NULL OR e.status = $4)
      AND ($5::uuid IS NULL OR e.author_id = $5)
"#;

/// File source types owned by an employment article
const EMPLOYMENT_FILE_SOURCES: [FileSourceType; 2] = [
    FileSourceType::EmploymentCover,
    FileSourceType::EmploymentContent,
];

/// Bound values of `EMPLOYMENT_FILTER`
struct Filter {
    title: Option<String>,
    category: Option<&'static str>,
    tag: Option<&'static str>,
    status: Option<&'static str>,
    author_id: Option<Uuid>,
}

impl Filter {
    fn from_query(query: &ListEmploymentQuery, author_id: Option<Uuid>) -> Self {
        Self {
            title: query
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(like_pattern),
            category: query.category.map(|c| c.as_str()),
            tag: query.tag.map(|t| t.as_str()),
            status: query.status.map(|s| s.as_str()),
            author_id,
        }
    }
}

/// Service for employment news and policy articles
pub struct EmploymentService {
    pool: PgPool,
    files: Arc<FileService>,
}

impl EmploymentService {
    pub fn new(pool: PgPool, files: Arc<FileService>) -> Self {
        Self { pool, files }
    }

    /// Every matching article, newest first. An unknown `author` matches nothing.
    pub async fn list_all(&self, query: &ListEmploymentQuery) -> Result<Vec<EmploymentResponseDto>> {
        let author_id = match query.author.as_deref().map(str::trim) {
            Some(username) if !username.is_empty() => {
                let id: Option<Uuid> =
                    sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
                        .bind(username)
                        .fetch_optional(&self.pool)
                        .await?;
                match id {
                    Some(id) => Some(id),
                    None => {
                        debug!("No author named '{}'", username);
                        return Ok(Vec::new());
                    }
                }
            }
            _ => None,
        };

        let filter = Filter::from_query(query, author_id);
        let articles = sqlx::query_as::<_, Employment>(&format!(
            "{} {} ORDER BY e.created_at DESC",
            EMPLOYMENT_SELECT, EMPLOYMENT_FILTER
        ))
        .bind(&filter.title)
        .bind(filter.category)
        .bind(filter.tag)
        .bind(filter.status)
        .bind(filter.author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(articles.into_iter().map(|e| e.into()).collect())
    }

    /// Paginated list, newest first
    pub async fn list(
        &self,
        query: &ListEmploymentQuery,
    ) -> Result<(Vec<EmploymentResponseDto>, Meta)> {
        let pagination = PaginationQuery::new(query.page, query.page_size);
        let filter = Filter::from_query(query, None);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM employments e {}",
            EMPLOYMENT_FILTER
        ))
        .bind(&filter.title)
        .bind(filter.category)
        .bind(filter.tag)
        .bind(filter.status)
        .bind(filter.author_id)
        .fetch_one(&self.pool)
        .await?;

        let articles = sqlx::query_as::<_, Employment>(&format!(
            "{} {} ORDER BY e.created_at DESC LIMIT $6 OFFSET $7",
            EMPLOYMENT_SELECT, EMPLOYMENT_FILTER
        ))
        .bind(&filter.title)
        .bind(filter.category)
        .bind(filter.tag)
        .bind(filter.status)
        .bind(filter.author_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list employment articles: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((
            articles.into_iter().map(|e| e.into()).collect(),
            Meta::new(total, &pagination),
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Employment> {
        sqlx::query_as::<_, Employment>(&format!("{} WHERE e.id = $1", EMPLOYMENT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Employment article not found".to_string()))
    }

    /// Fetch an article, counting the view
    pub async fn get(&self, id: Uuid) -> Result<EmploymentResponseDto> {
        let viewed =
            sqlx::query("UPDATE employments SET view_count = view_count + 1 WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        if viewed.rows_affected() == 0 {
            return Err(AppError::NotFound("Employment article not found".to_string()));
        }

        Ok(self.find_by_id(id).await?.into())
    }

    async fn cover_snapshot(&self, file_id: Option<Uuid>) -> Result<Option<FileSnapshot>> {
        match file_id {
            Some(id) => Ok(Some(self.files.snapshot(id).await?)),
            None => Ok(None),
        }
    }

    /// Create an article, then promote its inline images against the new id
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateEmploymentDto,
    ) -> Result<EmploymentResponseDto> {
        let cover = self.cover_snapshot(dto.cover_file_id).await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO employments (title, content, source, summary, cover, category, tag,
                                     author_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(dto.source.trim())
        .bind(content_summary(&dto.content))
        .bind(cover.map(Json))
        .bind(dto.category.as_str())
        .bind(dto.tag.as_str())
        .bind(actor.user_id)
        .bind(dto.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        let source = FileSource::for_entity(FileSourceType::EmploymentContent, id, &dto.title);
        let content = self
            .files
            .promote_content(&dto.content, actor.user_id, &source)
            .await;

        if content != dto.content {
            sqlx::query("UPDATE employments SET content = $2 WHERE id = $1")
                .bind(id)
                .bind(&content)
                .execute(&self.pool)
                .await?;
        }

        info!("Employment article '{}' created by {}", dto.title, actor.username);
        Ok(self.find_by_id(id).await?.into())
    }

    /// Update an article; only its author or an admin may
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateEmploymentDto,
    ) -> Result<EmploymentResponseDto> {
        let article = self.find_by_id(id).await?;

        if !actor.can_modify(article.author_id) {
            return Err(AppError::Forbidden(
                "You do not have permission to modify this article".to_string(),
            ));
        }

        let title = dto.title.unwrap_or(article.title);

        let (content, summary) = match dto.content {
            Some(content) => {
                let source =
                    FileSource::for_entity(FileSourceType::EmploymentContent, id, &title);
                let content = self
                    .files
                    .promote_content(&content, actor.user_id, &source)
                    .await;
                let summary = content_summary(&content);
                (content, summary)
            }
            None => (article.content, article.summary),
        };

        let cover = if dto.clear_cover {
            None
        } else {
            match dto.cover_file_id {
                Some(file_id) => Some(self.files.snapshot(file_id).await?),
                None => article.cover.map(|c| c.0),
            }
        };

        let category = dto
            .category
            .map(|c| c.as_str().to_string())
            .unwrap_or(article.category);
        let tag = dto
            .tag
            .map(|t| t.as_str().to_string())
            .unwrap_or(article.tag);
        let status = dto
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(article.status);
        let source = dto
            .source
            .map(|s| s.trim().to_string())
            .unwrap_or(article.source);

        sqlx::query(
            r#"
            UPDATE employments
            SET title = $2, content = $3, source = $4, summary = $5, cover = $6,
                category = $7, tag = $8, status = $9, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&title)
        .bind(&content)
        .bind(&source)
        .bind(&summary)
        .bind(cover.map(Json))
        .bind(&category)
        .bind(&tag)
        .bind(&status)
        .execute(&self.pool)
        .await?;

        info!("Employment article {} updated by {}", id, actor.username);
        Ok(self.find_by_id(id).await?.into())
    }

    /// Delete an article together with its cover and inline images
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let article = self.find_by_id(id).await?;

        if !actor.can_modify(article.author_id) {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this article".to_string(),
            ));
        }

        let purged = self
            .files
            .purge_related(&EMPLOYMENT_FILE_SOURCES, id)
            .await?;

        sqlx::query("DELETE FROM employments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(
            "Employment article '{}' deleted by {} ({} files removed)",
            article.title, actor.username, purged
        );
        Ok(())
    }
}
