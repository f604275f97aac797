use sqlx::{types::Json, PgPool};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::models::{FileSnapshot, FileSource, FileSourceType};
use crate::features::files::FileService;
use crate::features::news::dtos::{CreateNewsDto, ListNewsQuery, NewsResponseDto, UpdateNewsDto};
use crate::features::news::models::News;
use crate::shared::text::content_summary;
use crate::shared::types::{Meta, PaginationQuery};
use crate::shared::validation::like_pattern;

const NEWS_SELECT: &str = r#"
    SELECT n.id, n.title, n.content, n.summary, n.cover, n.category, n.tags,
           n.author_id, u.username AS author_username, n.status, n.view_count,
           n.created_at, n.updated_at
    FROM news n
    LEFT JOIN users u ON u.id = n.author_id
"#;

const NEWS_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR n.category = $1)
      AND ($2::text IS NULL OR n.status = $2)
      AND ($3::text IS NULL OR n.title ILIKE $3 OR n.summary ILIKE $3)
"#;

/// File source types owned by a news article
const NEWS_FILE_SOURCES: [FileSourceType; 2] =
    [FileSourceType::NewsCover, FileSourceType::NewsContent];

/// Service for news articles
pub struct NewsService {
    pool: PgPool,
    files: Arc<FileService>,
}

impl NewsService {
    pub fn new(pool: PgPool, files: Arc<FileService>) -> Self {
        Self { pool, files }
    }

    /// Paginated list, newest first
    pub async fn list(&self, query: &ListNewsQuery) -> Result<(Vec<NewsResponseDto>, Meta)> {
        let pagination = PaginationQuery::new(query.page, query.page_size);
        let category = query.category.as_deref().filter(|c| !c.is_empty());
        let status = query.status.map(|s| s.as_str());
        let keyword = query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(like_pattern);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM news n {}", NEWS_FILTER))
                .bind(category)
                .bind(status)
                .bind(&keyword)
                .fetch_one(&self.pool)
                .await?;

        let news = sqlx::query_as::<_, News>(&format!(
            "{} {} ORDER BY n.created_at DESC LIMIT $4 OFFSET $5",
            NEWS_SELECT, NEWS_FILTER
        ))
        .bind(category)
        .bind(status)
        .bind(&keyword)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list news: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((
            news.into_iter().map(|n| n.into()).collect(),
            Meta::new(total, &pagination),
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<News> {
        sqlx::query_as::<_, News>(&format!("{} WHERE n.id = $1", NEWS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("News not found".to_string()))
    }

    /// Fetch an article, counting the view
    pub async fn get(&self, id: Uuid) -> Result<NewsResponseDto> {
        let viewed = sqlx::query("UPDATE news SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if viewed.rows_affected() == 0 {
            return Err(AppError::NotFound("News not found".to_string()));
        }

        Ok(self.find_by_id(id).await?.into())
    }

    async fn ensure_category_exists(&self, name: &str) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        if !exists {
            return Err(AppError::BadRequest(format!(
                "Category '{}' does not exist",
                name
            )));
        }
        Ok(())
    }

    async fn cover_snapshot(&self, file_id: Option<Uuid>) -> Result<Option<FileSnapshot>> {
        match file_id {
            Some(id) => Ok(Some(self.files.snapshot(id).await?)),
            None => Ok(None),
        }
    }

    /// Create an article. The row is inserted first so promoted inline images can
    /// reference its id, then the content is rewritten with their URLs.
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateNewsDto,
    ) -> Result<NewsResponseDto> {
        self.ensure_category_exists(&dto.category).await?;
        let cover = self.cover_snapshot(dto.cover_file_id).await?;

        let summary = match dto.summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => summary.to_string(),
            _ => content_summary(&dto.content),
        };

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO news (title, content, summary, cover, category, tags, author_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(&summary)
        .bind(cover.map(Json))
        .bind(&dto.category)
        .bind(&dto.tags)
        .bind(actor.user_id)
        .bind(dto.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        let source = FileSource::for_entity(FileSourceType::NewsContent, id, &dto.title);
        let content = self
            .files
            .promote_content(&dto.content, actor.user_id, &source)
            .await;

        if content != dto.content {
            sqlx::query("UPDATE news SET content = $2 WHERE id = $1")
                .bind(id)
                .bind(&content)
                .execute(&self.pool)
                .await?;
        }

        info!("News '{}' created by {}", dto.title, actor.username);
        Ok(self.find_by_id(id).await?.into())
    }

    /// Update an article; only its author or an admin may
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateNewsDto,
    ) -> Result<NewsResponseDto> {
        let news = self.find_by_id(id).await?;

        if !actor.can_modify(news.author_id) {
            return Err(AppError::Forbidden(
                "You do not have permission to modify this news".to_string(),
            ));
        }

        if let Some(category) = dto.category.as_deref() {
            if category != news.category {
                self.ensure_category_exists(category).await?;
            }
        }

        let title = dto.title.unwrap_or(news.title);

        let content = match dto.content {
            Some(content) => {
                let source = FileSource::for_entity(FileSourceType::NewsContent, id, &title);
                self.files
                    .promote_content(&content, actor.user_id, &source)
                    .await
            }
            None => news.content,
        };

        let summary = match dto.summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => summary.to_string(),
            Some(_) => content_summary(&content),
            None => news.summary,
        };

        let cover = if dto.clear_cover {
            None
        } else {
            match dto.cover_file_id {
                Some(file_id) => Some(self.files.snapshot(file_id).await?),
                None => news.cover.map(|c| c.0),
            }
        };

        let status = dto
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(news.status);

        sqlx::query(
            r#"
            UPDATE news
            SET title = $2, content = $3, summary = $4, cover = $5, category = $6,
                tags = $7, status = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&title)
        .bind(&content)
        .bind(&summary)
        .bind(cover.map(Json))
        .bind(dto.category.unwrap_or(news.category))
        .bind(dto.tags.unwrap_or(news.tags))
        .bind(&status)
        .execute(&self.pool)
        .await?;

        info!("News {} updated by {}", id, actor.username);
        Ok(self.find_by_id(id).await?.into())
    }

    /// Delete an article together with its cover and inline images
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let news = self.find_by_id(id).await?;

        if !actor.can_modify(news.author_id) {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this news".to_string(),
            ));
        }

        let purged = self.files.purge_related(&NEWS_FILE_SOURCES, id).await?;

        sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(
            "News '{}' deleted by {} ({} files removed)",
            news.title, actor.username, purged
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::LocalStorage;
    use crate::shared::types::PublishStatus;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use tempfile::TempDir;

    async fn editor(pool: &PgPool) -> AuthenticatedUser {
        let user_id = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash, role) VALUES ('editor', 'editor@example.com', 'x', 'editor') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO categories (name, created_by) VALUES ('Campus', $1)")
            .bind(user_id)
            .execute(pool)
            .await
            .unwrap();

        AuthenticatedUser {
            user_id,
            username: "editor".to_string(),
            role: "editor".to_string(),
        }
    }

    fn services(pool: PgPool, dir: &TempDir) -> (NewsService, Arc<FileService>) {
        let storage = Arc::new(LocalStorage::new(dir.path(), "http://localhost:5001"));
        let files = Arc::new(FileService::new(pool.clone(), storage));
        (NewsService::new(pool, files.clone()), files)
    }

    fn create_dto(content: String) -> CreateNewsDto {
        CreateNewsDto {
            title: "Campus opening".to_string(),
            content,
            summary: None,
            category: "Campus".to_string(),
            tags: vec!["event".to_string()],
            status: PublishStatus::Published,
            cover_file_id: None,
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_reloaded_news_references_urls_not_data_uris(pool: PgPool) {
        let dir = TempDir::new().unwrap();
        let (service, files) = services(pool.clone(), &dir);
        let author = editor(&pool).await;

        let content = format!(
            r#"<p>Welcome</p><img src="data:image/png;base64,{}"><img src='data:image/jpeg;base64,{}'>"#,
            STANDARD.encode(b"one"),
            STANDARD.encode(b"two")
        );
        let created = service.create(&author, create_dto(content)).await.unwrap();
        assert_eq!(created.summary, "Welcome");

        let reloaded = service.get(created.id).await.unwrap();
        assert!(!reloaded.content.contains("data:image"));
        assert_eq!(reloaded.content.matches("http://localhost:5001/uploads/").count(), 2);
        assert_eq!(reloaded.view_count, 1);

        let stored = files
            .list_for_owner(author.user_id, Some(FileSourceType::NewsContent))
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored
            .iter()
            .all(|f| f.source.related_entity_id == Some(created.id)));

        service.delete(&author, created.id).await.unwrap();
        assert!(files
            .list_for_owner(author.user_id, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_cover_can_be_attached_and_cleared(pool: PgPool) {
        let dir = TempDir::new().unwrap();
        let (service, files) = services(pool.clone(), &dir);
        let author = editor(&pool).await;

        let cover = files
            .upload(
                author.user_id,
                b"cover".to_vec(),
                "cover.png",
                "image/png",
                FileSource::default(),
            )
            .await
            .unwrap();

        let mut dto = create_dto("<p>Text</p>".to_string());
        dto.cover_file_id = Some(cover.id);
        let created = service.create(&author, dto).await.unwrap();
        assert_eq!(created.cover.as_ref().map(|c| c.id), Some(cover.id));

        let updated = service
            .update(
                &author,
                created.id,
                UpdateNewsDto {
                    clear_cover: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.cover.is_none());
        assert_eq!(updated.title, "Campus opening");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unknown_category_is_rejected(pool: PgPool) {
        let dir = TempDir::new().unwrap();
        let (service, _) = services(pool.clone(), &dir);
        let author = editor(&pool).await;

        let mut dto = create_dto("<p>Text</p>".to_string());
        dto.category = "Missing".to_string();

        let result = service.create(&author, dto).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
