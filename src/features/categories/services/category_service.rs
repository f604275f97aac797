use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{CategoryResponseDto, ListCategoriesQuery};
use crate::features::categories::models::Category;
use crate::shared::types::{Meta, PaginationQuery};
use crate::shared::validation::like_pattern;

const CATEGORY_SELECT: &str = r#"
    SELECT c.id, c.name, c.created_by, c.updated_by,
           creator.username AS created_by_username,
           updater.username AS updated_by_username,
           c.created_at, c.updated_at
    FROM categories c
    LEFT JOIN users creator ON creator.id = c.created_by
    LEFT JOIN users updater ON updater.id = c.updated_by
"#;

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Paginated list, newest first
    pub async fn list(
        &self,
        query: &ListCategoriesQuery,
    ) -> Result<(Vec<CategoryResponseDto>, Meta)> {
        let pagination = PaginationQuery::new(query.page, query.page_size);
        let keyword = query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(&keyword)
        .fetch_one(&self.pool)
        .await?;

        let categories = sqlx::query_as::<_, Category>(&format!(
            "{} WHERE ($1::text IS NULL OR c.name ILIKE $1) ORDER BY c.created_at DESC LIMIT $2 OFFSET $3",
            CATEGORY_SELECT
        ))
        .bind(&keyword)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((
            categories.into_iter().map(|c| c.into()).collect(),
            Meta::new(total, &pagination),
        ))
    }

    /// Every category, newest first
    pub async fn list_all(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "{} ORDER BY c.created_at DESC",
            CATEGORY_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Category> {
        sqlx::query_as::<_, Category>(&format!("{} WHERE c.id = $1", CATEGORY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    async fn ensure_unique(&self, name: &str, exclude_id: Option<Uuid>) -> Result<()> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(AppError::BadRequest(format!(
                "Category '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    pub async fn create(&self, actor: &AuthenticatedUser, name: &str) -> Result<CategoryResponseDto> {
        if name.is_empty() {
            return Err(AppError::BadRequest("Category name is required".to_string()));
        }
        self.ensure_unique(name, None).await?;

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO categories (name, created_by) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(actor.user_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Category '{}' created by {}", name, actor.username);
        Ok(self.find_by_id(id).await?.into())
    }

    /// Rename a category; news filed under the old name follow the rename
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        name: &str,
    ) -> Result<CategoryResponseDto> {
        let category = self.find_by_id(id).await?;

        if !actor.can_modify(category.created_by) {
            return Err(AppError::Forbidden(
                "You do not have permission to modify this category".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(AppError::BadRequest("Category name is required".to_string()));
        }
        self.ensure_unique(name, Some(id)).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE categories SET name = $2, updated_by = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(actor.user_id)
        .execute(&mut *tx)
        .await?;

        let renamed = if category.name != name {
            sqlx::query("UPDATE news SET category = $2, updated_at = NOW() WHERE category = $1")
                .bind(&category.name)
                .bind(name)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        } else {
            0
        };

        tx.commit().await?;

        info!(
            "Category '{}' renamed to '{}' ({} news updated)",
            category.name, name, renamed
        );
        Ok(self.find_by_id(id).await?.into())
    }

    /// Delete a category that no news uses
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let category = self.find_by_id(id).await?;

        if !actor.can_modify(category.created_by) {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this category".to_string(),
            ));
        }

        let in_use: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news WHERE category = $1")
            .bind(&category.name)
            .fetch_one(&self.pool)
            .await?;
        if in_use > 0 {
            return Err(AppError::BadRequest(format!(
                "Category '{}' is used by {} news and cannot be deleted",
                category.name, in_use
            )));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Category '{}' deleted by {}", category.name, actor.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn actor(pool: &PgPool, username: &str, role: &str) -> AuthenticatedUser {
        let user_id = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash, role) VALUES ($1, $2, 'x', $3) RETURNING id",
        )
        .bind(username)
        .bind(format!("{}@example.com", username))
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap();

        AuthenticatedUser {
            user_id,
            username: username.to_string(),
            role: role.to_string(),
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_rename_propagates_to_news(pool: PgPool) {
        let service = CategoryService::new(pool.clone());
        let editor = actor(&pool, "editor", "editor").await;

        let category = service.create(&editor, "Campus").await.unwrap();
        assert_eq!(category.created_by.username.as_deref(), Some("editor"));
        assert!(matches!(
            service.create(&editor, "Campus").await,
            Err(AppError::BadRequest(_))
        ));

        sqlx::query("INSERT INTO news (title, content, category, author_id) VALUES ('t', 'c', 'Campus', $1)")
            .bind(editor.user_id)
            .execute(&pool)
            .await
            .unwrap();

        let renamed = service.update(&editor, category.id, "Community").await.unwrap();
        assert_eq!(renamed.name, "Community");
        assert_eq!(renamed.updated_by.unwrap().username.as_deref(), Some("editor"));

        let moved: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news WHERE category = 'Community'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(moved, 1);

        assert!(matches!(
            service.delete(&editor, category.id).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_only_creator_or_admin_modifies(pool: PgPool) {
        let service = CategoryService::new(pool.clone());
        let owner = actor(&pool, "owner", "editor").await;
        let other = actor(&pool, "other", "editor").await;
        let admin = actor(&pool, "ops", "admin").await;

        let category = service.create(&owner, "Events").await.unwrap();

        assert!(matches!(
            service.update(&other, category.id, "Mine").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete(&other, category.id).await,
            Err(AppError::Forbidden(_))
        ));

        service.delete(&admin, category.id).await.unwrap();
        assert!(service.list_all().await.unwrap().is_empty());
    }
}
