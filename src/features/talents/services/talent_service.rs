use sqlx::{types::Json, PgPool};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::models::{FileSnapshot, FileSourceType};
use crate::features::files::FileService;
use crate::features::talents::dtos::{
    normalize_skills, CreateTalentDto, ListTalentsQuery, TalentResponseDto, UpdateTalentDto,
};
use crate::features::talents::models::Talent;
use crate::shared::types::{Meta, PaginationQuery};
use crate::shared::validation::{like_pattern, split_list};

const TALENT_SELECT: &str = r#"
    SELECT t.id, t.name, t.position, t.avatar, t.summary, t.skills, t.work_experience,
           t.education, t.contact, t.status, t.recommended_by,
           u.username AS recommended_by_username, t.featured, t.created_at, t.updated_at
    FROM talents t
    LEFT JOIN users u ON u.id = t.recommended_by
"#;

const TALENT_FILTER: &str = r#"
    WHERE ($1::text[] IS NULL OR t.skills && $1)
      AND ($2::text IS NULL OR t.status = $2)
      AND (NOT $3 OR t.featured)
      AND ($4::text IS NULL OR t.name ILIKE $4 OR t.position ILIKE $4 OR t.summary ILIKE $4)
"#;

/// Service for recommended talents
pub struct TalentService {
    pool: PgPool,
    files: Arc<FileService>,
}

impl TalentService {
    pub fn new(pool: PgPool, files: Arc<FileService>) -> Self {
        Self { pool, files }
    }

    /// Paginated list, featured first, then newest
    pub async fn list(&self, query: &ListTalentsQuery) -> Result<(Vec<TalentResponseDto>, Meta)> {
        let pagination = PaginationQuery::new(query.page, query.page_size);
        let skills = query
            .skills
            .as_deref()
            .map(split_list)
            .filter(|s| !s.is_empty());
        let status = query.status.map(|s| s.as_str());
        let featured_only = query.featured.unwrap_or(false);
        let keyword = query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(like_pattern);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM talents t {}", TALENT_FILTER))
                .bind(&skills)
                .bind(status)
                .bind(featured_only)
                .bind(&keyword)
                .fetch_one(&self.pool)
                .await?;

        let talents = sqlx::query_as::<_, Talent>(&format!(
            "{} {} ORDER BY t.featured DESC, t.created_at DESC LIMIT $5 OFFSET $6",
            TALENT_SELECT, TALENT_FILTER
        ))
        .bind(&skills)
        .bind(status)
        .bind(featured_only)
        .bind(&keyword)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list talents: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((
            talents.into_iter().map(|t| t.into()).collect(),
            Meta::new(total, &pagination),
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Talent> {
        sqlx::query_as::<_, Talent>(&format!("{} WHERE t.id = $1", TALENT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Talent not found".to_string()))
    }

    pub async fn get(&self, id: Uuid) -> Result<TalentResponseDto> {
        Ok(self.find_by_id(id).await?.into())
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateTalentDto,
    ) -> Result<TalentResponseDto> {
        let avatar: Option<FileSnapshot> = match dto.avatar_file_id {
            Some(file_id) => Some(self.files.snapshot(file_id).await?),
            None => None,
        };
        let featured = dto.featured && actor.is_admin();

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO talents (name, position, avatar, summary, skills, work_experience,
                                 education, contact, status, recommended_by, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.position)
        .bind(avatar.map(Json))
        .bind(&dto.summary)
        .bind(normalize_skills(dto.skills))
        .bind(&dto.work_experience)
        .bind(&dto.education)
        .bind(&dto.contact)
        .bind(dto.status.as_str())
        .bind(actor.user_id)
        .bind(featured)
        .fetch_one(&self.pool)
        .await?;

        info!("Talent '{}' recommended by {}", dto.name, actor.username);
        self.get(id).await
    }

    /// Update a talent; only the recommender or an admin may, and only admins
    /// change `featured`
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateTalentDto,
    ) -> Result<TalentResponseDto> {
        let talent = self.find_by_id(id).await?;

        if !actor.can_modify(talent.recommended_by) {
            return Err(AppError::Forbidden(
                "You do not have permission to modify this talent".to_string(),
            ));
        }

        let avatar = if dto.clear_avatar {
            None
        } else {
            match dto.avatar_file_id {
                Some(file_id) => Some(self.files.snapshot(file_id).await?),
                None => talent.avatar.map(|a| a.0),
            }
        };

        let featured = match dto.featured {
            Some(featured) if actor.is_admin() => featured,
            _ => talent.featured,
        };

        let status = dto
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(talent.status);

        sqlx::query(
            r#"
            UPDATE talents
            SET name = $2, position = $3, avatar = $4, summary = $5, skills = $6,
                work_experience = $7, education = $8, contact = $9, status = $10,
                featured = $11, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(dto.name.unwrap_or(talent.name))
        .bind(dto.position.unwrap_or(talent.position))
        .bind(avatar.map(Json))
        .bind(dto.summary.unwrap_or(talent.summary))
        .bind(dto.skills.map(normalize_skills).unwrap_or(talent.skills))
        .bind(dto.work_experience.unwrap_or(talent.work_experience))
        .bind(dto.education.unwrap_or(talent.education))
        .bind(dto.contact.unwrap_or(talent.contact))
        .bind(&status)
        .bind(featured)
        .execute(&self.pool)
        .await?;

        info!("Talent {} updated by {}", id, actor.username);
        self.get(id).await
    }

    /// Delete a talent together with its avatar files
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let talent = self.find_by_id(id).await?;

        if !actor.can_modify(talent.recommended_by) {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this talent".to_string(),
            ));
        }

        let purged = self
            .files
            .purge_related(&[FileSourceType::TalentAvatar], id)
            .await?;

        sqlx::query("DELETE FROM talents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(
            "Talent '{}' deleted by {} ({} files removed)",
            talent.name, actor.username, purged
        );
        Ok(())
    }

    pub async fn set_featured(&self, id: Uuid, featured: bool) -> Result<TalentResponseDto> {
        let updated = sqlx::query(
            "UPDATE talents SET featured = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(featured)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Talent not found".to_string()));
        }
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::talents::models::TalentStatus;
    use crate::modules::storage::LocalStorage;
    use tempfile::TempDir;

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

    fn service(pool: PgPool, dir: &TempDir) -> TalentService {
        let storage = Arc::new(LocalStorage::new(dir.path(), "http://localhost:5001"));
        TalentService::new(pool.clone(), Arc::new(FileService::new(pool, storage)))
    }

    fn talent(name: &str, skills: &[&str], featured: bool) -> CreateTalentDto {
        CreateTalentDto {
            name: name.to_string(),
            position: "Engineer".to_string(),
            summary: format!("{} builds things", name),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            work_experience: "5 years".to_string(),
            education: "BSc".to_string(),
            contact: format!("{}@example.com", name),
            status: TalentStatus::Available,
            featured,
            avatar_file_id: None,
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_list_filters_by_any_skill_and_orders_featured_first(pool: PgPool) {
        let dir = TempDir::new().unwrap();
        let service = service(pool.clone(), &dir);
        let admin = actor(&pool, "ops", "admin").await;

        service.create(&admin, talent("ana", &["Rust"], false)).await.unwrap();
        service.create(&admin, talent("ben", &["Go", "SQL"], true)).await.unwrap();
        service.create(&admin, talent("cai", &["Design"], false)).await.unwrap();

        let query = ListTalentsQuery {
            skills: Some("Rust, SQL".to_string()),
            ..Default::default()
        };
        let (talents, meta) = service.list(&query).await.unwrap();
        assert_eq!(meta.total, 2);
        assert_eq!(talents[0].name, "ben");
        assert_eq!(talents[1].name, "ana");

        let query = ListTalentsQuery {
            featured: Some(true),
            ..Default::default()
        };
        let (talents, _) = service.list(&query).await.unwrap();
        assert_eq!(talents.len(), 1);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_only_admins_change_featured(pool: PgPool) {
        let dir = TempDir::new().unwrap();
        let service = service(pool.clone(), &dir);
        let editor = actor(&pool, "editor", "editor").await;
        let other = actor(&pool, "other", "editor").await;

        let created = service.create(&editor, talent("dee", &["Rust"], true)).await.unwrap();
        assert!(!created.featured);

        let dto = UpdateTalentDto {
            featured: Some(true),
            position: Some("Lead".to_string()),
            ..Default::default()
        };
        let updated = service.update(&editor, created.id, dto.clone()).await.unwrap();
        assert!(!updated.featured);
        assert_eq!(updated.position, "Lead");

        assert!(matches!(
            service.update(&other, created.id, dto).await,
            Err(AppError::Forbidden(_))
        ));

        let featured = service.set_featured(created.id, true).await.unwrap();
        assert!(featured.featured);
    }
}
