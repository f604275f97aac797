use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::config::AdminSeedConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::hash_password;
use crate::features::users::dtos::{CreateUserDto, ListUsersQuery, UpdateUserDto, UserResponseDto};
use crate::features::users::models::{User, UserRole, UserStatus};
use crate::shared::types::{Meta, PaginationQuery};
use crate::shared::validation::like_pattern;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, status, created_at, updated_at";

/// Service for user accounts
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List users, newest first
    pub async fn list(&self, query: &ListUsersQuery) -> Result<(Vec<UserResponseDto>, Meta)> {
        let pagination = PaginationQuery::new(query.page, query.page_size);
        let username = query.username.as_deref().map(like_pattern);
        let email = query.email.as_deref().map(like_pattern);
        let hide_admins = query.role.as_deref() == Some("user");

        let filter = r#"
            WHERE ($1::text IS NULL OR username ILIKE $1)
              AND ($2::text IS NULL OR email ILIKE $2)
              AND (NOT $3 OR role <> 'admin')
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {}", filter))
            .bind(&username)
            .bind(&email)
            .bind(hide_admins)
            .fetch_one(&self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            USER_COLUMNS, filter
        ))
        .bind(&username)
        .bind(&email)
        .bind(hide_admins)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((
            users.into_iter().map(Into::into).collect(),
            Meta::new(total, &pagination),
        ))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<UserResponseDto> {
        self.find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Fail with 400 if the username or email already belongs to another account
    pub async fn ensure_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<()> {
        let taken: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT username, email FROM users
            WHERE (username = $1 OR LOWER(email) = LOWER($2))
              AND ($3::uuid IS NULL OR id <> $3)
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        match taken {
            Some((existing, _)) if username == Some(existing.as_str()) => Err(
                AppError::BadRequest("Username is already taken".to_string()),
            ),
            Some(_) => Err(AppError::BadRequest("Email is already in use".to_string())),
            None => Ok(()),
        }
    }

    pub async fn create(&self, dto: CreateUserDto) -> Result<UserResponseDto> {
        self.ensure_unique(Some(&dto.username), Some(&dto.email), None)
            .await?;

        let password_hash = hash_password(&dto.password)?;
        let user = self
            .insert(&dto.username, &dto.email, &password_hash, dto.role)
            .await?;

        info!("Created user {} ({})", user.username, user.role);
        Ok(user.into())
    }

    async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, 'active')
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email.trim())
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unique_violation_as_bad_request)
    }

    /// Update a user; the role only changes when the actor is the super admin
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateUserDto,
    ) -> Result<UserResponseDto> {
        if !actor.can_modify(id) {
            return Err(AppError::Forbidden(
                "You can only modify your own account".to_string(),
            ));
        }

        if self.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.ensure_unique(dto.username.as_deref(), dto.email.as_deref(), Some(id))
            .await?;

        let role = dto
            .role
            .filter(|_| actor.is_super_admin())
            .map(|r| r.as_str());

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(dto.username.as_deref())
        .bind(dto.email.as_deref().map(str::trim))
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_violation_as_bad_request)?;

        info!("User {} updated by {}", id, actor.username);
        Ok(user.into())
    }

    /// Update own username/email and optionally the password hash
    pub async fn update_profile(
        &self,
        id: Uuid,
        username: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<UserResponseDto> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(username)
        .bind(email.map(str::trim))
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_violation_as_bad_request)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// Delete a non-admin account
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.role == UserRole::Admin.as_str() {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    AppError::BadRequest(
                        "User still owns content and cannot be deleted".to_string(),
                    )
                }
                other => AppError::Database(other),
            })?;

        info!("Deleted user {}", user.username);
        Ok(())
    }

    /// Flip active/inactive; the super admin account cannot be toggled
    pub async fn toggle_status(&self, id: Uuid) -> Result<UserResponseDto> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let is_super_admin = user.role == UserRole::Admin.as_str()
            && user.username == crate::shared::constants::SUPER_ADMIN_USERNAME;
        if is_super_admin {
            return Err(AppError::Forbidden(
                "The super admin status cannot be changed".to_string(),
            ));
        }

        let next = UserStatus::parse(&user.status)
            .unwrap_or(UserStatus::Inactive)
            .toggled();

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(next.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("User {} is now {}", user.username, user.status);
        Ok(user.into())
    }

    /// Create the configured admin account when no admin exists yet
    pub async fn seed_admin(&self, config: &AdminSeedConfig) -> Result<bool> {
        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await?;
        if admins > 0 {
            return Ok(false);
        }

        let password_hash = hash_password(&config.password)?;
        self.insert(&config.username, &config.email, &password_hash, UserRole::Admin)
            .await?;

        info!("Seeded admin account '{}'", config.username);
        Ok(true)
    }
}

fn unique_violation_as_bad_request(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::BadRequest("Username or email already exists".to_string())
        }
        other => AppError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_actor() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: "admin".to_string(),
            role: "admin".to_string(),
        }
    }

    fn new_user(username: &str, role: UserRole) -> CreateUserDto {
        CreateUserDto {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "secret1".to_string(),
            role,
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_rejects_duplicates(pool: PgPool) {
        let service = UserService::new(pool);
        service.create(new_user("editor", UserRole::Editor)).await.unwrap();

        let result = service.create(new_user("editor", UserRole::User)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_only_super_admin_changes_roles(pool: PgPool) {
        let service = UserService::new(pool);
        let target = service.create(new_user("writer", UserRole::User)).await.unwrap();

        let plain_admin = AuthenticatedUser {
            username: "ops".to_string(),
            ..admin_actor()
        };
        let dto = UpdateUserDto {
            role: Some(UserRole::Editor),
            ..Default::default()
        };
        let updated = service.update(&plain_admin, target.id, dto.clone()).await.unwrap();
        assert_eq!(updated.role, UserRole::User);

        let updated = service.update(&admin_actor(), target.id, dto).await.unwrap();
        assert_eq!(updated.role, UserRole::Editor);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_admins_cannot_be_deleted_or_super_admin_toggled(pool: PgPool) {
        let service = UserService::new(pool);
        let seeded = service
            .seed_admin(&AdminSeedConfig {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                password: "admin123".to_string(),
            })
            .await
            .unwrap();
        assert!(seeded);

        let admin = service.find_by_email("ADMIN@example.com").await.unwrap().unwrap();
        assert!(matches!(service.delete(admin.id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(
            service.toggle_status(admin.id).await,
            Err(AppError::Forbidden(_))
        ));

        let user = service.create(new_user("reader", UserRole::User)).await.unwrap();
        let toggled = service.toggle_status(user.id).await.unwrap();
        assert_eq!(toggled.status, UserStatus::Inactive);
        service.delete(user.id).await.unwrap();
        assert!(matches!(service.get(user.id).await, Err(AppError::NotFound(_))));
    }
}
