use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    DevCredentialsDto, LoginDto, LoginResponseDto, UpdateProfileDto,
};
use crate::features::auth::services::password::{hash_password, verify_password};
use crate::features::auth::services::JwtService;
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::services::UserService;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login and self-service account operations
pub struct AuthService {
    users: Arc<UserService>,
    jwt: Arc<JwtService>,
    dev_credentials: Option<DevCredentialsDto>,
}

impl AuthService {
    pub fn new(
        users: Arc<UserService>,
        jwt: Arc<JwtService>,
        dev_credentials: Option<DevCredentialsDto>,
    ) -> Self {
        Self {
            users,
            jwt,
            dev_credentials,
        }
    }

    pub async fn login(&self, dto: LoginDto) -> Result<LoginResponseDto> {
        let user = self
            .users
            .find_by_email(&dto.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&dto.password, &user.password_hash)? {
            warn!("Failed login attempt for {}", user.username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active() {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        let token = self.jwt.issue(user.id, &user.username, &user.role)?;
        info!("User {} logged in", user.username);

        Ok(LoginResponseDto {
            token,
            user: user.into(),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponseDto> {
        self.users.get(user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<UserResponseDto> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.users
            .ensure_unique(dto.username.as_deref(), dto.email.as_deref(), Some(user_id))
            .await?;

        let password_hash = match (&dto.current_password, &dto.new_password) {
            (Some(current), Some(new)) => {
                if !verify_password(current, &user.password_hash)? {
                    return Err(AppError::BadRequest(
                        "Current password is incorrect".to_string(),
                    ));
                }
                Some(hash_password(new)?)
            }
            _ => None,
        };

        let updated = self
            .users
            .update_profile(
                user_id,
                dto.username.as_deref(),
                dto.email.as_deref(),
                password_hash.as_deref(),
            )
            .await?;

        if password_hash.is_some() {
            info!("User {} changed their password", updated.username);
        }
        Ok(updated)
    }

    /// Seeded credentials; `None` outside development
    pub fn dev_credentials(&self) -> Option<&DevCredentialsDto> {
        self.dev_credentials.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AdminSeedConfig, AuthConfig};
    use sqlx::PgPool;

    async fn seeded_service(pool: PgPool) -> AuthService {
        let users = Arc::new(UserService::new(pool));
        users
            .seed_admin(&AdminSeedConfig {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                password: "admin123".to_string(),
            })
            .await
            .unwrap();
        let jwt = Arc::new(
            JwtService::new(&AuthConfig {
                jwt_secret: "test-secret".to_string(),
                jwt_expires_in: "1h".to_string(),
            })
            .unwrap(),
        );
        AuthService::new(users, jwt, None)
    }

    fn login(email: &str, password: &str) -> LoginDto {
        LoginDto {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_login_issues_token(pool: PgPool) {
        let service = seeded_service(pool).await;

        let response = service.login(login("admin@example.com", "admin123")).await.unwrap();
        assert!(!response.token.is_empty());
        assert_eq!(response.user.username, "admin");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_login_rejects_wrong_credentials_alike(pool: PgPool) {
        let service = seeded_service(pool).await;

        for dto in [
            login("admin@example.com", "wrong"),
            login("nobody@example.com", "admin123"),
        ] {
            match service.login(dto).await {
                Err(AppError::Unauthorized(msg)) => assert_eq!(msg, INVALID_CREDENTIALS),
                other => panic!("expected 401, got {:?}", other.map(|r| r.user)),
            }
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_password_change_requires_current_password(pool: PgPool) {
        let service = seeded_service(pool).await;
        let admin = service.login(login("admin@example.com", "admin123")).await.unwrap().user;

        let wrong = UpdateProfileDto {
            current_password: Some("nope".to_string()),
            new_password: Some("changed1".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_profile(admin.id, wrong).await,
            Err(AppError::BadRequest(_))
        ));

        let right = UpdateProfileDto {
            current_password: Some("admin123".to_string()),
            new_password: Some("changed1".to_string()),
            ..Default::default()
        };
        service.update_profile(admin.id, right).await.unwrap();
        assert!(service.login(login("admin@example.com", "changed1")).await.is_ok());
    }
}
