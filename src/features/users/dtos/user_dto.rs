use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{User, UserRole, UserStatus};

/// User as returned by the API; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            role: UserRole::parse(&u.role).unwrap_or_default(),
            status: UserStatus::parse(&u.status).unwrap_or(UserStatus::Inactive),
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Query params for listing users
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub page_size: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    /// `user` hides admin accounts
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(
        length(min = 2, max = 50, message = "Username must be 2-50 characters"),
        regex(
            path = "*crate::shared::validation::USERNAME_REGEX",
            message = "Username may only contain letters, digits, underscores, dots and hyphens"
        )
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserDto {
    #[validate(
        length(min = 2, max = 50, message = "Username must be 2-50 characters"),
        regex(
            path = "*crate::shared::validation::USERNAME_REGEX",
            message = "Username may only contain letters, digits, underscores, dots and hyphens"
        )
    )]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Only honoured for the super admin
    pub role: Option<UserRole>,
}
