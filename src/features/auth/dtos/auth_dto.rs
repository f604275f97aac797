use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::features::users::dtos::UserResponseDto;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponseDto {
    pub token: String,
    pub user: UserResponseDto,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_password_change"))]
pub struct UpdateProfileDto {
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

    pub current_password: Option<String>,

    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: Option<String>,
}

/// A password change needs both the current and the new password
fn validate_password_change(dto: &UpdateProfileDto) -> Result<(), ValidationError> {
    match (&dto.current_password, &dto.new_password) {
        (Some(_), None) | (None, Some(_)) => {
            let mut error = ValidationError::new("password_change");
            error.message =
                Some("Both current_password and new_password are required to change the password".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

/// Seeded admin credentials, exposed in development only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevCredentialsDto {
    pub email: String,
    pub password: String,
}
