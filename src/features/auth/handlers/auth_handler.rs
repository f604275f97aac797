use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    DevCredentialsDto, LoginDto, LoginResponseDto, UpdateProfileDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::types::ApiResponse;
use validator::Validate;

/// Exchange email and password for an access token
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    dto.validate()?;

    let response = service.login(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(response),
        Some("Login successful".to_string()),
        None,
    )))
}

pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let me = service.me(user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(me), None, None)))
}

pub async fn update_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()?;

    let updated = service.update_profile(user.user_id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(updated),
        Some("Profile updated successfully".to_string()),
        None,
    )))
}

/// Seeded admin credentials for local development
pub async fn dev_credentials(
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<DevCredentialsDto>>> {
    let credentials = service
        .dev_credentials()
        .cloned()
        .ok_or_else(|| AppError::NotFound("Not available in production".to_string()))?;

    Ok(Json(ApiResponse::success(Some(credentials), None, None)))
}
