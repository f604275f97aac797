use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::{RequireAdmin, RequireSuperAdmin};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{CreateUserDto, ListUsersQuery, UpdateUserDto, UserResponseDto};
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

pub async fn list_users(
    _user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (users, meta) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(Some(users), None, Some(meta))))
}

pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

pub async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()?;

    let user = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user),
            Some("User created successfully".to_string()),
            None,
        )),
    ))
}

pub async fn update_user(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()?;

    let updated = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(updated), None, None)))
}

pub async fn delete_user(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

pub async fn toggle_user_status(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.toggle_status(id).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}
