use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{
    CategoryPayloadDto, CategoryResponseDto, ListCategoriesQuery,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::ApiResponse;

/// Paginated categories with creator/updater names
pub async fn list_categories(
    _user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let (categories, meta) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(Some(categories), None, Some(meta))))
}

/// Every category, for public pickers
pub async fn list_all_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list_all().await?;
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}

pub async fn create_category(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CategoryPayloadDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()?;

    let category = service.create(&user, &dto.trimmed_name()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created successfully".to_string()),
            None,
        )),
    ))
}

pub async fn update_category(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CategoryPayloadDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()?;

    let category = service.update(&user, id, &dto.trimmed_name()).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated successfully".to_string()),
        None,
    )))
}

pub async fn delete_category(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ApiResponse::message("Category deleted successfully")))
}
