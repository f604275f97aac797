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
use crate::features::auth::model::AuthenticatedUser;
use crate::features::employment::dtos::{
    CreateEmploymentDto, EmploymentResponseDto, ListEmploymentQuery, UpdateEmploymentDto,
};
use crate::features::employment::services::EmploymentService;
use crate::shared::types::ApiResponse;

/// Every matching article without pagination
pub async fn list_all_employment(
    State(service): State<Arc<EmploymentService>>,
    AppQuery(query): AppQuery<ListEmploymentQuery>,
) -> Result<Json<ApiResponse<Vec<EmploymentResponseDto>>>> {
    let articles = service.list_all(&query).await?;
    Ok(Json(ApiResponse::success(Some(articles), None, None)))
}

pub async fn list_employment(
    State(service): State<Arc<EmploymentService>>,
    AppQuery(query): AppQuery<ListEmploymentQuery>,
) -> Result<Json<ApiResponse<Vec<EmploymentResponseDto>>>> {
    let (articles, meta) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(Some(articles), None, Some(meta))))
}

pub async fn get_employment(
    State(service): State<Arc<EmploymentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmploymentResponseDto>>> {
    let article = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(article), None, None)))
}

pub async fn create_employment(
    user: AuthenticatedUser,
    State(service): State<Arc<EmploymentService>>,
    AppJson(dto): AppJson<CreateEmploymentDto>,
) -> Result<(StatusCode, Json<ApiResponse<EmploymentResponseDto>>)> {
    dto.validate()?;

    let article = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(article),
            Some("Employment article created successfully".to_string()),
            None,
        )),
    ))
}

pub async fn update_employment(
    user: AuthenticatedUser,
    State(service): State<Arc<EmploymentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateEmploymentDto>,
) -> Result<Json<ApiResponse<EmploymentResponseDto>>> {
    dto.validate()?;

    let article = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(article),
        Some("Employment article updated successfully".to_string()),
        None,
    )))
}

pub async fn delete_employment(
    user: AuthenticatedUser,
    State(service): State<Arc<EmploymentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ApiResponse::message(
        "Employment article deleted successfully",
    )))
}
