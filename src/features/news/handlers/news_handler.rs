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
use crate::features::news::dtos::{CreateNewsDto, ListNewsQuery, NewsResponseDto, UpdateNewsDto};
use crate::features::news::services::NewsService;
use crate::shared::types::ApiResponse;

pub async fn list_news(
    State(service): State<Arc<NewsService>>,
    AppQuery(query): AppQuery<ListNewsQuery>,
) -> Result<Json<ApiResponse<Vec<NewsResponseDto>>>> {
    let (news, meta) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(Some(news), None, Some(meta))))
}

pub async fn get_news(
    State(service): State<Arc<NewsService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NewsResponseDto>>> {
    let news = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(news), None, None)))
}

pub async fn create_news(
    user: AuthenticatedUser,
    State(service): State<Arc<NewsService>>,
    AppJson(dto): AppJson<CreateNewsDto>,
) -> Result<(StatusCode, Json<ApiResponse<NewsResponseDto>>)> {
    dto.validate()?;

    let news = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(news),
            Some("News created successfully".to_string()),
            None,
        )),
    ))
}

pub async fn update_news(
    user: AuthenticatedUser,
    State(service): State<Arc<NewsService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateNewsDto>,
) -> Result<Json<ApiResponse<NewsResponseDto>>> {
    dto.validate()?;

    let news = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(news),
        Some("News updated successfully".to_string()),
        None,
    )))
}

pub async fn delete_news(
    user: AuthenticatedUser,
    State(service): State<Arc<NewsService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ApiResponse::message("News deleted successfully")))
}
