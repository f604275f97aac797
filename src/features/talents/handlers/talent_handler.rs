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
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::talents::dtos::{
    CreateTalentDto, ListTalentsQuery, SetFeaturedDto, TalentResponseDto, UpdateTalentDto,
};
use crate::features::talents::services::TalentService;
use crate::shared::types::ApiResponse;

pub async fn list_talents(
    State(service): State<Arc<TalentService>>,
    AppQuery(query): AppQuery<ListTalentsQuery>,
) -> Result<Json<ApiResponse<Vec<TalentResponseDto>>>> {
    let (talents, meta) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(Some(talents), None, Some(meta))))
}

pub async fn get_talent(
    State(service): State<Arc<TalentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TalentResponseDto>>> {
    let talent = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(talent), None, None)))
}

pub async fn create_talent(
    user: AuthenticatedUser,
    State(service): State<Arc<TalentService>>,
    AppJson(dto): AppJson<CreateTalentDto>,
) -> Result<(StatusCode, Json<ApiResponse<TalentResponseDto>>)> {
    dto.validate()?;

    let talent = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(talent),
            Some("Talent created successfully".to_string()),
            None,
        )),
    ))
}

pub async fn update_talent(
    user: AuthenticatedUser,
    State(service): State<Arc<TalentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateTalentDto>,
) -> Result<Json<ApiResponse<TalentResponseDto>>> {
    dto.validate()?;

    let talent = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(talent),
        Some("Talent updated successfully".to_string()),
        None,
    )))
}

pub async fn delete_talent(
    user: AuthenticatedUser,
    State(service): State<Arc<TalentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ApiResponse::message("Talent deleted successfully")))
}

pub async fn set_talent_featured(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<TalentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetFeaturedDto>,
) -> Result<Json<ApiResponse<TalentResponseDto>>> {
    let talent = service.set_featured(id, dto.featured).await?;
    Ok(Json(ApiResponse::success(Some(talent), None, None)))
}
