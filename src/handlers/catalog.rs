use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::auth::AuthUser;
use crate::entities::{cabinet, model, room};
use crate::errors::ServiceError;
use crate::services::catalog::{CreateCabinetRequest, CreateModelRequest, CreateRoomRequest};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CabinetListQuery {
    pub room_id: Option<Uuid>,
}

pub async fn create_room(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<ApiResponse<room::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::ROOMS_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage rooms".to_string(),
        ));
    }

    let created = state.services.catalog.create_room(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_rooms(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<room::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view rooms".to_string(),
        ));
    }

    let rooms = state.services.catalog.list_rooms().await?;
    Ok(Json(ApiResponse::success(rooms)))
}

pub async fn create_cabinet(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateCabinetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<cabinet::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::CABINETS_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage cabinets".to_string(),
        ));
    }

    let created = state.services.catalog.create_cabinet(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_cabinets(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<CabinetListQuery>,
) -> Result<Json<ApiResponse<Vec<cabinet::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view cabinets".to_string(),
        ));
    }

    let cabinets = state.services.catalog.list_cabinets(query.room_id).await?;
    Ok(Json(ApiResponse::success(cabinets)))
}

pub async fn create_model(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateModelRequest>,
) -> Result<(StatusCode, Json<ApiResponse<model::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::MODELS_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage models".to_string(),
        ));
    }

    let created = state.services.catalog.create_model(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_models(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<model::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view models".to_string(),
        ));
    }

    let models = state.services.catalog.list_models().await?;
    Ok(Json(ApiResponse::success(models)))
}
