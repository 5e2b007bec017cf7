use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::auth::AuthUser;
use crate::entities::{inventory, inventory_item};
use crate::errors::ServiceError;
use crate::services::inventories::{CreateInventoryRequest, RecordSightingRequest};
use crate::{ApiResponse, AppState};

pub async fn create_inventory(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateInventoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<inventory::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::INVENTORIES_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to run stock-takes".to_string(),
        ));
    }

    let created = state
        .services
        .inventories
        .create_inventory(request, auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_inventories(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<inventory::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::INVENTORIES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view stock-takes".to_string(),
        ));
    }

    let list = state.services.inventories.list_inventories().await?;
    Ok(Json(ApiResponse::success(list)))
}

pub async fn record_sighting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordSightingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<inventory_item::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::INVENTORIES_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to run stock-takes".to_string(),
        ));
    }

    let row = state
        .services
        .inventories
        .record_sighting(id, request, auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(row))))
}

pub async fn list_sightings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<inventory_item::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::INVENTORIES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view stock-takes".to_string(),
        ));
    }

    let rows = state.services.inventories.list_sightings(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
