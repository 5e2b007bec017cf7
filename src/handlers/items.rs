use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::consts as perm;
use crate::auth::AuthUser;
use crate::entities::item_metadata;
use crate::errors::ServiceError;
use crate::services::history::HistoryEvent;
use crate::services::items::{
    AddMetadataRequest, CreateItemRequest, CurrentLocation, ItemListResponse, ItemResponse,
    ItemStatus,
};
use crate::services::structure::StructureNeighbor;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub status: Option<ItemStatus>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

pub async fn create_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ItemResponse>>), ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to register items".to_string(),
        ));
    }

    let created = state
        .services
        .items
        .create_item(request, auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_items(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<ApiResponse<ItemListResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view items".to_string(),
        ));
    }

    let list = state
        .services
        .items
        .list_items(query.page, query.limit, query.status)
        .await?;

    Ok(Json(ApiResponse::success(list)))
}

pub async fn get_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ItemResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view items".to_string(),
        ));
    }

    let found = state.services.items.get_item(&id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Where the item currently is: active placement and active custody.
pub async fn get_item_location(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CurrentLocation>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view items".to_string(),
        ));
    }

    let location = state.services.items.current_location(&id).await?;
    Ok(Json(ApiResponse::success(location)))
}

/// Full lifecycle timeline of an item, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}/history",
    params(("id" = String, Path, description = "Asset tag")),
    responses(
        (status = 200, description = "Ordered event list", body = [HistoryEvent]),
        (status = 404, description = "Item not found")
    ),
    tag = "Items"
)]
pub async fn get_item_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<HistoryEvent>>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view items".to_string(),
        ));
    }

    let events = state.services.history.build_history(&id).await?;
    Ok(Json(ApiResponse::success(events)))
}

/// Active structure links touching the item.
pub async fn get_item_structure(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<StructureNeighbor>>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view items".to_string(),
        ));
    }

    let neighbors = state.services.structure.neighbors(&id).await?;
    Ok(Json(ApiResponse::success(neighbors)))
}

pub async fn add_item_metadata(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<AddMetadataRequest>,
) -> Result<(StatusCode, Json<ApiResponse<item_metadata::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_UPDATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to update items".to_string(),
        ));
    }

    let row = state
        .services
        .items
        .add_metadata(&id, request, auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(row))))
}
