use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::moves::{
    BulkMoveRequest, BulkMoveResponse, CreateMoveRequest, MoveListResponse, MoveResponse,
};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct MoveListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub is_finished: Option<bool>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

/// Open a move request for an item.
#[utoipa::path(
    post,
    path = "/api/v1/moves",
    request_body = CreateMoveRequest,
    responses(
        (status = 201, description = "Move request created", body = MoveResponse),
        (status = 400, description = "Missing item or destination"),
        (status = 404, description = "Item not found")
    ),
    tag = "Moves"
)]
pub async fn create_move(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateMoveRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MoveResponse>>), ServiceError> {
    if !auth_user.has_permission(perm::MOVES_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to request moves".to_string(),
        ));
    }

    let created = state
        .services
        .moves
        .request_move(request, auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Open one move request per item: the primary plus its linked companions.
/// Partial companion failure is reported, not rolled back.
#[utoipa::path(
    post,
    path = "/api/v1/moves/bulk",
    request_body = BulkMoveRequest,
    responses(
        (status = 201, description = "Requests created; failures listed per item", body = BulkMoveResponse),
        (status = 400, description = "Missing item or destination"),
        (status = 404, description = "Primary item not found")
    ),
    tag = "Moves"
)]
pub async fn create_bulk_move(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<BulkMoveRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BulkMoveResponse>>), ServiceError> {
    if !auth_user.has_permission(perm::MOVES_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to request moves".to_string(),
        ));
    }

    let report = state
        .services
        .moves
        .request_bulk_move(request, auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(report))))
}

pub async fn list_moves(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<MoveListQuery>,
) -> Result<Json<ApiResponse<MoveListResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::MOVES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view moves".to_string(),
        ));
    }

    let list = state
        .services
        .moves
        .list_moves(query.page, query.limit, query.is_finished)
        .await?;

    Ok(Json(ApiResponse::success(list)))
}

pub async fn get_move(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MoveResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::MOVES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view moves".to_string(),
        ));
    }

    let found = state.services.moves.get_move(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Approve a pending move, applying it to the ledger atomically.
#[utoipa::path(
    post,
    path = "/api/v1/moves/{id}/approve",
    params(("id" = Uuid, Path, description = "Move id")),
    responses(
        (status = 200, description = "Move approved and ledger updated", body = MoveResponse),
        (status = 400, description = "Move already finished"),
        (status = 404, description = "Move not found")
    ),
    tag = "Moves"
)]
pub async fn approve_move(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MoveResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::MOVES_APPROVE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to approve moves".to_string(),
        ));
    }

    let updated = state
        .services
        .moves
        .approve_move(id, auth_user.user_id)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// Reject a pending move; the request closes, the ledger stays untouched.
#[utoipa::path(
    post,
    path = "/api/v1/moves/{id}/reject",
    params(("id" = Uuid, Path, description = "Move id")),
    responses(
        (status = 200, description = "Move rejected", body = MoveResponse),
        (status = 400, description = "Move already finished"),
        (status = 404, description = "Move not found")
    ),
    tag = "Moves"
)]
pub async fn reject_move(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MoveResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::MOVES_APPROVE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to reject moves".to_string(),
        ));
    }

    let updated = state
        .services
        .moves
        .reject_move(id, auth_user.user_id)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}
