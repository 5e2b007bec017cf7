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
use crate::services::scrappages::{
    CreateScrappageRequest, ScrappageListResponse, ScrappageResponse,
};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ScrappageListQuery {
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

/// Open a scrap request for an item.
#[utoipa::path(
    post,
    path = "/api/v1/scrappages",
    request_body = CreateScrappageRequest,
    responses(
        (status = 201, description = "Scrap request created", body = ScrappageResponse),
        (status = 400, description = "Missing item id"),
        (status = 404, description = "Item not found")
    ),
    tag = "Scrappages"
)]
pub async fn create_scrappage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateScrappageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ScrappageResponse>>), ServiceError> {
    if !auth_user.has_permission(perm::SCRAPPAGES_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to request scrappage".to_string(),
        ));
    }

    let created = state
        .services
        .scrappages
        .request_scrap(request, auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_scrappages(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ScrappageListQuery>,
) -> Result<Json<ApiResponse<ScrappageListResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::SCRAPPAGES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view scrappages".to_string(),
        ));
    }

    let list = state
        .services
        .scrappages
        .list_scrappages(query.page, query.limit, query.is_finished)
        .await?;

    Ok(Json(ApiResponse::success(list)))
}

pub async fn get_scrappage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ScrappageResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::SCRAPPAGES_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view scrappages".to_string(),
        ));
    }

    let found = state.services.scrappages.get_scrappage(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// Approve a pending scrap request: the item is retired and every active
/// ledger record it holds is deactivated, atomically.
#[utoipa::path(
    post,
    path = "/api/v1/scrappages/{id}/approve",
    params(("id" = Uuid, Path, description = "Scrappage id")),
    responses(
        (status = 200, description = "Scrap approved and item retired", body = ScrappageResponse),
        (status = 400, description = "Scrappage already finished"),
        (status = 404, description = "Scrappage not found")
    ),
    tag = "Scrappages"
)]
pub async fn approve_scrappage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ScrappageResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::SCRAPPAGES_APPROVE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to approve scrappage".to_string(),
        ));
    }

    let updated = state
        .services
        .scrappages
        .approve_scrap(id, auth_user.user_id)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// Reject a pending scrap request without touching the item.
#[utoipa::path(
    post,
    path = "/api/v1/scrappages/{id}/reject",
    params(("id" = Uuid, Path, description = "Scrappage id")),
    responses(
        (status = 200, description = "Scrap rejected", body = ScrappageResponse),
        (status = 400, description = "Scrappage already finished"),
        (status = 404, description = "Scrappage not found")
    ),
    tag = "Scrappages"
)]
pub async fn reject_scrappage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ScrappageResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::SCRAPPAGES_APPROVE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to reject scrappage".to_string(),
        ));
    }

    let updated = state
        .services
        .scrappages
        .reject_scrap(id, auth_user.user_id)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}
