use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::toolbooks::{CreateToolbookRequest, ToolbookResponse};
use crate::{ApiResponse, AppState};

pub async fn create_toolbook(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateToolbookRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ToolbookResponse>>), ServiceError> {
    if !auth_user.has_permission(perm::TOOLBOOKS_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage toolbooks".to_string(),
        ));
    }

    let created = state.services.toolbooks.create_toolbook(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_toolbooks(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<ToolbookResponse>>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view toolbooks".to_string(),
        ));
    }

    let toolbooks = state.services.toolbooks.list_toolbooks().await?;
    Ok(Json(ApiResponse::success(toolbooks)))
}

pub async fn get_toolbook(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ToolbookResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::ITEMS_READ) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view toolbooks".to_string(),
        ));
    }

    let found = state.services.toolbooks.get_toolbook(id).await?;
    Ok(Json(ApiResponse::success(found)))
}
