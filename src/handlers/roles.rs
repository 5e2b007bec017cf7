use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::auth::AuthUser;
use crate::entities::user;
use crate::errors::ServiceError;
use crate::services::roles::{CreateRoleRequest, ReplacePermissionsRequest, RoleResponse};
use crate::services::users::UpsertUserRequest;
use crate::{ApiResponse, AppState};

pub async fn create_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoleResponse>>), ServiceError> {
    if !auth_user.has_permission(perm::ROLES_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage roles".to_string(),
        ));
    }

    let created = state.services.roles.create_role(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn list_roles(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<RoleResponse>>>, ServiceError> {
    if !auth_user.has_permission(perm::ROLES_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage roles".to_string(),
        ));
    }

    let roles = state.services.roles.list_roles().await?;
    Ok(Json(ApiResponse::success(roles)))
}

/// Swap a role's permission set wholesale.
pub async fn replace_role_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReplacePermissionsRequest>,
) -> Result<Json<ApiResponse<RoleResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::ROLES_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage roles".to_string(),
        ));
    }

    let updated = state
        .services
        .roles
        .replace_permissions(id, request)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// Provision or refresh a user account, mirroring IdP sign-in.
pub async fn upsert_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpsertUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<user::Model>>), ServiceError> {
    if !auth_user.has_permission(perm::ROLES_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage users".to_string(),
        ));
    }

    let row = state.services.users.upsert_user(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(row))))
}

pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<user::Model>>>, ServiceError> {
    if !auth_user.has_permission(perm::ROLES_MANAGE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage users".to_string(),
        ));
    }

    let users = state.services.users.list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}
