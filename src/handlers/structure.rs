use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::consts as perm;
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::structure::{CreateStructureLinkRequest, StructureMappingResponse};
use crate::{ApiResponse, AppState};

/// Link two items into a parent/child structure.
#[utoipa::path(
    post,
    path = "/api/v1/structure-mappings",
    request_body = CreateStructureLinkRequest,
    responses(
        (status = 201, description = "Link created with endpoints resolved", body = StructureMappingResponse),
        (status = 400, description = "Self-link or duplicate active link"),
        (status = 404, description = "One or both items not found")
    ),
    tag = "Structure"
)]
pub async fn create_structure_mapping(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateStructureLinkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StructureMappingResponse>>), ServiceError> {
    if !auth_user.has_permission(perm::STRUCTURE_CREATE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to create structure links".to_string(),
        ));
    }

    let created = state
        .services
        .structure
        .create_link(request, auth_user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Break a structure link (soft delete).
#[utoipa::path(
    delete,
    path = "/api/v1/structure-mappings/{id}",
    params(("id" = Uuid, Path, description = "Mapping id")),
    responses(
        (status = 200, description = "Link deactivated", body = StructureMappingResponse),
        (status = 400, description = "Link already inactive"),
        (status = 404, description = "Mapping not found")
    ),
    tag = "Structure"
)]
pub async fn deactivate_structure_mapping(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StructureMappingResponse>>, ServiceError> {
    if !auth_user.has_permission(perm::STRUCTURE_DELETE) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to break structure links".to_string(),
        ));
    }

    let updated = state
        .services
        .structure
        .deactivate_link(id, auth_user.user_id)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}
