use crate::{
    auth::PERMISSIONS,
    db::DbPool,
    entities::{role, role_permission},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 128, message = "Name is required"))]
    pub name: String,
    /// Directory group identifier issued by the identity provider
    #[validate(length(min = 1, max = 255, message = "Group id is required"))]
    pub group_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplacePermissionsRequest {
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub group_id: String,
    pub permissions: Vec<String>,
}

/// Role administration: binding directory groups to permission sets.
#[derive(Clone)]
pub struct RoleService {
    db_pool: Arc<DbPool>,
}

impl RoleService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(group_id = %request.group_id))]
    pub async fn create_role(&self, request: CreateRoleRequest) -> Result<RoleResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let existing = role::Entity::find()
            .filter(role::Column::GroupId.eq(request.group_id.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A role for group {} already exists",
                request.group_id
            )));
        }

        let row = role::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            group_id: Set(request.group_id),
        }
        .insert(db)
        .await?;

        Ok(RoleResponse {
            id: row.id,
            name: row.name,
            group_id: row.group_id,
            permissions: Vec::new(),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_roles(&self) -> Result<Vec<RoleResponse>, ServiceError> {
        let rows = role::Entity::find()
            .order_by_asc(role::Column::Name)
            .find_with_related(role_permission::Entity)
            .all(&*self.db_pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(role, perms)| RoleResponse {
                id: role.id,
                name: role.name,
                group_id: role.group_id,
                permissions: perms.into_iter().map(|p| p.permission).collect(),
            })
            .collect())
    }

    /// Swaps a role's permission set: delete everything, insert the new set,
    /// in one transaction. Unknown permission names are rejected.
    #[instrument(skip(self, request))]
    pub async fn replace_permissions(
        &self,
        role_id: Uuid,
        request: ReplacePermissionsRequest,
    ) -> Result<RoleResponse, ServiceError> {
        for permission in &request.permissions {
            if !PERMISSIONS.contains_key(permission) {
                return Err(ServiceError::ValidationError(format!(
                    "Unknown permission: {permission}"
                )));
            }
        }

        let db = &*self.db_pool;

        let role_row = role::Entity::find_by_id(role_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Role {role_id} not found")))?;

        let txn = db.begin().await?;

        role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(&txn)
            .await?;

        for permission in &request.permissions {
            role_permission::ActiveModel {
                id: Set(Uuid::new_v4()),
                role_id: Set(role_id),
                permission: Set(permission.clone()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(role_id = %role_id, count = request.permissions.len(), "Role permissions replaced");

        Ok(RoleResponse {
            id: role_row.id,
            name: role_row.name,
            group_id: role_row.group_id,
            permissions: request.permissions,
        })
    }
}
