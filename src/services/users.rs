use crate::{
    db::DbPool,
    entities::user,
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertUserRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "External id is required"))]
    pub external_id: String,
}

/// User provisioning mirroring the identity provider: accounts are upserted
/// by email on sign-in, never deleted here.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates the user on first sight, refreshes name/external id and the
    /// last-login stamp otherwise.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn upsert_user(&self, request: UpsertUserRequest) -> Result<user::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;

        let row = match existing {
            Some(found) => {
                let mut active: user::ActiveModel = found.into();
                active.name = Set(request.name);
                active.external_id = Set(request.external_id);
                active.last_login = Set(Some(now));
                active.update(db).await?
            }
            None => {
                user::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(request.name),
                    email: Set(request.email),
                    external_id: Set(request.external_id),
                    last_login: Set(Some(now)),
                    created_at: Set(now),
                }
                .insert(db)
                .await?
            }
        };

        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {user_id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }
}
