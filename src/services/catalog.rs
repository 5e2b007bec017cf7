//! Facility and model catalog: rooms, cabinets and equipment models.
//!
//! Plain CRUD consumed by the workflow services; no lifecycle logic here.

use crate::{
    db::DbPool,
    entities::{cabinet, model, room},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 255, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCabinetRequest {
    #[validate(length(min = 1, max = 255, message = "Description is required"))]
    pub description: String,
    pub room_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateModelRequest {
    #[validate(length(min = 1, max = 128, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, max = 128, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 128, message = "Category is required"))]
    pub category: String,
}

#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create_room(
        &self,
        request: CreateRoomRequest,
    ) -> Result<room::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let row = room::ActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(request.description),
        }
        .insert(&*self.db_pool)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<room::Model>, ServiceError> {
        Ok(room::Entity::find()
            .order_by_asc(room::Column::Description)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create_cabinet(
        &self,
        request: CreateCabinetRequest,
    ) -> Result<cabinet::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        if room::Entity::find_by_id(request.room_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Room {} not found",
                request.room_id
            )));
        }

        let row = cabinet::ActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(request.description),
            room_id: Set(request.room_id),
        }
        .insert(db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn list_cabinets(&self, room_id: Option<Uuid>) -> Result<Vec<cabinet::Model>, ServiceError> {
        let mut query = cabinet::Entity::find().order_by_asc(cabinet::Column::Description);
        if let Some(room_id) = room_id {
            query = query.filter(cabinet::Column::RoomId.eq(room_id));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create_model(
        &self,
        request: CreateModelRequest,
    ) -> Result<model::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let row = model::ActiveModel {
            id: Set(Uuid::new_v4()),
            brand: Set(request.brand),
            name: Set(request.name),
            category: Set(request.category),
        }
        .insert(&*self.db_pool)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<Vec<model::Model>, ServiceError> {
        Ok(model::Entity::find()
            .order_by_asc(model::Column::Brand)
            .all(&*self.db_pool)
            .await?)
    }
}
