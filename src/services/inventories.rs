use crate::{
    db::DbPool,
    entities::{inventory, inventory_item, item},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryRequest {
    #[validate(length(min = 1, max = 255, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordSightingRequest {
    #[validate(length(min = 1, message = "Item id is required"))]
    pub item_id: String,
}

/// Stock-take campaigns and the sightings recorded during them.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request, actor_id))]
    pub async fn create_inventory(
        &self,
        request: CreateInventoryRequest,
        actor_id: Uuid,
    ) -> Result<inventory::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let row = inventory::ActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(request.description),
            created_at: Set(Utc::now()),
            created_by: Set(actor_id),
        }
        .insert(&*self.db_pool)
        .await?;

        Ok(row)
    }

    /// Records "this item was seen" during a stock-take.
    #[instrument(skip(self, request, actor_id), fields(item_id = %request.item_id))]
    pub async fn record_sighting(
        &self,
        inventory_id: Uuid,
        request: RecordSightingRequest,
        actor_id: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        if inventory::Entity::find_by_id(inventory_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Inventory {inventory_id} not found"
            )));
        }

        if item::Entity::find_by_id(&request.item_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Item {} not found",
                request.item_id
            )));
        }

        let row = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            inventory_id: Set(inventory_id),
            item_id: Set(request.item_id),
            created_at: Set(Utc::now()),
            created_by: Set(actor_id),
        }
        .insert(db)
        .await?;

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::InventorySightingRecorded(row.id))
                .await
            {
                warn!(error = %e, sighting_id = %row.id, "Failed to send sighting event");
            }
        }

        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn list_inventories(&self) -> Result<Vec<inventory::Model>, ServiceError> {
        Ok(inventory::Entity::find()
            .order_by_desc(inventory::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    /// All sightings recorded in one campaign.
    #[instrument(skip(self))]
    pub async fn list_sightings(
        &self,
        inventory_id: Uuid,
    ) -> Result<Vec<inventory_item::Model>, ServiceError> {
        let db = &*self.db_pool;

        if inventory::Entity::find_by_id(inventory_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Inventory {inventory_id} not found"
            )));
        }

        Ok(inventory_item::Entity::find()
            .filter(inventory_item::Column::InventoryId.eq(inventory_id))
            .order_by_asc(inventory_item::Column::CreatedAt)
            .all(db)
            .await?)
    }
}
