use crate::{
    db::DbPool,
    entities::{cabinet, item, item_metadata, item_place, model, room, toolbook, toolbook_item, user},
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of an item.
///
/// `new` items become `active` on their first approved move; `scrapped` is
/// terminal and only ever set by scrap approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    New,
    Active,
    Scrapped,
}

impl ItemStatus {
    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        Self::from_str(value)
            .map_err(|_| ServiceError::InternalError(format!("unknown item status: {value}")))
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    /// Externally assigned asset tag
    #[validate(length(min = 1, max = 64, message = "Asset tag is required"))]
    pub id: String,
    pub eid: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Description is required"))]
    pub description: String,
    pub model_id: Uuid,
    pub serial_number: Option<String>,
    /// Optional initial placement: register the item directly into a room
    pub room_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddMetadataRequest {
    #[validate(length(min = 1, message = "Notes are required"))]
    pub notes: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    pub id: String,
    pub eid: Option<String>,
    pub description: String,
    pub model_id: Uuid,
    pub serial_number: Option<String>,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Where an item currently is: its active placement and/or active custody.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentLocation {
    pub placement: Option<PlacementInfo>,
    pub custody: Option<CustodyInfo>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlacementInfo {
    pub place_id: Uuid,
    pub room_id: Option<Uuid>,
    pub room_description: Option<String>,
    pub cabinet_id: Option<Uuid>,
    pub cabinet_description: Option<String>,
    pub is_stored: bool,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustodyInfo {
    pub toolbook_id: Uuid,
    pub holder_name: Option<String>,
    pub since: DateTime<Utc>,
}

/// Service for registering and inspecting items.
#[derive(Clone)]
pub struct ItemService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ItemService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a new item with status `new`. When `room_id` is given, the
    /// initial placement is created in the same transaction.
    #[instrument(skip(self, request, actor_id), fields(item_id = %request.id))]
    pub async fn create_item(
        &self,
        request: CreateItemRequest,
        actor_id: Uuid,
    ) -> Result<ItemResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let model_exists = model::Entity::find_by_id(request.model_id).one(db).await?;
        if model_exists.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Model {} not found",
                request.model_id
            )));
        }

        if item::Entity::find_by_id(&request.id).one(db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Item {} already exists",
                request.id
            )));
        }

        if let Some(room_id) = request.room_id {
            if room::Entity::find_by_id(room_id).one(db).await?.is_none() {
                return Err(ServiceError::NotFound(format!("Room {room_id} not found")));
            }
        }

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for item creation");
            ServiceError::DatabaseError(e)
        })?;

        let item_model = item::ActiveModel {
            id: Set(request.id.clone()),
            eid: Set(request.eid),
            description: Set(request.description),
            model_id: Set(request.model_id),
            serial_number: Set(request.serial_number),
            status: Set(ItemStatus::New.to_string()),
            created_at: Set(Utc::now()),
            created_by: Set(actor_id),
        }
        .insert(&txn)
        .await?;

        if let Some(room_id) = request.room_id {
            ledger::create_placement(&txn, &item_model.id, room_id, actor_id).await?;
        }

        txn.commit().await?;

        info!(item_id = %item_model.id, "Item registered");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ItemCreated(item_model.id.clone())).await {
                warn!(error = %e, item_id = %item_model.id, "Failed to send item created event");
            }
        }

        model_to_response(item_model)
    }

    /// Retrieves an item by asset tag.
    #[instrument(skip(self))]
    pub async fn get_item(&self, item_id: &str) -> Result<ItemResponse, ServiceError> {
        let db = &*self.db_pool;

        let item = item::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {item_id} not found")))?;

        model_to_response(item)
    }

    /// Lists items with pagination and an optional status filter.
    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        page: u64,
        per_page: u64,
        status: Option<ItemStatus>,
    ) -> Result<ItemListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = item::Entity::find().order_by_asc(item::Column::Id);
        if let Some(status) = status {
            query = query.filter(item::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(ItemListResponse {
            items: items
                .into_iter()
                .map(model_to_response)
                .collect::<Result<Vec<_>, _>>()?,
            total,
            page,
            per_page,
        })
    }

    /// Resolves the item's current whereabouts: the active placement (room or
    /// cabinet) and the active custody record, either of which may be absent.
    #[instrument(skip(self))]
    pub async fn current_location(&self, item_id: &str) -> Result<CurrentLocation, ServiceError> {
        let db = &*self.db_pool;

        if item::Entity::find_by_id(item_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Item {item_id} not found")));
        }

        let place = item_place::Entity::find()
            .filter(item_place::Column::ItemId.eq(item_id))
            .filter(item_place::Column::IsActive.eq(true))
            .one(db)
            .await?;

        let custody = toolbook_item::Entity::find()
            .filter(toolbook_item::Column::ItemId.eq(item_id))
            .filter(toolbook_item::Column::IsActive.eq(true))
            .one(db)
            .await?;

        let placement = match place {
            Some(place) => {
                let room_description = match place.room_id {
                    Some(room_id) => room::Entity::find_by_id(room_id)
                        .one(db)
                        .await?
                        .map(|r| r.description),
                    None => None,
                };
                let cabinet_description = match place.cabinet_id {
                    Some(cabinet_id) => cabinet::Entity::find_by_id(cabinet_id)
                        .one(db)
                        .await?
                        .map(|c| c.description),
                    None => None,
                };
                Some(PlacementInfo {
                    place_id: place.id,
                    room_id: place.room_id,
                    room_description,
                    cabinet_id: place.cabinet_id,
                    cabinet_description,
                    is_stored: place.is_stored,
                    since: place.created_at,
                })
            }
            None => None,
        };

        let custody = match custody {
            Some(record) => {
                let holder_name = match toolbook::Entity::find_by_id(record.toolbook_id)
                    .one(db)
                    .await?
                {
                    Some(tb) => user::Entity::find_by_id(tb.user_id)
                        .one(db)
                        .await?
                        .map(|u| u.name),
                    None => None,
                };
                Some(CustodyInfo {
                    toolbook_id: record.toolbook_id,
                    holder_name,
                    since: record.created_at,
                })
            }
            None => None,
        };

        Ok(CurrentLocation { placement, custody })
    }

    /// Appends a free-form audit note to an item.
    #[instrument(skip(self, request, actor_id))]
    pub async fn add_metadata(
        &self,
        item_id: &str,
        request: AddMetadataRequest,
        actor_id: Uuid,
    ) -> Result<item_metadata::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        if item::Entity::find_by_id(item_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Item {item_id} not found")));
        }

        let row = item_metadata::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(item_id.to_string()),
            notes: Set(request.notes),
            modified_at: Set(Utc::now()),
            modified_by: Set(actor_id),
        }
        .insert(db)
        .await?;

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MetadataAdded(item_id.to_string())).await {
                warn!(error = %e, item_id, "Failed to send metadata added event");
            }
        }

        Ok(row)
    }
}

fn model_to_response(model: item::Model) -> Result<ItemResponse, ServiceError> {
    Ok(ItemResponse {
        status: ItemStatus::parse(&model.status)?,
        id: model.id,
        eid: model.eid,
        description: model.description,
        model_id: model.model_id,
        serial_number: model.serial_number,
        created_at: model.created_at,
        created_by: model.created_by,
    })
}
