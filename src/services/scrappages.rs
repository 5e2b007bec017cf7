use crate::{
    db::DbPool,
    entities::{item, scrappage},
    errors::ServiceError,
    events::{Event, EventSender},
    services::items::ItemStatus,
    services::ledger,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateScrappageRequest {
    #[validate(length(min = 1, message = "Item id is required"))]
    pub item_id: String,
    /// Reason for retiring the item
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScrappageResponse {
    pub id: Uuid,
    pub item_id: String,
    pub description: Option<String>,
    pub is_finished: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScrappageListResponse {
    pub scrappages: Vec<ScrappageResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Scrap workflow: the same two-state machine as moves, but approval retires
/// the item entirely — status `scrapped`, every placement, custody record and
/// structure link deactivated.
#[derive(Clone)]
pub struct ScrappageService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ScrappageService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Opens a scrap request. `is_finished` is always false at creation;
    /// nothing else changes until approval.
    #[instrument(skip(self, request, actor_id), fields(item_id = %request.item_id))]
    pub async fn request_scrap(
        &self,
        request: CreateScrappageRequest,
        actor_id: Uuid,
    ) -> Result<ScrappageResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        if item::Entity::find_by_id(&request.item_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Item {} not found",
                request.item_id
            )));
        }

        let scrap_model = scrappage::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(request.item_id.clone()),
            description: Set(request.description),
            is_finished: Set(false),
            created_at: Set(Utc::now()),
            created_by: Set(actor_id),
            closed_at: Set(None),
            closed_by: Set(None),
        }
        .insert(db)
        .await?;

        info!(scrappage_id = %scrap_model.id, item_id = %scrap_model.item_id, "Scrap requested");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ScrapRequested(scrap_model.id)).await {
                warn!(error = %e, scrappage_id = %scrap_model.id, "Failed to send scrap requested event");
            }
        }

        Ok(model_to_response(scrap_model))
    }

    /// Approves a pending scrap request. In one transaction the item becomes
    /// `scrapped` (terminal), all active placements, custody records and
    /// structure links are deactivated (unscoped, unlike move approval) and
    /// the request is closed.
    #[instrument(skip(self, actor_id))]
    pub async fn approve_scrap(
        &self,
        scrappage_id: Uuid,
        actor_id: Uuid,
    ) -> Result<ScrappageResponse, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, scrappage_id = %scrappage_id, "Failed to start transaction for scrap approval");
            ServiceError::DatabaseError(e)
        })?;

        let scrap_model = scrappage::Entity::find_by_id(scrappage_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Scrappage {scrappage_id} not found")))?;

        if scrap_model.is_finished {
            return Err(ServiceError::Conflict(format!(
                "Scrappage {scrappage_id} is already finished"
            )));
        }

        let item = item::Entity::find_by_id(&scrap_model.item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found", scrap_model.item_id))
            })?;

        let mut retiring: item::ActiveModel = item.into();
        retiring.status = Set(ItemStatus::Scrapped.to_string());
        retiring.update(&txn).await?;

        ledger::deactivate_active_placements(&txn, &scrap_model.item_id, None, actor_id).await?;
        ledger::deactivate_active_custody(&txn, &scrap_model.item_id, None, actor_id).await?;
        ledger::deactivate_structure_links(&txn, &scrap_model.item_id, actor_id).await?;

        let mut closing: scrappage::ActiveModel = scrap_model.into();
        closing.is_finished = Set(true);
        closing.closed_at = Set(Some(Utc::now()));
        closing.closed_by = Set(Some(actor_id));
        let updated = closing.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, scrappage_id = %scrappage_id, "Failed to commit scrap approval");
            ServiceError::DatabaseError(e)
        })?;

        info!(scrappage_id = %scrappage_id, item_id = %updated.item_id, "Scrap approved");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ScrapApproved(scrappage_id)).await {
                warn!(error = %e, scrappage_id = %scrappage_id, "Failed to send scrap approved event");
            }
        }

        Ok(model_to_response(updated))
    }

    /// Rejects a pending scrap request: closes it without touching the item.
    #[instrument(skip(self, actor_id))]
    pub async fn reject_scrap(
        &self,
        scrappage_id: Uuid,
        actor_id: Uuid,
    ) -> Result<ScrappageResponse, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await?;

        let scrap_model = scrappage::Entity::find_by_id(scrappage_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Scrappage {scrappage_id} not found")))?;

        if scrap_model.is_finished {
            return Err(ServiceError::Conflict(format!(
                "Scrappage {scrappage_id} is already finished"
            )));
        }

        let mut closing: scrappage::ActiveModel = scrap_model.into();
        closing.is_finished = Set(true);
        closing.closed_at = Set(Some(Utc::now()));
        closing.closed_by = Set(Some(actor_id));
        let updated = closing.update(&txn).await?;

        txn.commit().await?;

        info!(scrappage_id = %scrappage_id, "Scrap rejected");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ScrapRejected(scrappage_id)).await {
                warn!(error = %e, scrappage_id = %scrappage_id, "Failed to send scrap rejected event");
            }
        }

        Ok(model_to_response(updated))
    }

    /// Retrieves a scrap request by id.
    #[instrument(skip(self))]
    pub async fn get_scrappage(&self, scrappage_id: Uuid) -> Result<ScrappageResponse, ServiceError> {
        let db = &*self.db_pool;

        let scrap_model = scrappage::Entity::find_by_id(scrappage_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Scrappage {scrappage_id} not found")))?;

        Ok(model_to_response(scrap_model))
    }

    /// Lists scrap requests newest first, optionally filtered to open or
    /// finished ones.
    #[instrument(skip(self))]
    pub async fn list_scrappages(
        &self,
        page: u64,
        per_page: u64,
        is_finished: Option<bool>,
    ) -> Result<ScrappageListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = scrappage::Entity::find().order_by_desc(scrappage::Column::CreatedAt);
        if let Some(is_finished) = is_finished {
            query = query.filter(scrappage::Column::IsFinished.eq(is_finished));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator.num_items().await?;
        let scrappages = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(ScrappageListResponse {
            scrappages: scrappages.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }
}

fn model_to_response(model: scrappage::Model) -> ScrappageResponse {
    ScrappageResponse {
        id: model.id,
        item_id: model.item_id,
        description: model.description,
        is_finished: model.is_finished,
        created_at: model.created_at,
        created_by: model.created_by,
        closed_at: model.closed_at,
        closed_by: model.closed_by,
    }
}
