use crate::{
    db::DbPool,
    entities::{item, move_request},
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
pub struct CreateMoveRequest {
    #[validate(length(min = 1, message = "Item id is required"))]
    pub item_id: String,
    pub from_room_id: Option<Uuid>,
    pub from_toolbook_id: Option<Uuid>,
    pub to_room_id: Option<Uuid>,
    pub to_toolbook_id: Option<Uuid>,
    pub description: Option<String>,
}

/// A move request plus the linked equipment that should travel with it.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkMoveRequest {
    #[validate]
    #[serde(flatten)]
    pub primary: CreateMoveRequest,
    /// Asset tags of companion items moved to the same destination
    pub companion_item_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MoveResponse {
    pub id: Uuid,
    pub item_id: String,
    pub from_room_id: Option<Uuid>,
    pub from_toolbook_id: Option<Uuid>,
    pub to_room_id: Option<Uuid>,
    pub to_toolbook_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_finished: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MoveListResponse {
    pub moves: Vec<MoveResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// One companion item the bulk fan-out could not create a request for.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkMoveFailure {
    pub item_id: String,
    pub error: String,
}

/// Outcome of a bulk move: every request that was created, plus the
/// companions that failed. Successes are never rolled back on account of a
/// failed sibling.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkMoveResponse {
    pub requested: Vec<MoveResponse>,
    pub failed: Vec<BulkMoveFailure>,
}

/// Move workflow: a two-state machine per request (pending, finished).
///
/// Requests are inert until approved; approval applies all ledger mutations
/// in one transaction. Finished requests accept no further transitions.
#[derive(Clone)]
pub struct MoveService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl MoveService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Opens a move request. `is_finished` is always false at creation;
    /// client input cannot override it. The ledger is not touched.
    #[instrument(skip(self, request, actor_id), fields(item_id = %request.item_id))]
    pub async fn request_move(
        &self,
        request: CreateMoveRequest,
        actor_id: Uuid,
    ) -> Result<MoveResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.to_room_id.is_none() && request.to_toolbook_id.is_none() {
            return Err(ServiceError::ValidationError(
                "At least one destination (room or toolbook) is required".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let item = item::Entity::find_by_id(&request.item_id).one(db).await?;
        if item.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Item {} not found",
                request.item_id
            )));
        }

        let move_model = move_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(request.item_id.clone()),
            from_room_id: Set(request.from_room_id),
            from_toolbook_id: Set(request.from_toolbook_id),
            to_room_id: Set(request.to_room_id),
            to_toolbook_id: Set(request.to_toolbook_id),
            description: Set(request.description),
            is_finished: Set(false),
            created_at: Set(Utc::now()),
            created_by: Set(actor_id),
            closed_at: Set(None),
            closed_by: Set(None),
        }
        .insert(db)
        .await?;

        info!(move_id = %move_model.id, item_id = %move_model.item_id, "Move requested");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MoveRequested(move_model.id)).await {
                warn!(error = %e, move_id = %move_model.id, "Failed to send move requested event");
            }
        }

        Ok(model_to_response(move_model))
    }

    /// Opens one move request per item: the primary first, then each
    /// companion with the same destinations. Companion failures are collected
    /// and reported; requests already created stay in place.
    #[instrument(skip(self, request, actor_id), fields(item_id = %request.primary.item_id))]
    pub async fn request_bulk_move(
        &self,
        request: BulkMoveRequest,
        actor_id: Uuid,
    ) -> Result<BulkMoveResponse, ServiceError> {
        let primary = self.request_move(request.primary.clone(), actor_id).await?;

        let mut requested = vec![primary];
        let mut failed = Vec::new();

        for companion_id in request.companion_item_ids {
            if companion_id == request.primary.item_id {
                continue;
            }
            let companion_request = CreateMoveRequest {
                item_id: companion_id.clone(),
                from_room_id: None,
                from_toolbook_id: None,
                to_room_id: request.primary.to_room_id,
                to_toolbook_id: request.primary.to_toolbook_id,
                description: request.primary.description.clone(),
            };

            match self.request_move(companion_request, actor_id).await {
                Ok(response) => requested.push(response),
                Err(e) => {
                    warn!(item_id = %companion_id, error = %e, "Companion move request failed");
                    failed.push(BulkMoveFailure {
                        item_id: companion_id,
                        error: e.response_message(),
                    });
                }
            }
        }

        Ok(BulkMoveResponse { requested, failed })
    }

    /// Approves a pending move and applies it to the ledger atomically:
    /// promote a `new` item to `active`, retire the scoped source placement
    /// and custody, create the destination records, close the request.
    #[instrument(skip(self, actor_id))]
    pub async fn approve_move(
        &self,
        move_id: Uuid,
        actor_id: Uuid,
    ) -> Result<MoveResponse, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, move_id = %move_id, "Failed to start transaction for move approval");
            ServiceError::DatabaseError(e)
        })?;

        // The finished re-check must happen on the locked row, otherwise two
        // concurrent approvals could both pass the guard.
        let move_model = move_request::Entity::find_by_id(move_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Move {move_id} not found")))?;

        if move_model.is_finished {
            return Err(ServiceError::Conflict(format!(
                "Move {move_id} is already finished"
            )));
        }

        let item = item::Entity::find_by_id(&move_model.item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found", move_model.item_id))
            })?;

        if ItemStatus::parse(&item.status)? == ItemStatus::New {
            let mut active: item::ActiveModel = item.into();
            active.status = Set(ItemStatus::Active.to_string());
            active.update(&txn).await?;
        }

        if let Some(from_room_id) = move_model.from_room_id {
            ledger::deactivate_active_placements(
                &txn,
                &move_model.item_id,
                Some(from_room_id),
                actor_id,
            )
            .await?;
        }

        if let Some(from_toolbook_id) = move_model.from_toolbook_id {
            ledger::deactivate_active_custody(
                &txn,
                &move_model.item_id,
                Some(from_toolbook_id),
                actor_id,
            )
            .await?;
        }

        if let Some(to_room_id) = move_model.to_room_id {
            ledger::create_placement(&txn, &move_model.item_id, to_room_id, actor_id).await?;
        }

        if let Some(to_toolbook_id) = move_model.to_toolbook_id {
            ledger::create_custody(&txn, &move_model.item_id, to_toolbook_id, actor_id).await?;
        }

        let mut closing: move_request::ActiveModel = move_model.into();
        closing.is_finished = Set(true);
        closing.closed_at = Set(Some(Utc::now()));
        closing.closed_by = Set(Some(actor_id));
        let updated = closing.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, move_id = %move_id, "Failed to commit move approval");
            ServiceError::DatabaseError(e)
        })?;

        info!(move_id = %move_id, item_id = %updated.item_id, "Move approved");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MoveApproved(move_id)).await {
                warn!(error = %e, move_id = %move_id, "Failed to send move approved event");
            }
        }

        Ok(model_to_response(updated))
    }

    /// Rejects a pending move: closes the request without any ledger change.
    #[instrument(skip(self, actor_id))]
    pub async fn reject_move(
        &self,
        move_id: Uuid,
        actor_id: Uuid,
    ) -> Result<MoveResponse, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await?;

        let move_model = move_request::Entity::find_by_id(move_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Move {move_id} not found")))?;

        if move_model.is_finished {
            return Err(ServiceError::Conflict(format!(
                "Move {move_id} is already finished"
            )));
        }

        let mut closing: move_request::ActiveModel = move_model.into();
        closing.is_finished = Set(true);
        closing.closed_at = Set(Some(Utc::now()));
        closing.closed_by = Set(Some(actor_id));
        let updated = closing.update(&txn).await?;

        txn.commit().await?;

        info!(move_id = %move_id, "Move rejected");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::MoveRejected(move_id)).await {
                warn!(error = %e, move_id = %move_id, "Failed to send move rejected event");
            }
        }

        Ok(model_to_response(updated))
    }

    /// Retrieves a move request by id.
    #[instrument(skip(self))]
    pub async fn get_move(&self, move_id: Uuid) -> Result<MoveResponse, ServiceError> {
        let db = &*self.db_pool;

        let move_model = move_request::Entity::find_by_id(move_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Move {move_id} not found")))?;

        Ok(model_to_response(move_model))
    }

    /// Lists move requests newest first, optionally filtered to open or
    /// finished ones.
    #[instrument(skip(self))]
    pub async fn list_moves(
        &self,
        page: u64,
        per_page: u64,
        is_finished: Option<bool>,
    ) -> Result<MoveListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query =
            move_request::Entity::find().order_by_desc(move_request::Column::CreatedAt);
        if let Some(is_finished) = is_finished {
            query = query.filter(move_request::Column::IsFinished.eq(is_finished));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator.num_items().await?;
        let moves = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(MoveListResponse {
            moves: moves.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }
}

fn model_to_response(model: move_request::Model) -> MoveResponse {
    MoveResponse {
        id: model.id,
        item_id: model.item_id,
        from_room_id: model.from_room_id,
        from_toolbook_id: model.from_toolbook_id,
        to_room_id: model.to_room_id,
        to_toolbook_id: model.to_toolbook_id,
        description: model.description,
        is_finished: model.is_finished,
        created_at: model.created_at,
        created_by: model.created_by,
        closed_at: model.closed_at,
        closed_by: model.closed_by,
    }
}
