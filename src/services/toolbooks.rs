use crate::{
    db::DbPool,
    entities::{toolbook, toolbook_item, user},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateToolbookRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolbookResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_name: String,
    /// Asset tags currently held
    pub active_items: Vec<String>,
}

/// Custody containers: one toolbook per person.
#[derive(Clone)]
pub struct ToolbookService {
    db_pool: Arc<DbPool>,
}

impl ToolbookService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates a toolbook for a user; one per user.
    #[instrument(skip(self, request))]
    pub async fn create_toolbook(
        &self,
        request: CreateToolbookRequest,
    ) -> Result<ToolbookResponse, ServiceError> {
        let db = &*self.db_pool;

        let owner = user::Entity::find_by_id(request.user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User {} not found", request.user_id))
            })?;

        let existing = toolbook::Entity::find()
            .filter(toolbook::Column::UserId.eq(request.user_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "User {} already has a toolbook",
                request.user_id
            )));
        }

        let row = toolbook::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(request.user_id),
        }
        .insert(db)
        .await?;

        Ok(ToolbookResponse {
            id: row.id,
            user_id: row.user_id,
            owner_name: owner.name,
            active_items: Vec::new(),
        })
    }

    /// Retrieves a toolbook with its owner and currently held items.
    #[instrument(skip(self))]
    pub async fn get_toolbook(&self, toolbook_id: Uuid) -> Result<ToolbookResponse, ServiceError> {
        let db = &*self.db_pool;

        let row = toolbook::Entity::find_by_id(toolbook_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Toolbook {toolbook_id} not found")))?;

        self.to_response(row).await
    }

    /// Lists all toolbooks with owners and held items.
    #[instrument(skip(self))]
    pub async fn list_toolbooks(&self) -> Result<Vec<ToolbookResponse>, ServiceError> {
        let rows = toolbook::Entity::find().all(&*self.db_pool).await?;

        let mut responses = Vec::with_capacity(rows.len());
        for row in rows {
            responses.push(self.to_response(row).await?);
        }
        Ok(responses)
    }

    async fn to_response(&self, row: toolbook::Model) -> Result<ToolbookResponse, ServiceError> {
        let db = &*self.db_pool;

        let owner_name = user::Entity::find_by_id(row.user_id)
            .one(db)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| "unknown".to_string());

        let active_items = toolbook_item::Entity::find()
            .filter(toolbook_item::Column::ToolbookId.eq(row.id))
            .filter(toolbook_item::Column::IsActive.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(|record| record.item_id)
            .collect();

        Ok(ToolbookResponse {
            id: row.id,
            user_id: row.user_id,
            owner_name,
            active_items,
        })
    }
}
