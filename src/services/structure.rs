use crate::{
    db::DbPool,
    entities::{item, structure_mapping},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStructureLinkRequest {
    #[validate(length(min = 1, message = "Parent item id is required"))]
    pub parent_item_id: String,
    #[validate(length(min = 1, message = "Child item id is required"))]
    pub child_item_id: String,
}

/// Compact item representation embedded in structure responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemSummary {
    pub id: String,
    pub description: String,
    pub status: String,
}

impl From<item::Model> for ItemSummary {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            status: model.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StructureMappingResponse {
    pub id: Uuid,
    pub parent_item: ItemSummary,
    pub child_item: ItemSummary,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivated_by: Option<Uuid>,
}

/// Role of the linked counterpart relative to the queried item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StructureRelation {
    Parent,
    Child,
}

/// One active link touching the queried item, annotated with the other
/// endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StructureNeighbor {
    pub mapping_id: Uuid,
    pub linked_item: ItemSummary,
    /// `parent` when the linked item is the parent of the queried one
    pub relation: StructureRelation,
    pub created_at: DateTime<Utc>,
}

/// Parent/child equipment links with soft deactivation.
#[derive(Clone)]
pub struct StructureService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl StructureService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Links two items. Fails on self-links, on missing items and when an
    /// active link between the pair already exists in either direction. The
    /// duplicate check and the insert share one transaction.
    #[instrument(skip(self, request, actor_id), fields(parent = %request.parent_item_id, child = %request.child_item_id))]
    pub async fn create_link(
        &self,
        request: CreateStructureLinkRequest,
        actor_id: Uuid,
    ) -> Result<StructureMappingResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.parent_item_id == request.child_item_id {
            return Err(ServiceError::ValidationError(
                "An item cannot be linked to itself".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let parent = item::Entity::find_by_id(&request.parent_item_id)
            .one(&txn)
            .await?;
        let child = item::Entity::find_by_id(&request.child_item_id)
            .one(&txn)
            .await?;

        let (parent, child) = match (parent, child) {
            (Some(parent), Some(child)) => (parent, child),
            _ => {
                return Err(ServiceError::NotFound(
                    "One or both items not found".to_string(),
                ))
            }
        };

        if active_link_exists(&txn, &parent.id, &child.id).await? {
            return Err(ServiceError::Conflict(format!(
                "An active link between {} and {} already exists",
                parent.id, child.id
            )));
        }

        let mapping = structure_mapping::ActiveModel {
            id: Set(Uuid::new_v4()),
            parent_item_id: Set(parent.id.clone()),
            child_item_id: Set(child.id.clone()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            created_by: Set(actor_id),
            deactivated_at: Set(None),
            deactivated_by: Set(None),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(mapping_id = %mapping.id, "Structure link created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::StructureLinked(mapping.id)).await {
                warn!(error = %e, mapping_id = %mapping.id, "Failed to send structure linked event");
            }
        }

        Ok(build_response(mapping, parent, child))
    }

    /// Breaks a link: soft-deactivates the mapping and returns it with both
    /// endpoints resolved. Fails when missing or already inactive.
    #[instrument(skip(self, actor_id))]
    pub async fn deactivate_link(
        &self,
        mapping_id: Uuid,
        actor_id: Uuid,
    ) -> Result<StructureMappingResponse, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let mapping = structure_mapping::Entity::find_by_id(mapping_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Structure mapping {mapping_id} not found"))
            })?;

        if !mapping.is_active {
            return Err(ServiceError::Conflict(format!(
                "Structure mapping {mapping_id} is already inactive"
            )));
        }

        let mut active: structure_mapping::ActiveModel = mapping.into();
        active.is_active = Set(false);
        active.deactivated_at = Set(Some(Utc::now()));
        active.deactivated_by = Set(Some(actor_id));
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(mapping_id = %mapping_id, "Structure link deactivated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::StructureUnlinked(mapping_id)).await {
                warn!(error = %e, mapping_id = %mapping_id, "Failed to send structure unlinked event");
            }
        }

        let parent = item::Entity::find_by_id(&updated.parent_item_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found", updated.parent_item_id))
            })?;
        let child = item::Entity::find_by_id(&updated.child_item_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Item {} not found", updated.child_item_id))
            })?;

        Ok(build_response(updated, parent, child))
    }

    /// Lists the active links touching an item, each annotated with the
    /// counterpart endpoint and its role relative to the queried item.
    #[instrument(skip(self))]
    pub async fn neighbors(&self, item_id: &str) -> Result<Vec<StructureNeighbor>, ServiceError> {
        let db = &*self.db_pool;

        let mappings = structure_mapping::Entity::find()
            .filter(
                structure_mapping::Column::ParentItemId
                    .eq(item_id)
                    .or(structure_mapping::Column::ChildItemId.eq(item_id)),
            )
            .filter(structure_mapping::Column::IsActive.eq(true))
            .all(db)
            .await?;

        let counterpart_ids: Vec<String> = mappings
            .iter()
            .map(|m| {
                if m.parent_item_id == item_id {
                    m.child_item_id.clone()
                } else {
                    m.parent_item_id.clone()
                }
            })
            .collect();

        let counterparts = item::Entity::find()
            .filter(item::Column::Id.is_in(counterpart_ids))
            .all(db)
            .await?;

        let mut neighbors = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let (linked_id, relation) = if mapping.parent_item_id == item_id {
                (mapping.child_item_id.clone(), StructureRelation::Child)
            } else {
                (mapping.parent_item_id.clone(), StructureRelation::Parent)
            };

            let linked_item = counterparts
                .iter()
                .find(|i| i.id == linked_id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound(format!("Item {linked_id} not found")))?;

            neighbors.push(StructureNeighbor {
                mapping_id: mapping.id,
                linked_item: linked_item.into(),
                relation,
                created_at: mapping.created_at,
            });
        }

        Ok(neighbors)
    }
}

/// True when an active mapping exists between the two items, in either
/// direction.
async fn active_link_exists<C: ConnectionTrait>(
    conn: &C,
    a: &str,
    b: &str,
) -> Result<bool, ServiceError> {
    let existing = structure_mapping::Entity::find()
        .filter(
            structure_mapping::Column::ParentItemId
                .eq(a)
                .and(structure_mapping::Column::ChildItemId.eq(b))
                .or(structure_mapping::Column::ParentItemId
                    .eq(b)
                    .and(structure_mapping::Column::ChildItemId.eq(a))),
        )
        .filter(structure_mapping::Column::IsActive.eq(true))
        .one(conn)
        .await?;

    Ok(existing.is_some())
}

fn build_response(
    mapping: structure_mapping::Model,
    parent: item::Model,
    child: item::Model,
) -> StructureMappingResponse {
    StructureMappingResponse {
        id: mapping.id,
        parent_item: parent.into(),
        child_item: child.into(),
        is_active: mapping.is_active,
        created_at: mapping.created_at,
        created_by: mapping.created_by,
        deactivated_at: mapping.deactivated_at,
        deactivated_by: mapping.deactivated_by,
    }
}
