//! Asset ledger primitives.
//!
//! Maintains placement, custody and structure-link state for items and owns
//! the "at most one active record per item" invariants. Every function is
//! generic over [`ConnectionTrait`] so workflows can compose them inside an
//! open transaction; none of them commits anything on its own.
//!
//! Creation helpers do NOT deactivate prior records. Call the matching
//! `deactivate_*` first; the ordering is the calling workflow's contract.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{item_place, structure_mapping, toolbook_item};
use crate::errors::ServiceError;

/// Soft-deactivates every active placement of an item, optionally scoped to
/// one room. Zero matches is a no-op. Returns the number of rows touched.
pub async fn deactivate_active_placements<C: ConnectionTrait>(
    conn: &C,
    item_id: &str,
    room_scope: Option<Uuid>,
    actor_id: Uuid,
) -> Result<u64, ServiceError> {
    let mut query = item_place::Entity::find()
        .filter(item_place::Column::ItemId.eq(item_id))
        .filter(item_place::Column::IsActive.eq(true));

    if let Some(room_id) = room_scope {
        query = query.filter(item_place::Column::RoomId.eq(room_id));
    }

    let rows = query.all(conn).await?;
    let count = rows.len() as u64;
    let now = Utc::now();

    for row in rows {
        let mut active: item_place::ActiveModel = row.into();
        active.is_active = Set(false);
        active.deactivated_at = Set(Some(now));
        active.deactivated_by = Set(Some(actor_id));
        active.update(conn).await?;
    }

    debug!(item_id, count, "deactivated placements");
    Ok(count)
}

/// Inserts a new active placement for an item in the given room.
pub async fn create_placement<C: ConnectionTrait>(
    conn: &C,
    item_id: &str,
    room_id: Uuid,
    actor_id: Uuid,
) -> Result<item_place::Model, ServiceError> {
    let place = item_place::ActiveModel {
        id: Set(Uuid::new_v4()),
        item_id: Set(item_id.to_string()),
        room_id: Set(Some(room_id)),
        cabinet_id: Set(None),
        is_stored: Set(true),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        created_by: Set(actor_id),
        deactivated_at: Set(None),
        deactivated_by: Set(None),
    };

    Ok(place.insert(conn).await?)
}

/// Soft-deactivates every active custody record of an item, optionally
/// scoped to one toolbook. Returns the number of rows touched.
pub async fn deactivate_active_custody<C: ConnectionTrait>(
    conn: &C,
    item_id: &str,
    toolbook_scope: Option<Uuid>,
    actor_id: Uuid,
) -> Result<u64, ServiceError> {
    let mut query = toolbook_item::Entity::find()
        .filter(toolbook_item::Column::ItemId.eq(item_id))
        .filter(toolbook_item::Column::IsActive.eq(true));

    if let Some(toolbook_id) = toolbook_scope {
        query = query.filter(toolbook_item::Column::ToolbookId.eq(toolbook_id));
    }

    let rows = query.all(conn).await?;
    let count = rows.len() as u64;
    let now = Utc::now();

    for row in rows {
        let mut active: toolbook_item::ActiveModel = row.into();
        active.is_active = Set(false);
        active.deactivated_at = Set(Some(now));
        active.deactivated_by = Set(Some(actor_id));
        active.update(conn).await?;
    }

    debug!(item_id, count, "deactivated custody records");
    Ok(count)
}

/// Inserts a new active custody record for an item in the given toolbook.
pub async fn create_custody<C: ConnectionTrait>(
    conn: &C,
    item_id: &str,
    toolbook_id: Uuid,
    actor_id: Uuid,
) -> Result<toolbook_item::Model, ServiceError> {
    let custody = toolbook_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        item_id: Set(item_id.to_string()),
        toolbook_id: Set(toolbook_id),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        created_by: Set(actor_id),
        deactivated_at: Set(None),
        deactivated_by: Set(None),
    };

    Ok(custody.insert(conn).await?)
}

/// Soft-deactivates every active structure mapping touching an item, on
/// either end. Returns the number of rows touched.
pub async fn deactivate_structure_links<C: ConnectionTrait>(
    conn: &C,
    item_id: &str,
    actor_id: Uuid,
) -> Result<u64, ServiceError> {
    let rows = structure_mapping::Entity::find()
        .filter(
            structure_mapping::Column::ParentItemId
                .eq(item_id)
                .or(structure_mapping::Column::ChildItemId.eq(item_id)),
        )
        .filter(structure_mapping::Column::IsActive.eq(true))
        .all(conn)
        .await?;

    let count = rows.len() as u64;
    let now = Utc::now();

    for row in rows {
        let mut active: structure_mapping::ActiveModel = row.into();
        active.is_active = Set(false);
        active.deactivated_at = Set(Some(now));
        active.deactivated_by = Set(Some(actor_id));
        active.update(conn).await?;
    }

    debug!(item_id, count, "deactivated structure links");
    Ok(count)
}
