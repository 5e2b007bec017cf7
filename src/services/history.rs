//! Per-item history reconstruction.
//!
//! Read-side projection over the ledger and workflow tables: every lifecycle
//! event an item has ever seen, flattened into one time-ordered list. Actor
//! and location names are resolved here so callers receive ready-to-render
//! strings.

use crate::{
    db::DbPool,
    entities::{
        cabinet, inventory, inventory_item, item, item_metadata, item_place, move_request, room,
        scrappage, structure_mapping, toolbook, toolbook_item, user,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// One rendered history entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEvent {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

const UNKNOWN: &str = "unknown";

/// Read-only aggregator; owns no state beyond the shared pool.
#[derive(Clone)]
pub struct HistoryService {
    db_pool: Arc<DbPool>,
}

impl HistoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Gathers every recorded event for an item and returns them ordered by
    /// timestamp (stable: sources sharing a timestamp keep insertion order).
    /// An item with no recorded events yields an empty list.
    #[instrument(skip(self))]
    pub async fn build_history(&self, item_id: &str) -> Result<Vec<HistoryEvent>, ServiceError> {
        let db = &*self.db_pool;

        if item::Entity::find_by_id(item_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Item {item_id} not found")));
        }

        let (places, moves, custody, sightings, metadata, structure, scrappages) = tokio::try_join!(
            item_place::Entity::find()
                .filter(item_place::Column::ItemId.eq(item_id))
                .all(db),
            move_request::Entity::find()
                .filter(move_request::Column::ItemId.eq(item_id))
                .all(db),
            toolbook_item::Entity::find()
                .filter(toolbook_item::Column::ItemId.eq(item_id))
                .all(db),
            inventory_item::Entity::find()
                .filter(inventory_item::Column::ItemId.eq(item_id))
                .all(db),
            item_metadata::Entity::find()
                .filter(item_metadata::Column::ItemId.eq(item_id))
                .all(db),
            structure_mapping::Entity::find().filter(
                structure_mapping::Column::ParentItemId
                    .eq(item_id)
                    .or(structure_mapping::Column::ChildItemId.eq(item_id)),
            )
            .all(db),
            scrappage::Entity::find()
                .filter(scrappage::Column::ItemId.eq(item_id))
                .all(db),
        )?;

        // Name resolution happens here, in one batched pass per table.
        let mut user_ids: HashSet<Uuid> = HashSet::new();
        let mut room_ids: HashSet<Uuid> = HashSet::new();
        let mut cabinet_ids: HashSet<Uuid> = HashSet::new();
        let mut inventory_ids: HashSet<Uuid> = HashSet::new();
        let mut counterpart_ids: HashSet<String> = HashSet::new();

        for place in &places {
            user_ids.insert(place.created_by);
            room_ids.extend(place.room_id);
            cabinet_ids.extend(place.cabinet_id);
        }
        for mv in &moves {
            user_ids.insert(mv.created_by);
            user_ids.extend(mv.closed_by);
            room_ids.extend(mv.from_room_id);
            room_ids.extend(mv.to_room_id);
        }
        for record in &custody {
            user_ids.insert(record.created_by);
        }
        for sighting in &sightings {
            user_ids.insert(sighting.created_by);
            inventory_ids.insert(sighting.inventory_id);
        }
        for note in &metadata {
            user_ids.insert(note.modified_by);
        }
        for mapping in &structure {
            user_ids.insert(mapping.created_by);
            if mapping.parent_item_id == item_id {
                counterpart_ids.insert(mapping.child_item_id.clone());
            } else {
                counterpart_ids.insert(mapping.parent_item_id.clone());
            }
        }
        for scrap in &scrappages {
            user_ids.insert(scrap.created_by);
            user_ids.extend(scrap.closed_by);
        }

        let toolbooks = toolbook::Entity::find()
            .filter(
                toolbook::Column::Id.is_in(custody.iter().map(|c| c.toolbook_id).collect::<Vec<_>>()),
            )
            .all(db)
            .await?;
        user_ids.extend(toolbooks.iter().map(|tb| tb.user_id));

        let (users, rooms, cabinets, inventories, counterparts) = tokio::try_join!(
            user::Entity::find()
                .filter(user::Column::Id.is_in(user_ids.into_iter().collect::<Vec<_>>()))
                .all(db),
            room::Entity::find()
                .filter(room::Column::Id.is_in(room_ids.into_iter().collect::<Vec<_>>()))
                .all(db),
            cabinet::Entity::find()
                .filter(cabinet::Column::Id.is_in(cabinet_ids.into_iter().collect::<Vec<_>>()))
                .all(db),
            inventory::Entity::find()
                .filter(inventory::Column::Id.is_in(inventory_ids.into_iter().collect::<Vec<_>>()))
                .all(db),
            item::Entity::find()
                .filter(item::Column::Id.is_in(counterpart_ids.into_iter().collect::<Vec<_>>()))
                .all(db),
        )?;

        let user_names: HashMap<Uuid, String> =
            users.into_iter().map(|u| (u.id, u.name)).collect();
        let room_descs: HashMap<Uuid, String> =
            rooms.into_iter().map(|r| (r.id, r.description)).collect();
        let cabinet_descs: HashMap<Uuid, String> = cabinets
            .into_iter()
            .map(|c| (c.id, c.description))
            .collect();
        let inventory_descs: HashMap<Uuid, String> = inventories
            .into_iter()
            .map(|i| (i.id, i.description))
            .collect();
        let item_descs: HashMap<String, String> = counterparts
            .into_iter()
            .map(|i| (i.id, i.description))
            .collect();
        let toolbook_owners: HashMap<Uuid, String> = toolbooks
            .into_iter()
            .map(|tb| {
                let owner = user_names
                    .get(&tb.user_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN.to_string());
                (tb.id, owner)
            })
            .collect();

        let name_of = |id: Uuid| {
            user_names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        let mut events: Vec<HistoryEvent> = Vec::new();

        // 1. Intake: every placement marks an arrival
        for place in &places {
            let location = if let Some(cabinet_id) = place.cabinet_id {
                format!(
                    "Cabinet: {}",
                    cabinet_descs
                        .get(&cabinet_id)
                        .map(String::as_str)
                        .unwrap_or(UNKNOWN)
                )
            } else {
                format!(
                    "Room: {}",
                    place
                        .room_id
                        .and_then(|id| room_descs.get(&id))
                        .map(String::as_str)
                        .unwrap_or(UNKNOWN)
                )
            };
            events.push(HistoryEvent {
                status: "Added to inventory".to_string(),
                timestamp: place.created_at,
                details: format!("Recorded by {}, {}", name_of(place.created_by), location),
            });
        }

        // 2. Moves
        for mv in &moves {
            let from = mv
                .from_room_id
                .and_then(|id| room_descs.get(&id))
                .map(String::as_str)
                .unwrap_or("Toolbook");
            let to = mv
                .to_room_id
                .and_then(|id| room_descs.get(&id))
                .map(String::as_str)
                .unwrap_or("Toolbook");

            events.push(HistoryEvent {
                status: if mv.is_finished {
                    "Move finished".to_string()
                } else {
                    "Move started".to_string()
                },
                timestamp: mv.created_at,
                details: format!(
                    "Requested by {}, {} to {}",
                    name_of(mv.created_by),
                    from,
                    to
                ),
            });

            if let (Some(closed_at), Some(closed_by)) = (mv.closed_at, mv.closed_by) {
                events.push(HistoryEvent {
                    status: "Move closed".to_string(),
                    timestamp: closed_at,
                    details: format!("Closed by {}", name_of(closed_by)),
                });
            }
        }

        // 3. Custody
        for record in &custody {
            let owner = toolbook_owners
                .get(&record.toolbook_id)
                .map(String::as_str)
                .unwrap_or(UNKNOWN);
            events.push(HistoryEvent {
                status: "Taken into toolbook".to_string(),
                timestamp: record.created_at,
                details: format!(
                    "Recorded by {}, toolbook of {}",
                    name_of(record.created_by),
                    owner
                ),
            });
        }

        // 4. Stock-takes
        for sighting in &sightings {
            let campaign = inventory_descs
                .get(&sighting.inventory_id)
                .map(String::as_str)
                .unwrap_or(UNKNOWN);
            events.push(HistoryEvent {
                status: "Stock-take".to_string(),
                timestamp: sighting.created_at,
                details: format!("Counted by {} ({})", name_of(sighting.created_by), campaign),
            });
        }

        // 5. Metadata edits
        for note in &metadata {
            events.push(HistoryEvent {
                status: "Metadata updated".to_string(),
                timestamp: note.modified_at,
                details: format!(
                    "Modified by {}, notes: {}",
                    name_of(note.modified_by),
                    note.notes
                ),
            });
        }

        // 6. Structure links: a broken link reports at its deactivation time
        for mapping in &structure {
            let (role, counterpart_id) = if mapping.parent_item_id == item_id {
                ("As parent", &mapping.child_item_id)
            } else {
                ("As child", &mapping.parent_item_id)
            };
            let counterpart = item_descs
                .get(counterpart_id)
                .map(String::as_str)
                .unwrap_or(UNKNOWN);

            events.push(HistoryEvent {
                status: if mapping.deactivated_at.is_some() {
                    "Structure link broken".to_string()
                } else {
                    "Structure link created".to_string()
                },
                timestamp: mapping.deactivated_at.unwrap_or(mapping.created_at),
                details: format!(
                    "{}: {}, linked by {}",
                    role,
                    counterpart,
                    name_of(mapping.created_by)
                ),
            });
        }

        // 7. Scrappages
        for scrap in &scrappages {
            events.push(HistoryEvent {
                status: if scrap.is_finished {
                    "Scrap finished".to_string()
                } else {
                    "Scrap started".to_string()
                },
                timestamp: scrap.created_at,
                details: format!(
                    "Started by {}, {}",
                    name_of(scrap.created_by),
                    scrap.description.as_deref().unwrap_or("Scrappage")
                ),
            });

            if let (Some(closed_at), Some(closed_by)) = (scrap.closed_at, scrap.closed_by) {
                events.push(HistoryEvent {
                    status: "Scrap closed".to_string(),
                    timestamp: closed_at,
                    details: format!("Closed by {}", name_of(closed_by)),
                });
            }
        }

        sort_events(&mut events);
        Ok(events)
    }
}

/// Ascending by timestamp; stable so same-instant events keep source order.
fn sort_events(events: &mut [HistoryEvent]) {
    events.sort_by_key(|e| e.timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(status: &str, secs: i64) -> HistoryEvent {
        HistoryEvent {
            status: status.to_string(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            details: String::new(),
        }
    }

    #[test]
    fn sorts_ascending_by_timestamp() {
        let mut events = vec![event("c", 30), event("a", 10), event("b", 20)];
        sort_events(&mut events);
        let order: Vec<&str> = events.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let mut events = vec![
            event("first", 10),
            event("second", 10),
            event("third", 10),
        ];
        sort_events(&mut events);
        let order: Vec<&str> = events.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_input_stays_empty() {
        let mut events: Vec<HistoryEvent> = Vec::new();
        sort_events(&mut events);
        assert!(events.is_empty());
    }
}
