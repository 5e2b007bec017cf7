use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed parent/child link between two items (e.g. a monitor attached to
/// a desktop). Soft-deactivated like placements; at most one active mapping
/// may exist per item pair in either direction, and self-links are rejected.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "structure_mappings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub parent_item_id: String,
    pub child_item_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivated_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ParentItemId",
        to = "super::item::Column::Id"
    )]
    ParentItem,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ChildItemId",
        to = "super::item::Column::Id"
    )]
    ChildItem,
}

impl ActiveModelBehavior for ActiveModel {}
