use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Custody record: an item signed out into someone's toolbook.
///
/// At most one row per item may have `is_active = true`. Custody and room
/// placement are tracked independently; an item may hold one of each.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "toolbook_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: String,
    pub toolbook_id: Uuid,
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
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::toolbook::Entity",
        from = "Column::ToolbookId",
        to = "super::toolbook::Column::Id"
    )]
    Toolbook,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::toolbook::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Toolbook.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
