use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A relocation request. Inert until approved; terminal once `is_finished`
/// is set (by approval or rejection).
///
/// Sources and destinations are all optional, but the workflow requires at
/// least one destination at creation time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moves")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::FromRoomId",
        to = "super::room::Column::Id"
    )]
    FromRoom,
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::ToRoomId",
        to = "super::room::Column::Id"
    )]
    ToRoom,
    #[sea_orm(
        belongs_to = "super::toolbook::Entity",
        from = "Column::FromToolbookId",
        to = "super::toolbook::Column::Id"
    )]
    FromToolbook,
    #[sea_orm(
        belongs_to = "super::toolbook::Entity",
        from = "Column::ToToolbookId",
        to = "super::toolbook::Column::Id"
    )]
    ToToolbook,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
