use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A tracked physical asset. The primary key is the externally assigned
/// asset tag, not a surrogate id.
///
/// `status` holds one of "new", "active" or "scrapped"; transitions are owned
/// by the move/scrap workflows and "scrapped" is terminal.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[validate(length(min = 1, max = 64, message = "Asset tag must be between 1 and 64 characters"))]
    pub id: String,

    /// Optional secondary equipment tag
    pub eid: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub description: String,

    pub model_id: Uuid,
    pub serial_number: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::model::Entity",
        from = "Column::ModelId",
        to = "super::model::Column::Id"
    )]
    Model,
    #[sea_orm(has_many = "super::item_place::Entity")]
    Places,
    #[sea_orm(has_many = "super::toolbook_item::Entity")]
    ToolbookItems,
}

impl Related<super::model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Model.def()
    }
}

impl Related<super::item_place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Places.def()
    }
}

impl Related<super::toolbook_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ToolbookItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
