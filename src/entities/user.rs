use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An operator account. Rows are provisioned on first sign-in from the
/// external identity provider; the service itself never authenticates.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Subject identifier asserted by the identity provider
    pub external_id: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::toolbook::Entity")]
    Toolbooks,
}

impl Related<super::toolbook::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Toolbooks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
