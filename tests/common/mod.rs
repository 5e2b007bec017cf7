//! Shared helpers for the integration suites: an isolated in-memory SQLite
//! database with the full schema applied, plus seed data builders.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectOptions, Database, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use assettrack_api::db::DbPool;
use assettrack_api::entities::{item_place, model, room, toolbook, toolbook_item, user};
use assettrack_api::migrator::Migrator;

/// Fresh in-memory database with the schema applied. A single pooled
/// connection keeps the memory database alive and isolated per test.
pub async fn setup_db() -> Arc<DbPool> {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("Failed to connect to in-memory SQLite");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Arc::new(db)
}

pub async fn seed_user(db: &DbPool, name: &str) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        external_id: Set(Uuid::new_v4().to_string()),
        last_login: Set(Some(Utc::now())),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

pub async fn seed_model(db: &DbPool, brand: &str, name: &str) -> model::Model {
    model::ActiveModel {
        id: Set(Uuid::new_v4()),
        brand: Set(brand.to_string()),
        name: Set(name.to_string()),
        category: Set("notebook".to_string()),
    }
    .insert(db)
    .await
    .expect("Failed to seed model")
}

pub async fn seed_room(db: &DbPool, description: &str) -> room::Model {
    room::ActiveModel {
        id: Set(Uuid::new_v4()),
        description: Set(description.to_string()),
    }
    .insert(db)
    .await
    .expect("Failed to seed room")
}

pub async fn seed_toolbook(db: &DbPool, user_id: Uuid) -> toolbook::Model {
    toolbook::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
    }
    .insert(db)
    .await
    .expect("Failed to seed toolbook")
}

/// All placements for an item with `is_active = true`.
pub async fn active_placements(db: &DbPool, item_id: &str) -> Vec<item_place::Model> {
    item_place::Entity::find()
        .filter(item_place::Column::ItemId.eq(item_id))
        .filter(item_place::Column::IsActive.eq(true))
        .all(db)
        .await
        .expect("Failed to query placements")
}

/// All custody records for an item with `is_active = true`.
pub async fn active_custody(db: &DbPool, item_id: &str) -> Vec<toolbook_item::Model> {
    toolbook_item::Entity::find()
        .filter(toolbook_item::Column::ItemId.eq(item_id))
        .filter(toolbook_item::Column::IsActive.eq(true))
        .all(db)
        .await
        .expect("Failed to query custody records")
}
