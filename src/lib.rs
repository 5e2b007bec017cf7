//! AssetTrack API Library
//!
//! This crate provides the core functionality for the AssetTrack API:
//! item lifecycle, move/scrap approval workflows, custody toolbooks,
//! structure links and per-item history.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::consts as perm;
use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// API routes, grouped per resource with permission gating
pub fn api_v1_routes() -> Router<AppState> {
    let items_read = Router::new()
        .route("/items", get(handlers::items::list_items))
        .route("/items/:id", get(handlers::items::get_item))
        .route("/items/:id/location", get(handlers::items::get_item_location))
        .route("/items/:id/history", get(handlers::items::get_item_history))
        .route(
            "/items/:id/structure",
            get(handlers::items::get_item_structure),
        )
        .route("/rooms", get(handlers::catalog::list_rooms))
        .route("/cabinets", get(handlers::catalog::list_cabinets))
        .route("/models", get(handlers::catalog::list_models))
        .route("/toolbooks", get(handlers::toolbooks::list_toolbooks))
        .route("/toolbooks/:id", get(handlers::toolbooks::get_toolbook))
        .with_permission(perm::ITEMS_READ);

    let items_create = Router::new()
        .route("/items", axum::routing::post(handlers::items::create_item))
        .with_permission(perm::ITEMS_CREATE);

    let items_update = Router::new()
        .route(
            "/items/:id/metadata",
            axum::routing::post(handlers::items::add_item_metadata),
        )
        .with_permission(perm::ITEMS_UPDATE);

    let moves_read = Router::new()
        .route("/moves", get(handlers::moves::list_moves))
        .route("/moves/:id", get(handlers::moves::get_move))
        .with_permission(perm::MOVES_READ);

    let moves_create = Router::new()
        .route("/moves", axum::routing::post(handlers::moves::create_move))
        .route(
            "/moves/bulk",
            axum::routing::post(handlers::moves::create_bulk_move),
        )
        .with_permission(perm::MOVES_CREATE);

    let moves_approve = Router::new()
        .route(
            "/moves/:id/approve",
            axum::routing::post(handlers::moves::approve_move),
        )
        .route(
            "/moves/:id/reject",
            axum::routing::post(handlers::moves::reject_move),
        )
        .with_permission(perm::MOVES_APPROVE);

    let scrappages_read = Router::new()
        .route("/scrappages", get(handlers::scrappages::list_scrappages))
        .route("/scrappages/:id", get(handlers::scrappages::get_scrappage))
        .with_permission(perm::SCRAPPAGES_READ);

    let scrappages_create = Router::new()
        .route(
            "/scrappages",
            axum::routing::post(handlers::scrappages::create_scrappage),
        )
        .with_permission(perm::SCRAPPAGES_CREATE);

    let scrappages_approve = Router::new()
        .route(
            "/scrappages/:id/approve",
            axum::routing::post(handlers::scrappages::approve_scrappage),
        )
        .route(
            "/scrappages/:id/reject",
            axum::routing::post(handlers::scrappages::reject_scrappage),
        )
        .with_permission(perm::SCRAPPAGES_APPROVE);

    let structure_create = Router::new()
        .route(
            "/structure-mappings",
            axum::routing::post(handlers::structure::create_structure_mapping),
        )
        .with_permission(perm::STRUCTURE_CREATE);

    let structure_delete = Router::new()
        .route(
            "/structure-mappings/:id",
            axum::routing::delete(handlers::structure::deactivate_structure_mapping),
        )
        .with_permission(perm::STRUCTURE_DELETE);

    let rooms_manage = Router::new()
        .route("/rooms", axum::routing::post(handlers::catalog::create_room))
        .with_permission(perm::ROOMS_MANAGE);

    let cabinets_manage = Router::new()
        .route(
            "/cabinets",
            axum::routing::post(handlers::catalog::create_cabinet),
        )
        .with_permission(perm::CABINETS_MANAGE);

    let models_manage = Router::new()
        .route(
            "/models",
            axum::routing::post(handlers::catalog::create_model),
        )
        .with_permission(perm::MODELS_MANAGE);

    let toolbooks_manage = Router::new()
        .route(
            "/toolbooks",
            axum::routing::post(handlers::toolbooks::create_toolbook),
        )
        .with_permission(perm::TOOLBOOKS_MANAGE);

    let inventories_read = Router::new()
        .route("/inventories", get(handlers::inventories::list_inventories))
        .route(
            "/inventories/:id/sightings",
            get(handlers::inventories::list_sightings),
        )
        .with_permission(perm::INVENTORIES_READ);

    let inventories_create = Router::new()
        .route(
            "/inventories",
            axum::routing::post(handlers::inventories::create_inventory),
        )
        .route(
            "/inventories/:id/sightings",
            axum::routing::post(handlers::inventories::record_sighting),
        )
        .with_permission(perm::INVENTORIES_CREATE);

    let roles_manage = Router::new()
        .route("/roles", get(handlers::roles::list_roles))
        .route("/roles", axum::routing::post(handlers::roles::create_role))
        .route(
            "/roles/:id/permissions",
            axum::routing::put(handlers::roles::replace_role_permissions),
        )
        .route("/users", get(handlers::roles::list_users))
        .route("/users", axum::routing::post(handlers::roles::upsert_user))
        .with_permission(perm::ROLES_MANAGE);

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Items
        .merge(items_read)
        .merge(items_create)
        .merge(items_update)
        // Move workflow
        .merge(moves_read)
        .merge(moves_create)
        .merge(moves_approve)
        // Scrap workflow
        .merge(scrappages_read)
        .merge(scrappages_create)
        .merge(scrappages_approve)
        // Structure links
        .merge(structure_create)
        .merge(structure_delete)
        // Facility and catalog
        .merge(rooms_manage)
        .merge(cabinets_manage)
        .merge(models_manage)
        .merge(toolbooks_manage)
        // Stock-takes
        .merge(inventories_read)
        .merge(inventories_create)
        // Administration
        .merge(roles_manage)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "assettrack-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
