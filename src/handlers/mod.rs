//! HTTP handlers, one module per resource.

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    catalog::CatalogService, history::HistoryService, inventories::InventoryService,
    items::ItemService, moves::MoveService, roles::RoleService, scrappages::ScrappageService,
    structure::StructureService, toolbooks::ToolbookService, users::UserService,
};

pub mod catalog;
pub mod inventories;
pub mod items;
pub mod moves;
pub mod roles;
pub mod scrappages;
pub mod structure;
pub mod toolbooks;

/// Aggregated services handed to HTTP handlers through [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub items: Arc<ItemService>,
    pub moves: Arc<MoveService>,
    pub scrappages: Arc<ScrappageService>,
    pub structure: Arc<StructureService>,
    pub history: Arc<HistoryService>,
    pub catalog: Arc<CatalogService>,
    pub toolbooks: Arc<ToolbookService>,
    pub inventories: Arc<InventoryService>,
    pub users: Arc<UserService>,
    pub roles: Arc<RoleService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            items: Arc::new(ItemService::new(db.clone(), Some(event_sender.clone()))),
            moves: Arc::new(MoveService::new(db.clone(), Some(event_sender.clone()))),
            scrappages: Arc::new(ScrappageService::new(db.clone(), Some(event_sender.clone()))),
            structure: Arc::new(StructureService::new(db.clone(), Some(event_sender.clone()))),
            history: Arc::new(HistoryService::new(db.clone())),
            catalog: Arc::new(CatalogService::new(db.clone())),
            toolbooks: Arc::new(ToolbookService::new(db.clone())),
            inventories: Arc::new(InventoryService::new(db.clone(), Some(event_sender))),
            users: Arc::new(UserService::new(db.clone())),
            roles: Arc::new(RoleService::new(db)),
        }
    }
}
