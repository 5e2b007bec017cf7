//! Scrap workflow end-to-end: request, approve (full retirement), reject,
//! and the end-to-end lifecycle scenario from registration to scrapping.

mod common;

use assert_matches::assert_matches;
use common::{active_custody, active_placements, seed_model, seed_room, seed_toolbook, seed_user, setup_db};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use assettrack_api::entities::structure_mapping;
use assettrack_api::errors::ServiceError;
use assettrack_api::services::items::{CreateItemRequest, ItemService, ItemStatus};
use assettrack_api::services::ledger;
use assettrack_api::services::moves::{CreateMoveRequest, MoveService};
use assettrack_api::services::scrappages::{CreateScrappageRequest, ScrappageService};
use assettrack_api::services::structure::{CreateStructureLinkRequest, StructureService};

async fn seed_item(items: &ItemService, id: &str, model_id: uuid::Uuid, room_id: Option<uuid::Uuid>, actor: uuid::Uuid) {
    items
        .create_item(
            CreateItemRequest {
                id: id.into(),
                eid: None,
                description: format!("Item {id}"),
                model_id,
                serial_number: None,
                room_id,
            },
            actor,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn request_with_empty_item_id_is_rejected() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Scrapper One").await;

    let scrappages = ScrappageService::new(db.clone(), None);

    let err = scrappages
        .request_scrap(
            CreateScrappageRequest {
                item_id: String::new(),
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn request_is_inert_until_approved() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Scrapper One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room = seed_room(&db, "Office 3").await;

    let items = ItemService::new(db.clone(), None);
    let scrappages = ScrappageService::new(db.clone(), None);

    seed_item(&items, "S-100", model.id, Some(room.id), actor.id).await;

    let created = scrappages
        .request_scrap(
            CreateScrappageRequest {
                item_id: "S-100".into(),
                description: Some("water damage".into()),
            },
            actor.id,
        )
        .await
        .unwrap();

    assert!(!created.is_finished);
    // Nothing retired yet
    assert_eq!(active_placements(&db, "S-100").await.len(), 1);
    assert_eq!(
        items.get_item("S-100").await.unwrap().status,
        ItemStatus::New
    );
}

#[tokio::test]
async fn approving_a_scrap_retires_the_item_completely() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Scrapper One").await;
    let holder = seed_user(&db, "Holder Two").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room = seed_room(&db, "Office 3").await;
    let toolbook = seed_toolbook(&db, holder.id).await;

    let items = ItemService::new(db.clone(), None);
    let structure = StructureService::new(db.clone(), None);
    let scrappages = ScrappageService::new(db.clone(), None);

    seed_item(&items, "S-101", model.id, Some(room.id), actor.id).await;
    seed_item(&items, "S-102", model.id, None, actor.id).await;

    // Give the item custody and a structure link on top of its placement
    ledger::create_custody(db.as_ref(), "S-101", toolbook.id, actor.id)
        .await
        .unwrap();
    structure
        .create_link(
            CreateStructureLinkRequest {
                parent_item_id: "S-101".into(),
                child_item_id: "S-102".into(),
            },
            actor.id,
        )
        .await
        .unwrap();

    let created = scrappages
        .request_scrap(
            CreateScrappageRequest {
                item_id: "S-101".into(),
                description: Some("end of life".into()),
            },
            actor.id,
        )
        .await
        .unwrap();
    let approved = scrappages.approve_scrap(created.id, actor.id).await.unwrap();

    assert!(approved.is_finished);
    assert_eq!(approved.closed_by, Some(actor.id));

    assert_eq!(
        items.get_item("S-101").await.unwrap().status,
        ItemStatus::Scrapped
    );
    assert!(active_placements(&db, "S-101").await.is_empty());
    assert!(active_custody(&db, "S-101").await.is_empty());

    let active_links = structure_mapping::Entity::find()
        .filter(structure_mapping::Column::IsActive.eq(true))
        .all(db.as_ref())
        .await
        .unwrap();
    assert!(active_links.is_empty(), "scrap approval breaks structure links");
}

#[tokio::test]
async fn rejecting_a_scrap_changes_nothing_but_the_request() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Scrapper One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room = seed_room(&db, "Office 3").await;

    let items = ItemService::new(db.clone(), None);
    let scrappages = ScrappageService::new(db.clone(), None);

    seed_item(&items, "S-103", model.id, Some(room.id), actor.id).await;

    let created = scrappages
        .request_scrap(
            CreateScrappageRequest {
                item_id: "S-103".into(),
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap();
    let rejected = scrappages.reject_scrap(created.id, actor.id).await.unwrap();

    assert!(rejected.is_finished);
    assert_eq!(active_placements(&db, "S-103").await.len(), 1);
    assert_eq!(
        items.get_item("S-103").await.unwrap().status,
        ItemStatus::New
    );
}

#[tokio::test]
async fn finished_scrappages_accept_no_further_transitions() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Scrapper One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;

    let items = ItemService::new(db.clone(), None);
    let scrappages = ScrappageService::new(db.clone(), None);

    seed_item(&items, "S-104", model.id, None, actor.id).await;

    let created = scrappages
        .request_scrap(
            CreateScrappageRequest {
                item_id: "S-104".into(),
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap();
    scrappages.approve_scrap(created.id, actor.id).await.unwrap();

    let err = scrappages.approve_scrap(created.id, actor.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
    let err = scrappages.reject_scrap(created.id, actor.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn full_lifecycle_from_registration_to_scrap() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Lifecycle Admin").await;
    let model = seed_model(&db, "Lenovo", "ThinkPad T14").await;
    let room = seed_room(&db, "R1").await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);
    let scrappages = ScrappageService::new(db.clone(), None);

    // Registered with no placement, status new
    seed_item(&items, "A1", model.id, None, actor.id).await;
    assert_eq!(items.get_item("A1").await.unwrap().status, ItemStatus::New);

    // Move into R1 and approve: active, one placement
    let mv = moves
        .request_move(
            CreateMoveRequest {
                item_id: "A1".into(),
                from_room_id: None,
                from_toolbook_id: None,
                to_room_id: Some(room.id),
                to_toolbook_id: None,
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap();
    moves.approve_move(mv.id, actor.id).await.unwrap();

    assert_eq!(items.get_item("A1").await.unwrap().status, ItemStatus::Active);
    let placements = active_placements(&db, "A1").await;
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].room_id, Some(room.id));

    // Scrap and approve: terminal status, no active placement
    let scrap = scrappages
        .request_scrap(
            CreateScrappageRequest {
                item_id: "A1".into(),
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap();
    scrappages.approve_scrap(scrap.id, actor.id).await.unwrap();

    assert_eq!(
        items.get_item("A1").await.unwrap().status,
        ItemStatus::Scrapped
    );
    assert!(active_placements(&db, "A1").await.is_empty());
}
