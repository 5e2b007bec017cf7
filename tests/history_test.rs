//! History aggregation: empty timelines, full lifecycle timelines, ordering,
//! and actor/location name resolution.

mod common;

use assert_matches::assert_matches;
use common::{seed_model, seed_room, seed_toolbook, seed_user, setup_db};

use assettrack_api::errors::ServiceError;
use assettrack_api::services::history::HistoryService;
use assettrack_api::services::inventories::{CreateInventoryRequest, InventoryService, RecordSightingRequest};
use assettrack_api::services::items::{AddMetadataRequest, CreateItemRequest, ItemService};
use assettrack_api::services::moves::{CreateMoveRequest, MoveService};
use assettrack_api::services::scrappages::{CreateScrappageRequest, ScrappageService};
use assettrack_api::services::structure::{CreateStructureLinkRequest, StructureService};

#[tokio::test]
async fn unknown_item_is_not_found() {
    let db = setup_db().await;
    let history = HistoryService::new(db.clone());

    let err = history.build_history("GHOST-1").await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn item_without_events_has_an_empty_timeline() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Historian One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;

    let items = ItemService::new(db.clone(), None);
    let history = HistoryService::new(db.clone());

    items
        .create_item(
            CreateItemRequest {
                id: "H-100".into(),
                eid: None,
                description: "Laptop".into(),
                model_id: model.id,
                serial_number: None,
                room_id: None,
            },
            actor.id,
        )
        .await
        .unwrap();

    let events = history.build_history("H-100").await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn full_lifecycle_produces_an_ordered_timeline() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Historian One").await;
    let holder = seed_user(&db, "Holder Two").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room_a = seed_room(&db, "Room A").await;
    let room_b = seed_room(&db, "Room B").await;
    let toolbook = seed_toolbook(&db, holder.id).await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);
    let scrappages = ScrappageService::new(db.clone(), None);
    let structure = StructureService::new(db.clone(), None);
    let inventories = InventoryService::new(db.clone(), None);
    let history = HistoryService::new(db.clone());

    // Intake with placement
    items
        .create_item(
            CreateItemRequest {
                id: "H-101".into(),
                eid: None,
                description: "Laptop".into(),
                model_id: model.id,
                serial_number: None,
                room_id: Some(room_a.id),
            },
            actor.id,
        )
        .await
        .unwrap();
    items
        .create_item(
            CreateItemRequest {
                id: "H-102".into(),
                eid: None,
                description: "Docking station".into(),
                model_id: model.id,
                serial_number: None,
                room_id: None,
            },
            actor.id,
        )
        .await
        .unwrap();

    // Move A -> B, approved; custody move to a toolbook, approved
    let mv = moves
        .request_move(
            CreateMoveRequest {
                item_id: "H-101".into(),
                from_room_id: Some(room_a.id),
                from_toolbook_id: None,
                to_room_id: Some(room_b.id),
                to_toolbook_id: None,
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap();
    moves.approve_move(mv.id, actor.id).await.unwrap();

    let custody_mv = moves
        .request_move(
            CreateMoveRequest {
                item_id: "H-101".into(),
                from_room_id: Some(room_b.id),
                from_toolbook_id: None,
                to_room_id: None,
                to_toolbook_id: Some(toolbook.id),
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap();
    moves.approve_move(custody_mv.id, actor.id).await.unwrap();

    // Structure link, stock-take sighting, metadata note
    let linked = structure
        .create_link(
            CreateStructureLinkRequest {
                parent_item_id: "H-101".into(),
                child_item_id: "H-102".into(),
            },
            actor.id,
        )
        .await
        .unwrap();
    structure.deactivate_link(linked.id, actor.id).await.unwrap();

    let campaign = inventories
        .create_inventory(
            CreateInventoryRequest {
                description: "Autumn stock-take".into(),
            },
            actor.id,
        )
        .await
        .unwrap();
    inventories
        .record_sighting(
            campaign.id,
            RecordSightingRequest {
                item_id: "H-101".into(),
            },
            actor.id,
        )
        .await
        .unwrap();

    items
        .add_metadata(
            "H-101",
            AddMetadataRequest {
                notes: "keyboard replaced".into(),
            },
            actor.id,
        )
        .await
        .unwrap();

    // Scrap to finish the lifecycle
    let scrap = scrappages
        .request_scrap(
            CreateScrappageRequest {
                item_id: "H-101".into(),
                description: Some("worn out".into()),
            },
            actor.id,
        )
        .await
        .unwrap();
    scrappages.approve_scrap(scrap.id, actor.id).await.unwrap();

    let events = history.build_history("H-101").await.unwrap();

    // Sorted non-decreasing by timestamp
    for pair in events.windows(2) {
        assert!(
            pair[0].timestamp <= pair[1].timestamp,
            "events must be ordered: {:?} before {:?}",
            pair[0],
            pair[1]
        );
    }

    let statuses: Vec<&str> = events.iter().map(|e| e.status.as_str()).collect();
    assert_eq!(statuses[0], "Added to inventory");
    assert!(statuses.contains(&"Move finished"));
    assert!(statuses.contains(&"Move closed"));
    assert!(statuses.contains(&"Taken into toolbook"));
    assert!(statuses.contains(&"Structure link broken"));
    assert!(statuses.contains(&"Stock-take"));
    assert!(statuses.contains(&"Metadata updated"));
    assert!(statuses.contains(&"Scrap finished"));
    assert!(statuses.contains(&"Scrap closed"));

    // Names resolve into the rendered details
    let intake = &events[0];
    assert!(intake.details.contains("Historian One"));
    assert!(intake.details.contains("Room A"));

    let custody_event = events
        .iter()
        .find(|e| e.status == "Taken into toolbook")
        .unwrap();
    assert!(custody_event.details.contains("Holder Two"));

    let stocktake = events.iter().find(|e| e.status == "Stock-take").unwrap();
    assert!(stocktake.details.contains("Autumn stock-take"));

    let broken = events
        .iter()
        .find(|e| e.status == "Structure link broken")
        .unwrap();
    assert!(broken.details.contains("Docking station"));
    assert!(broken.details.contains("As parent"));
}

#[tokio::test]
async fn counterpart_timeline_reports_the_child_role() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Historian One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;

    let items = ItemService::new(db.clone(), None);
    let structure = StructureService::new(db.clone(), None);
    let history = HistoryService::new(db.clone());

    for (tag, desc) in [("H-201", "Host"), ("H-202", "Monitor")] {
        items
            .create_item(
                CreateItemRequest {
                    id: tag.into(),
                    eid: None,
                    description: desc.into(),
                    model_id: model.id,
                    serial_number: None,
                    room_id: None,
                },
                actor.id,
            )
            .await
            .unwrap();
    }

    structure
        .create_link(
            CreateStructureLinkRequest {
                parent_item_id: "H-201".into(),
                child_item_id: "H-202".into(),
            },
            actor.id,
        )
        .await
        .unwrap();

    let events = history.build_history("H-202").await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, "Structure link created");
    assert!(events[0].details.contains("As child"));
    assert!(events[0].details.contains("Host"));
}
