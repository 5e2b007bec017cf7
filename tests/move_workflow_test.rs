//! Move workflow end-to-end: request, approve, reject, bulk fan-out, and the
//! single-active-placement invariant after every transition.

mod common;

use assert_matches::assert_matches;
use common::{active_custody, active_placements, seed_model, seed_room, seed_toolbook, seed_user, setup_db};
use sea_orm::{EntityTrait, PaginatorTrait};
use tokio::sync::mpsc;

use assettrack_api::entities::{item_place, move_request};
use assettrack_api::errors::ServiceError;
use assettrack_api::events::{Event, EventSender};
use assettrack_api::services::items::{CreateItemRequest, ItemService, ItemStatus};
use assettrack_api::services::moves::{BulkMoveRequest, CreateMoveRequest, MoveService};
use std::sync::Arc;

fn move_to_room(item_id: &str, to_room: uuid::Uuid) -> CreateMoveRequest {
    CreateMoveRequest {
        item_id: item_id.to_string(),
        from_room_id: None,
        from_toolbook_id: None,
        to_room_id: Some(to_room),
        to_toolbook_id: None,
        description: Some("deploy".to_string()),
    }
}

#[tokio::test]
async fn request_without_destination_is_rejected_and_not_persisted() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);

    items
        .create_item(
            CreateItemRequest {
                id: "A-100".into(),
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

    let err = moves
        .request_move(
            CreateMoveRequest {
                item_id: "A-100".into(),
                from_room_id: None,
                from_toolbook_id: None,
                to_room_id: None,
                to_toolbook_id: None,
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));

    let count = move_request::Entity::find().count(db.as_ref()).await.unwrap();
    assert_eq!(count, 0, "no move record may be persisted on validation failure");
}

#[tokio::test]
async fn request_for_unknown_item_is_not_found() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let room = seed_room(&db, "Server room").await;

    let moves = MoveService::new(db.clone(), None);

    let err = moves
        .request_move(move_to_room("GHOST-1", room.id), actor.id)
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn request_does_not_touch_the_ledger_until_approval() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room = seed_room(&db, "Office 12").await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);

    items
        .create_item(
            CreateItemRequest {
                id: "A-101".into(),
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

    let created = moves
        .request_move(move_to_room("A-101", room.id), actor.id)
        .await
        .unwrap();

    assert!(!created.is_finished);
    assert!(created.closed_at.is_none());
    assert!(active_placements(&db, "A-101").await.is_empty());
    assert_eq!(
        items.get_item("A-101").await.unwrap().status,
        ItemStatus::New,
        "the item stays new until the move is approved"
    );
}

#[tokio::test]
async fn approving_a_move_activates_item_and_places_it() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room = seed_room(&db, "Office 12").await;

    let (tx, mut rx) = mpsc::channel(16);
    let sender = Arc::new(EventSender::new(tx));
    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), Some(sender));

    items
        .create_item(
            CreateItemRequest {
                id: "A-102".into(),
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

    let created = moves
        .request_move(move_to_room("A-102", room.id), actor.id)
        .await
        .unwrap();
    let approved = moves.approve_move(created.id, actor.id).await.unwrap();

    assert!(approved.is_finished);
    assert_eq!(approved.closed_by, Some(actor.id));
    assert!(approved.closed_at.is_some());

    let placements = active_placements(&db, "A-102").await;
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].room_id, Some(room.id));
    assert!(placements[0].is_stored);

    assert_eq!(
        items.get_item("A-102").await.unwrap().status,
        ItemStatus::Active
    );

    assert_matches!(rx.try_recv().unwrap(), Event::MoveRequested(_));
    assert_matches!(rx.try_recv().unwrap(), Event::MoveApproved(_));
}

#[tokio::test]
async fn approving_a_room_to_room_move_keeps_one_active_placement() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let model = seed_model(&db, "HP", "EliteDesk 800").await;
    let room_a = seed_room(&db, "Room A").await;
    let room_b = seed_room(&db, "Room B").await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);

    items
        .create_item(
            CreateItemRequest {
                id: "A-103".into(),
                eid: None,
                description: "Desktop".into(),
                model_id: model.id,
                serial_number: None,
                room_id: Some(room_a.id),
            },
            actor.id,
        )
        .await
        .unwrap();

    let created = moves
        .request_move(
            CreateMoveRequest {
                item_id: "A-103".into(),
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
    moves.approve_move(created.id, actor.id).await.unwrap();

    let placements = active_placements(&db, "A-103").await;
    assert_eq!(placements.len(), 1, "exactly one active placement after approval");
    assert_eq!(placements[0].room_id, Some(room_b.id));

    // The old placement survives as an inactive, attributed record
    let all = item_place::Entity::find().all(db.as_ref()).await.unwrap();
    let retired: Vec<_> = all.iter().filter(|p| !p.is_active).collect();
    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].room_id, Some(room_a.id));
    assert_eq!(retired[0].deactivated_by, Some(actor.id));
    assert!(retired[0].deactivated_at.is_some());
}

#[tokio::test]
async fn approving_a_room_to_toolbook_move_creates_custody() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let holder = seed_user(&db, "Holder Two").await;
    let model = seed_model(&db, "Makita", "DDF484").await;
    let room = seed_room(&db, "Tool crib").await;
    let toolbook = seed_toolbook(&db, holder.id).await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);

    items
        .create_item(
            CreateItemRequest {
                id: "T-200".into(),
                eid: None,
                description: "Cordless drill".into(),
                model_id: model.id,
                serial_number: None,
                room_id: Some(room.id),
            },
            actor.id,
        )
        .await
        .unwrap();

    let created = moves
        .request_move(
            CreateMoveRequest {
                item_id: "T-200".into(),
                from_room_id: Some(room.id),
                from_toolbook_id: None,
                to_room_id: None,
                to_toolbook_id: Some(toolbook.id),
                description: None,
            },
            actor.id,
        )
        .await
        .unwrap();
    moves.approve_move(created.id, actor.id).await.unwrap();

    assert!(active_placements(&db, "T-200").await.is_empty());
    let custody = active_custody(&db, "T-200").await;
    assert_eq!(custody.len(), 1);
    assert_eq!(custody[0].toolbook_id, toolbook.id);
}

#[tokio::test]
async fn rejecting_a_move_only_closes_the_request() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room_a = seed_room(&db, "Room A").await;
    let room_b = seed_room(&db, "Room B").await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);

    items
        .create_item(
            CreateItemRequest {
                id: "A-104".into(),
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

    let created = moves
        .request_move(
            CreateMoveRequest {
                item_id: "A-104".into(),
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
    let rejected = moves.reject_move(created.id, actor.id).await.unwrap();

    assert!(rejected.is_finished);
    assert_eq!(rejected.closed_by, Some(actor.id));

    // Ledger untouched: still in room A, status still new
    let placements = active_placements(&db, "A-104").await;
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].room_id, Some(room_a.id));
    assert_eq!(
        items.get_item("A-104").await.unwrap().status,
        ItemStatus::New
    );
}

#[tokio::test]
async fn finished_moves_accept_no_further_transitions() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room = seed_room(&db, "Office 12").await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);

    items
        .create_item(
            CreateItemRequest {
                id: "A-105".into(),
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

    let created = moves
        .request_move(move_to_room("A-105", room.id), actor.id)
        .await
        .unwrap();
    moves.approve_move(created.id, actor.id).await.unwrap();

    let err = moves.approve_move(created.id, actor.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
    let err = moves.reject_move(created.id, actor.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // The double approval changed nothing: still one active placement
    assert_eq!(active_placements(&db, "A-105").await.len(), 1);
}

#[tokio::test]
async fn bulk_move_reports_companion_failures_without_rollback() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let model = seed_model(&db, "Dell", "UltraSharp U2723").await;
    let room = seed_room(&db, "Office 12").await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);

    for tag in ["HOST-1", "MON-1"] {
        items
            .create_item(
                CreateItemRequest {
                    id: tag.into(),
                    eid: None,
                    description: "Workstation part".into(),
                    model_id: model.id,
                    serial_number: None,
                    room_id: None,
                },
                actor.id,
            )
            .await
            .unwrap();
    }

    let report = moves
        .request_bulk_move(
            BulkMoveRequest {
                primary: move_to_room("HOST-1", room.id),
                companion_item_ids: vec!["MON-1".into(), "GHOST-9".into()],
            },
            actor.id,
        )
        .await
        .unwrap();

    assert_eq!(report.requested.len(), 2, "primary and one companion succeed");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].item_id, "GHOST-9");

    // The successful requests stay persisted despite the sibling failure
    let count = move_request::Entity::find().count(db.as_ref()).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn list_moves_filters_on_finished_state() {
    let db = setup_db().await;
    let actor = seed_user(&db, "Approver One").await;
    let model = seed_model(&db, "Dell", "Latitude 5440").await;
    let room = seed_room(&db, "Office 12").await;

    let items = ItemService::new(db.clone(), None);
    let moves = MoveService::new(db.clone(), None);

    for tag in ["L-1", "L-2"] {
        items
            .create_item(
                CreateItemRequest {
                    id: tag.into(),
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
    }

    let first = moves
        .request_move(move_to_room("L-1", room.id), actor.id)
        .await
        .unwrap();
    moves
        .request_move(move_to_room("L-2", room.id), actor.id)
        .await
        .unwrap();
    moves.approve_move(first.id, actor.id).await.unwrap();

    let open = moves.list_moves(1, 20, Some(false)).await.unwrap();
    assert_eq!(open.total, 1);
    assert_eq!(open.moves[0].item_id, "L-2");

    let finished = moves.list_moves(1, 20, Some(true)).await.unwrap();
    assert_eq!(finished.total, 1);
    assert_eq!(finished.moves[0].item_id, "L-1");

    let all = moves.list_moves(1, 20, None).await.unwrap();
    assert_eq!(all.total, 2);
}
