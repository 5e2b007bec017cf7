//! Structure link invariants: self-link rejection, pair uniqueness in both
//! directions, soft deactivation, neighbor annotation.

mod common;

use assert_matches::assert_matches;
use common::{seed_model, seed_user, setup_db};

use assettrack_api::errors::ServiceError;
use assettrack_api::services::items::{CreateItemRequest, ItemService};
use assettrack_api::services::structure::{
    CreateStructureLinkRequest, StructureRelation, StructureService,
};

async fn seed_items(db: &std::sync::Arc<assettrack_api::db::DbPool>, tags: &[&str]) -> uuid::Uuid {
    let actor = seed_user(db, "Linker One").await;
    let model = seed_model(db, "Dell", "OptiPlex 7010").await;
    let items = ItemService::new(db.clone(), None);

    for tag in tags {
        items
            .create_item(
                CreateItemRequest {
                    id: (*tag).into(),
                    eid: None,
                    description: format!("Item {tag}"),
                    model_id: model.id,
                    serial_number: None,
                    room_id: None,
                },
                actor.id,
            )
            .await
            .unwrap();
    }

    actor.id
}

fn link(parent: &str, child: &str) -> CreateStructureLinkRequest {
    CreateStructureLinkRequest {
        parent_item_id: parent.into(),
        child_item_id: child.into(),
    }
}

#[tokio::test]
async fn self_links_are_rejected() {
    let db = setup_db().await;
    let actor = seed_items(&db, &["PC-1"]).await;
    let structure = StructureService::new(db.clone(), None);

    let err = structure.create_link(link("PC-1", "PC-1"), actor).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn links_require_both_items() {
    let db = setup_db().await;
    let actor = seed_items(&db, &["PC-1"]).await;
    let structure = StructureService::new(db.clone(), None);

    let err = structure.create_link(link("PC-1", "GHOST-1"), actor).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn duplicate_active_links_are_rejected_in_both_directions() {
    let db = setup_db().await;
    let actor = seed_items(&db, &["PC-1", "MON-1"]).await;
    let structure = StructureService::new(db.clone(), None);

    structure.create_link(link("PC-1", "MON-1"), actor).await.unwrap();

    let err = structure.create_link(link("PC-1", "MON-1"), actor).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // The reversed pair counts as the same link
    let err = structure.create_link(link("MON-1", "PC-1"), actor).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn deactivation_is_terminal_but_relinking_is_allowed() {
    let db = setup_db().await;
    let actor = seed_items(&db, &["PC-1", "MON-1"]).await;
    let structure = StructureService::new(db.clone(), None);

    let created = structure.create_link(link("PC-1", "MON-1"), actor).await.unwrap();

    let broken = structure.deactivate_link(created.id, actor).await.unwrap();
    assert!(!broken.is_active);
    assert_eq!(broken.deactivated_by, Some(actor));
    assert!(broken.deactivated_at.is_some());
    assert_eq!(broken.parent_item.id, "PC-1");
    assert_eq!(broken.child_item.id, "MON-1");

    let err = structure.deactivate_link(created.id, actor).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // With no active link left, the pair can be linked again
    structure.create_link(link("MON-1", "PC-1"), actor).await.unwrap();
}

#[tokio::test]
async fn deactivating_a_missing_link_is_not_found() {
    let db = setup_db().await;
    let actor = seed_items(&db, &["PC-1"]).await;
    let structure = StructureService::new(db.clone(), None);

    let err = structure
        .deactivate_link(uuid::Uuid::new_v4(), actor)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn neighbors_annotate_the_counterpart_role() {
    let db = setup_db().await;
    let actor = seed_items(&db, &["HOST-1", "MON-1", "DOCK-1"]).await;
    let structure = StructureService::new(db.clone(), None);

    structure.create_link(link("HOST-1", "MON-1"), actor).await.unwrap();
    structure.create_link(link("DOCK-1", "HOST-1"), actor).await.unwrap();

    let neighbors = structure.neighbors("HOST-1").await.unwrap();
    assert_eq!(neighbors.len(), 2);

    let monitor = neighbors
        .iter()
        .find(|n| n.linked_item.id == "MON-1")
        .expect("monitor neighbor");
    assert_eq!(monitor.relation, StructureRelation::Child);

    let dock = neighbors
        .iter()
        .find(|n| n.linked_item.id == "DOCK-1")
        .expect("dock neighbor");
    assert_eq!(dock.relation, StructureRelation::Parent);

    // Broken links disappear from the neighbor view
    structure.deactivate_link(monitor.mapping_id, actor).await.unwrap();
    let neighbors = structure.neighbors("HOST-1").await.unwrap();
    assert_eq!(neighbors.len(), 1);
    assert_eq!(neighbors[0].linked_item.id, "DOCK-1");
}
