//! Token validation and effective-permission resolution against the role
//! tables.

mod common;

use assert_matches::assert_matches;
use common::{seed_user, setup_db};

use assettrack_api::auth::{consts as perm, AuthConfig, AuthService};
use assettrack_api::errors::ServiceError;
use assettrack_api::services::roles::{CreateRoleRequest, ReplacePermissionsRequest, RoleService};

fn auth_service(db: std::sync::Arc<assettrack_api::db::DbPool>) -> AuthService {
    AuthService::new(
        AuthConfig::new(
            "integration-test-secret-key-that-is-long-enough-for-hs256-signing".into(),
            "assettrack-auth".into(),
            "assettrack-api".into(),
            3600,
        ),
        db,
    )
}

#[tokio::test]
async fn token_round_trip_resolves_role_permissions() {
    let db = setup_db().await;
    let operator = seed_user(&db, "Operator One").await;
    let auth = auth_service(db.clone());
    let roles = RoleService::new(db.clone());

    let role = roles
        .create_role(CreateRoleRequest {
            name: "Operations".into(),
            group_id: "grp-ops".into(),
        })
        .await
        .unwrap();
    roles
        .replace_permissions(
            role.id,
            ReplacePermissionsRequest {
                permissions: vec![
                    perm::MOVES_CREATE.into(),
                    perm::MOVES_APPROVE.into(),
                    perm::ITEMS_READ.into(),
                ],
            },
        )
        .await
        .unwrap();

    let token = auth
        .issue_token(
            operator.id,
            Some(operator.name.clone()),
            Some(operator.email.clone()),
            vec!["grp-ops".into(), "grp-unrelated".into()],
        )
        .unwrap();

    let user = auth.resolve_user(&token).await.unwrap();
    assert_eq!(user.user_id, operator.id);
    assert!(user.has_permission(perm::MOVES_APPROVE));
    assert!(user.has_permission(perm::ITEMS_READ));
    assert!(!user.has_permission(perm::SCRAPPAGES_APPROVE));
}

#[tokio::test]
async fn unmatched_groups_resolve_to_no_permissions() {
    let db = setup_db().await;
    let operator = seed_user(&db, "Operator Two").await;
    let auth = auth_service(db.clone());

    let token = auth
        .issue_token(operator.id, None, None, vec!["grp-nobody".into()])
        .unwrap();

    let user = auth.resolve_user(&token).await.unwrap();
    assert!(user.permissions.is_empty());
    assert!(!user.has_permission(perm::ITEMS_READ));
}

#[tokio::test]
async fn tampered_tokens_are_rejected() {
    let db = setup_db().await;
    let operator = seed_user(&db, "Operator Three").await;
    let auth = auth_service(db.clone());

    let token = auth
        .issue_token(operator.id, None, None, vec![])
        .unwrap();

    let mut tampered = token.clone();
    tampered.push('x');
    assert!(auth.resolve_user(&tampered).await.is_err());

    // A token signed with a different secret fails too
    let other = auth_service(db.clone());
    let foreign = AuthService::new(
        AuthConfig::new(
            "a-completely-different-secret-key-that-is-also-long-enough-here".into(),
            "assettrack-auth".into(),
            "assettrack-api".into(),
            3600,
        ),
        db.clone(),
    )
    .issue_token(operator.id, None, None, vec![])
    .unwrap();
    assert!(other.resolve_user(&foreign).await.is_err());
}

#[tokio::test]
async fn unknown_permission_names_are_rejected() {
    let db = setup_db().await;
    let roles = RoleService::new(db.clone());

    let role = roles
        .create_role(CreateRoleRequest {
            name: "Broken".into(),
            group_id: "grp-broken".into(),
        })
        .await
        .unwrap();

    let err = roles
        .replace_permissions(
            role.id,
            ReplacePermissionsRequest {
                permissions: vec!["items:frobnicate".into()],
            },
        )
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn duplicate_role_group_is_a_conflict() {
    let db = setup_db().await;
    let roles = RoleService::new(db.clone());

    roles
        .create_role(CreateRoleRequest {
            name: "First".into(),
            group_id: "grp-dup".into(),
        })
        .await
        .unwrap();

    let err = roles
        .create_role(CreateRoleRequest {
            name: "Second".into(),
            group_id: "grp-dup".into(),
        })
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::Conflict(_));
}
