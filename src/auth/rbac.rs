//! Effective-permission resolution.
//!
//! Roles bind externally-issued directory groups to permission sets. A user
//! never holds roles directly: each request carries the group ids asserted by
//! the identity provider, and the effective set is the union of permissions
//! of every role whose group id matches.

use std::collections::HashSet;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::{role, role_permission};
use crate::errors::ServiceError;

/// Pure set-membership join over the role table.
pub fn effective_permissions(
    group_ids: &[String],
    roles: &[(role::Model, Vec<role_permission::Model>)],
) -> HashSet<String> {
    let groups: HashSet<&str> = group_ids.iter().map(String::as_str).collect();

    roles
        .iter()
        .filter(|(r, _)| groups.contains(r.group_id.as_str()))
        .flat_map(|(_, perms)| perms.iter().map(|p| p.permission.clone()))
        .collect()
}

/// Loads matching roles and resolves the effective permission set.
pub async fn load_effective_permissions<C: ConnectionTrait>(
    db: &C,
    group_ids: &[String],
) -> Result<HashSet<String>, ServiceError> {
    if group_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let roles = role::Entity::find()
        .filter(role::Column::GroupId.is_in(group_ids.to_vec()))
        .find_with_related(role_permission::Entity)
        .all(db)
        .await?;

    Ok(effective_permissions(group_ids, &roles))
}
