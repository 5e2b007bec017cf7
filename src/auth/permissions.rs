/*!
 * # Permissions Module
 *
 * Permissions are `resource:action` strings. Roles own sets of them; a
 * user's effective set is resolved per request from the directory groups
 * asserted in the token (see `rbac`).
 */

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Permission definition
#[derive(Debug, Clone)]
pub struct Permission {
    pub name: String,
    pub description: String,
    pub resource_type: String,
    pub action: String,
}

/// Permission actions
pub struct Actions;

impl Actions {
    pub const READ: &'static str = "read";
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";
    pub const DELETE: &'static str = "delete";
    pub const APPROVE: &'static str = "approve";
    pub const MANAGE: &'static str = "manage";
    pub const ALL: &'static str = "*";
}

/// Resource types
pub struct Resources;

impl Resources {
    pub const ITEMS: &'static str = "items";
    pub const MOVES: &'static str = "moves";
    pub const SCRAPPAGES: &'static str = "scrappages";
    pub const STRUCTURE: &'static str = "structure";
    pub const ROOMS: &'static str = "rooms";
    pub const CABINETS: &'static str = "cabinets";
    pub const MODELS: &'static str = "models";
    pub const TOOLBOOKS: &'static str = "toolbooks";
    pub const INVENTORIES: &'static str = "inventories";
    pub const ROLES: &'static str = "roles";
    pub const ADMIN: &'static str = "admin";
}

/// Common permission string constants for compile-time safety
pub mod consts {
    // Items
    pub const ITEMS_READ: &str = "items:read";
    pub const ITEMS_CREATE: &str = "items:create";
    pub const ITEMS_UPDATE: &str = "items:update";

    // Moves
    pub const MOVES_READ: &str = "moves:read";
    pub const MOVES_CREATE: &str = "moves:create";
    pub const MOVES_APPROVE: &str = "moves:approve";

    // Scrappages
    pub const SCRAPPAGES_READ: &str = "scrappages:read";
    pub const SCRAPPAGES_CREATE: &str = "scrappages:create";
    pub const SCRAPPAGES_APPROVE: &str = "scrappages:approve";

    // Structure links
    pub const STRUCTURE_CREATE: &str = "structure:create";
    pub const STRUCTURE_DELETE: &str = "structure:delete";

    // Facility & catalog
    pub const ROOMS_MANAGE: &str = "rooms:manage";
    pub const CABINETS_MANAGE: &str = "cabinets:manage";
    pub const MODELS_MANAGE: &str = "models:manage";
    pub const TOOLBOOKS_MANAGE: &str = "toolbooks:manage";

    // Stock-takes
    pub const INVENTORIES_READ: &str = "inventories:read";
    pub const INVENTORIES_CREATE: &str = "inventories:create";

    // Role administration
    pub const ROLES_MANAGE: &str = "roles:manage";
}

/// Format a permission string
pub fn format_permission(resource: &str, action: &str) -> String {
    format!("{}:{}", resource, action)
}

fn register(perms: &mut HashMap<String, Permission>, resource: &str, action: &str, desc: &str) {
    let name = format_permission(resource, action);
    perms.insert(
        name.clone(),
        Permission {
            name,
            description: desc.to_string(),
            resource_type: resource.to_string(),
            action: action.to_string(),
        },
    );
}

// Permission set definition with descriptions
lazy_static! {
    pub static ref PERMISSIONS: HashMap<String, Permission> = {
        let mut perms = HashMap::new();

        register(&mut perms, Resources::ITEMS, Actions::READ, "View items, their location and history");
        register(&mut perms, Resources::ITEMS, Actions::CREATE, "Register new items");
        register(&mut perms, Resources::ITEMS, Actions::UPDATE, "Append item metadata");
        register(&mut perms, Resources::ITEMS, Actions::ALL, "Full control over items");

        register(&mut perms, Resources::MOVES, Actions::READ, "View move requests");
        register(&mut perms, Resources::MOVES, Actions::CREATE, "Open move requests");
        register(&mut perms, Resources::MOVES, Actions::APPROVE, "Approve or reject move requests");
        register(&mut perms, Resources::MOVES, Actions::ALL, "Full control over moves");

        register(&mut perms, Resources::SCRAPPAGES, Actions::READ, "View scrap requests");
        register(&mut perms, Resources::SCRAPPAGES, Actions::CREATE, "Open scrap requests");
        register(&mut perms, Resources::SCRAPPAGES, Actions::APPROVE, "Approve or reject scrap requests");
        register(&mut perms, Resources::SCRAPPAGES, Actions::ALL, "Full control over scrappages");

        register(&mut perms, Resources::STRUCTURE, Actions::CREATE, "Link items into structures");
        register(&mut perms, Resources::STRUCTURE, Actions::DELETE, "Break structure links");

        register(&mut perms, Resources::ROOMS, Actions::MANAGE, "Manage rooms");
        register(&mut perms, Resources::CABINETS, Actions::MANAGE, "Manage cabinets");
        register(&mut perms, Resources::MODELS, Actions::MANAGE, "Manage the model catalog");
        register(&mut perms, Resources::TOOLBOOKS, Actions::MANAGE, "Manage toolbooks");

        register(&mut perms, Resources::INVENTORIES, Actions::READ, "View stock-takes");
        register(&mut perms, Resources::INVENTORIES, Actions::CREATE, "Run stock-takes");

        register(&mut perms, Resources::ROLES, Actions::MANAGE, "Manage roles and their permissions");
        register(&mut perms, Resources::ADMIN, Actions::ALL, "Full administrator access");

        perms
    };
}

/// Check whether a permission the user holds satisfies a required one.
///
/// Supports `resource:*`, `admin:*` and the global `*` wildcard.
pub fn is_permission_implied(user_perm: &str, required_perm: &str) -> bool {
    if user_perm == required_perm || user_perm == "*" {
        return true;
    }

    let user_parts: Vec<&str> = user_perm.split(':').collect();
    let required_parts: Vec<&str> = required_perm.split(':').collect();

    if user_parts.len() == 2 && required_parts.len() == 2 {
        let (user_resource, user_action) = (user_parts[0], user_parts[1]);
        let required_resource = required_parts[0];

        if user_resource == required_resource && user_action == "*" {
            return true;
        }

        if user_resource == Resources::ADMIN && user_action == "*" {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_workflow_permissions() {
        assert!(PERMISSIONS.contains_key(consts::MOVES_APPROVE));
        assert!(PERMISSIONS.contains_key(consts::SCRAPPAGES_APPROVE));
        assert!(PERMISSIONS.contains_key(consts::ITEMS_READ));
    }

    #[test]
    fn exact_match_is_implied() {
        assert!(is_permission_implied("moves:approve", "moves:approve"));
        assert!(!is_permission_implied("moves:read", "moves:approve"));
    }

    #[test]
    fn wildcards_are_implied() {
        assert!(is_permission_implied("moves:*", "moves:approve"));
        assert!(is_permission_implied("admin:*", "scrappages:create"));
        assert!(is_permission_implied("*", "items:read"));
        assert!(!is_permission_implied("items:*", "moves:approve"));
    }
}
