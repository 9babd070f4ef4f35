//! Domain entities and invariants of the permission graph.

#![forbid(unsafe_code)]

mod ids;
mod links;
mod permission;
mod role;
mod role_group;
mod security;

pub use ids::{GroupId, PermissionId, RoleId};
pub use links::{GroupRole, Membership, RolePermission};
pub use permission::Permission;
pub use role::{ENTITY_NAME_MAX_LENGTH, ENTITY_NAME_MIN_LENGTH, Role, validate_entity_name};
pub use role_group::RoleGroup;
pub use security::AdminPermission;
pub use warden_core::UserId;
