use async_trait::async_trait;

use warden_core::{AppResult, UserId};
use warden_domain::{Permission, Role, RoleGroup};

/// One row of the resolution join: a permission reached through a role in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPath {
    /// Reached permission.
    pub permission: Permission,
    /// Role granting the permission.
    pub role: Role,
    /// Group containing the role.
    pub group: RoleGroup,
}

/// Repository port for reading the permission graph.
#[async_trait]
pub trait PermissionGraphRepository: Send + Sync {
    /// Lists every (permission, role, group) path reachable from the user's memberships.
    ///
    /// Implementations must answer with a single round trip. Paths are not
    /// deduplicated: the same permission appears once per route to it.
    async fn list_permission_paths_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionPath>>;
}
