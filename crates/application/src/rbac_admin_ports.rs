use async_trait::async_trait;

use warden_core::{AppResult, UserId};
use warden_domain::{
    GroupId, GroupRole, Membership, Permission, PermissionId, Role, RoleGroup, RoleId,
    RolePermission,
};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Input payload for replacing a role's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New unique role name.
    pub name: String,
    /// New description; `None` clears it.
    pub description: Option<String>,
}

/// Input payload for creating permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Unique permission name.
    pub name: String,
    /// Resource the permission applies to.
    pub resource: String,
    /// Action allowed on the resource.
    pub action: String,
}

/// Input payload for creating role groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupInput {
    /// Unique group name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Repository port for single-table graph administration.
///
/// Name uniqueness violations surface as `AppError::Conflict`. Link inserts
/// return `false` when the pair already existed; link removals return `false`
/// when nothing was removed.
#[async_trait]
pub trait RbacAdminRepository: Send + Sync {
    /// Inserts a role.
    async fn create_role(&self, role: &Role) -> AppResult<()>;

    /// Lists roles ordered by name.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds a role by identifier.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Replaces a role's name and description.
    async fn update_role(&self, role: &Role) -> AppResult<()>;

    /// Inserts a permission.
    async fn create_permission(&self, permission: &Permission) -> AppResult<()>;

    /// Lists permissions ordered by name.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Finds a permission by identifier.
    async fn find_permission(&self, permission_id: PermissionId)
    -> AppResult<Option<Permission>>;

    /// Inserts a role group.
    async fn create_group(&self, group: &RoleGroup) -> AppResult<()>;

    /// Lists groups ordered by name.
    async fn list_groups(&self) -> AppResult<Vec<RoleGroup>>;

    /// Finds a group by identifier.
    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<RoleGroup>>;

    /// Grants a permission to a role.
    async fn grant_role_permission(&self, link: RolePermission) -> AppResult<bool>;

    /// Revokes a permission from a role.
    async fn revoke_role_permission(&self, link: RolePermission) -> AppResult<bool>;

    /// Lists permissions granted to a role.
    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>>;

    /// Places a role in a group.
    async fn assign_group_role(&self, link: GroupRole) -> AppResult<bool>;

    /// Removes a role from a group.
    async fn remove_group_role(&self, link: GroupRole) -> AppResult<bool>;

    /// Lists roles contained in a group.
    async fn list_group_roles(&self, group_id: GroupId) -> AppResult<Vec<Role>>;

    /// Adds a user to a group.
    async fn add_membership(&self, membership: Membership) -> AppResult<bool>;

    /// Removes a user from a group.
    async fn remove_membership(&self, user_id: UserId, group_id: GroupId) -> AppResult<bool>;
}
