use serde::{Deserialize, Serialize};

/// Permission names required by the administrative API.
///
/// These are ordinary rows of the permission table; the enum only pins the
/// names that endpoints check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    /// Allows reading roles and their grants.
    ReadRole,
    /// Allows creating roles.
    CreateRole,
    /// Allows renaming and describing roles.
    UpdateRole,
    /// Allows deleting roles.
    DeleteRole,
    /// Allows reading permissions.
    ReadPermission,
    /// Allows creating permissions.
    CreatePermission,
    /// Allows reading role groups and their roles.
    ReadGroup,
    /// Allows creating role groups.
    CreateGroup,
    /// Allows deleting role groups.
    DeleteGroup,
    /// Allows adding and removing roles in groups.
    ManageGroupRoles,
    /// Allows granting and revoking role permissions.
    ManageRolePermissions,
    /// Allows adding and removing group members.
    ManageMemberships,
}

impl AdminPermission {
    /// Returns the stored permission name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadRole => "read_role",
            Self::CreateRole => "create_role",
            Self::UpdateRole => "update_role",
            Self::DeleteRole => "delete_role",
            Self::ReadPermission => "read_permission",
            Self::CreatePermission => "create_permission",
            Self::ReadGroup => "read_group",
            Self::CreateGroup => "create_group",
            Self::DeleteGroup => "delete_group",
            Self::ManageGroupRoles => "manage_group_roles",
            Self::ManageRolePermissions => "manage_role_permissions",
            Self::ManageMemberships => "manage_memberships",
        }
    }

    /// Returns the resource and action pair this permission is stored with.
    #[must_use]
    pub fn resource_action(&self) -> (&'static str, &'static str) {
        match self {
            Self::ReadRole => ("role", "read"),
            Self::CreateRole => ("role", "create"),
            Self::UpdateRole => ("role", "update"),
            Self::DeleteRole => ("role", "delete"),
            Self::ReadPermission => ("permission", "read"),
            Self::CreatePermission => ("permission", "create"),
            Self::ReadGroup => ("group", "read"),
            Self::CreateGroup => ("group", "create"),
            Self::DeleteGroup => ("group", "delete"),
            Self::ManageGroupRoles => ("group_role", "manage"),
            Self::ManageRolePermissions => ("role_permission", "manage"),
            Self::ManageMemberships => ("membership", "manage"),
        }
    }

    /// Returns all administrative permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AdminPermission] = &[
            AdminPermission::ReadRole,
            AdminPermission::CreateRole,
            AdminPermission::UpdateRole,
            AdminPermission::DeleteRole,
            AdminPermission::ReadPermission,
            AdminPermission::CreatePermission,
            AdminPermission::ReadGroup,
            AdminPermission::CreateGroup,
            AdminPermission::DeleteGroup,
            AdminPermission::ManageGroupRoles,
            AdminPermission::ManageRolePermissions,
            AdminPermission::ManageMemberships,
        ];

        ALL
    }
}
