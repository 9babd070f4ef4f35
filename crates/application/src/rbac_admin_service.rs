//! Administrative CRUD over roles, permissions, groups, and their links.
//!
//! Authorization is enforced at the request boundary; this service only
//! validates input and checks that referenced entities exist.


use std::sync::Arc;

use chrono::Utc;

use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    GroupId, GroupRole, Membership, Permission, PermissionId, Role, RoleGroup, RoleId,
    RolePermission,
};

use crate::rbac_admin_ports::{
    CreateGroupInput, CreatePermissionInput, CreateRoleInput, RbacAdminRepository,
    UpdateRoleInput,
};

/// Application service for permission graph administration.
#[derive(Clone)]
pub struct RbacAdminService {
    repository: Arc<dyn RbacAdminRepository>,
}

impl RbacAdminService {
    /// Creates a new service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn RbacAdminRepository>) -> Self {
        Self { repository }
    }

    /// Creates a role.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let role = Role::new(
            RoleId::new(),
            input.name,
            input.description.unwrap_or_default(),
            Utc::now(),
        )?;
        self.repository.create_role(&role).await?;

        tracing::info!(role_id = %role.id(), name = role.name(), "created role");
        Ok(role)
    }

    /// Lists all roles.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.repository.list_roles().await
    }

    /// Returns one role.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.require_role(role_id).await
    }

    /// Renames a role and replaces its description.
    pub async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let existing = self.require_role(role_id).await?;
        let role = Role::new(
            role_id,
            input.name,
            input.description.unwrap_or_default(),
            existing.created_at(),
        )?;
        self.repository.update_role(&role).await?;

        tracing::info!(%role_id, name = role.name(), "updated role");
        Ok(role)
    }

    /// Creates a permission.
    pub async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let permission = Permission::new(
            PermissionId::new(),
            input.name,
            input.resource,
            input.action,
        )?;
        self.repository.create_permission(&permission).await?;

        tracing::info!(
            permission_id = %permission.id(),
            name = permission.name(),
            "created permission"
        );
        Ok(permission)
    }

    /// Lists all permissions.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.repository.list_permissions().await
    }

    /// Creates a role group.
    pub async fn create_group(&self, input: CreateGroupInput) -> AppResult<RoleGroup> {
        let group = RoleGroup::new(
            GroupId::new(),
            input.name,
            input.description.unwrap_or_default(),
            Utc::now(),
        )?;
        self.repository.create_group(&group).await?;

        tracing::info!(group_id = %group.id(), name = group.name(), "created group");
        Ok(group)
    }

    /// Lists all role groups.
    pub async fn list_groups(&self) -> AppResult<Vec<RoleGroup>> {
        self.repository.list_groups().await
    }

    /// Returns one role group.
    pub async fn get_group(&self, group_id: GroupId) -> AppResult<RoleGroup> {
        self.require_group(group_id).await
    }

    /// Grants a permission to a role. Granting twice is a no-op.
    pub async fn grant_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require_role(role_id).await?;
        self.require_permission(permission_id).await?;

        let inserted = self
            .repository
            .grant_role_permission(RolePermission {
                role_id,
                permission_id,
            })
            .await?;

        if inserted {
            tracing::info!(%role_id, %permission_id, "granted permission to role");
        }
        Ok(())
    }

    /// Revokes a permission from a role.
    pub async fn revoke_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let removed = self
            .repository
            .revoke_role_permission(RolePermission {
                role_id,
                permission_id,
            })
            .await?;

        if !removed {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' is not granted to role '{role_id}'"
            )));
        }

        tracing::info!(%role_id, %permission_id, "revoked permission from role");
        Ok(())
    }

    /// Lists permissions granted directly to a role.
    pub async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        self.require_role(role_id).await?;
        self.repository.list_role_permissions(role_id).await
    }

    /// Places a role in a group. Assigning twice is a no-op.
    pub async fn assign_group_role(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()> {
        self.require_group(group_id).await?;
        self.require_role(role_id).await?;

        let inserted = self
            .repository
            .assign_group_role(GroupRole { group_id, role_id })
            .await?;

        if inserted {
            tracing::info!(%group_id, %role_id, "assigned role to group");
        }
        Ok(())
    }

    /// Removes a role from a group.
    pub async fn remove_group_role(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()> {
        let removed = self
            .repository
            .remove_group_role(GroupRole { group_id, role_id })
            .await?;

        if !removed {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' is not assigned to group '{group_id}'"
            )));
        }

        tracing::info!(%group_id, %role_id, "removed role from group");
        Ok(())
    }

    /// Lists roles contained in a group.
    pub async fn list_group_roles(&self, group_id: GroupId) -> AppResult<Vec<Role>> {
        self.require_group(group_id).await?;
        self.repository.list_group_roles(group_id).await
    }

    /// Adds a user to a group. Adding twice keeps the first assignment time.
    pub async fn add_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<()> {
        self.require_group(group_id).await?;

        let inserted = self
            .repository
            .add_membership(Membership {
                user_id,
                group_id,
                assigned_at: Utc::now(),
            })
            .await?;

        if inserted {
            tracing::info!(%group_id, %user_id, "added group member");
        }
        Ok(())
    }

    /// Removes a user from a group.
    pub async fn remove_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<()> {
        let removed = self.repository.remove_membership(user_id, group_id).await?;

        if !removed {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a member of group '{group_id}'"
            )));
        }

        tracing::info!(%group_id, %user_id, "removed group member");
        Ok(())
    }

    async fn require_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    async fn require_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })
    }

    async fn require_group(&self, group_id: GroupId) -> AppResult<RoleGroup> {
        self.repository
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' was not found")))
    }
}
