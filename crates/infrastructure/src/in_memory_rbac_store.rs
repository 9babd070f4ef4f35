//! In-memory permission graph store.
//!
//! Implements every graph port over one table set guarded by a single
//! `RwLock`. A mutation transaction holds the owned write guard for its whole
//! lifetime and edits a private copy of the tables, which replaces the shared
//! copy on commit. Readers therefore see either the state before or after a
//! cascading delete.


use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedRwLockWriteGuard, RwLock};

use warden_application::{
    CascadeMutationStore, MutationStep, MutationTransaction, PermissionGraphRepository,
    PermissionPath, RbacAdminRepository,
};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    GroupId, GroupRole, Membership, Permission, PermissionId, Role, RoleGroup, RoleId,
    RolePermission,
};

#[derive(Debug, Clone, Default)]
struct RbacTables {
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    groups: HashMap<GroupId, RoleGroup>,
    role_permissions: HashSet<RolePermission>,
    group_roles: HashSet<GroupRole>,
    memberships: HashMap<(UserId, GroupId), Membership>,
}

impl RbacTables {
    fn name_taken<'a>(mut names: impl Iterator<Item = &'a str>, name: &str) -> bool {
        names.any(|existing| existing == name)
    }
}

/// In-memory store for roles, permissions, groups, and their links.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRbacStore {
    tables: Arc<RwLock<RbacTables>>,
    failure_step: Arc<Mutex<Option<MutationStep>>>,
}

impl InMemoryRbacStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later mutation transaction fail at `step`; `None` clears it.
    pub async fn set_failure_step(&self, step: Option<MutationStep>) {
        *self.failure_step.lock().await = step;
    }
}

#[async_trait]
impl PermissionGraphRepository for InMemoryRbacStore {
    async fn list_permission_paths_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionPath>> {
        let tables = self.tables.read().await;
        let mut paths = Vec::new();

        for (_, group_id) in tables.memberships.keys().filter(|(member, _)| *member == user_id) {
            let Some(group) = tables.groups.get(group_id) else {
                continue;
            };

            for group_role in tables
                .group_roles
                .iter()
                .filter(|link| link.group_id == *group_id)
            {
                let Some(role) = tables.roles.get(&group_role.role_id) else {
                    continue;
                };

                for role_permission in tables
                    .role_permissions
                    .iter()
                    .filter(|link| link.role_id == group_role.role_id)
                {
                    if let Some(permission) = tables.permissions.get(&role_permission.permission_id)
                    {
                        paths.push(PermissionPath {
                            permission: permission.clone(),
                            role: role.clone(),
                            group: group.clone(),
                        });
                    }
                }
            }
        }

        Ok(paths)
    }
}

#[async_trait]
impl RbacAdminRepository for InMemoryRbacStore {
    async fn create_role(&self, role: &Role) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if RbacTables::name_taken(tables.roles.values().map(Role::name), role.name()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        tables.roles.insert(role.id(), role.clone());
        Ok(())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let tables = self.tables.read().await;
        let mut roles: Vec<Role> = tables.roles.values().cloned().collect();
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.tables.read().await.roles.get(&role_id).cloned())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.roles.contains_key(&role.id()) {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id()
            )));
        }

        let renamed_onto_other = tables
            .roles
            .values()
            .any(|existing| existing.id() != role.id() && existing.name() == role.name());
        if renamed_onto_other {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        tables.roles.insert(role.id(), role.clone());
        Ok(())
    }

    async fn create_permission(&self, permission: &Permission) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.permissions.values().any(|existing| {
            existing.name() == permission.name()
                || (existing.resource() == permission.resource()
                    && existing.action() == permission.action())
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.name()
            )));
        }

        tables.permissions.insert(permission.id(), permission.clone());
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let tables = self.tables.read().await;
        let mut permissions: Vec<Permission> = tables.permissions.values().cloned().collect();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(permissions)
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self.tables.read().await.permissions.get(&permission_id).cloned())
    }

    async fn create_group(&self, group: &RoleGroup) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if RbacTables::name_taken(tables.groups.values().map(RoleGroup::name), group.name()) {
            return Err(AppError::Conflict(format!(
                "group '{}' already exists",
                group.name()
            )));
        }

        tables.groups.insert(group.id(), group.clone());
        Ok(())
    }

    async fn list_groups(&self) -> AppResult<Vec<RoleGroup>> {
        let tables = self.tables.read().await;
        let mut groups: Vec<RoleGroup> = tables.groups.values().cloned().collect();
        groups.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(groups)
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<RoleGroup>> {
        Ok(self.tables.read().await.groups.get(&group_id).cloned())
    }

    async fn grant_role_permission(&self, link: RolePermission) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.roles.contains_key(&link.role_id)
            || !tables.permissions.contains_key(&link.permission_id)
        {
            return Err(AppError::NotFound(
                "failed to grant permission to role: referenced entity does not exist".to_owned(),
            ));
        }

        Ok(tables.role_permissions.insert(link))
    }

    async fn revoke_role_permission(&self, link: RolePermission) -> AppResult<bool> {
        Ok(self.tables.write().await.role_permissions.remove(&link))
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let tables = self.tables.read().await;
        let mut permissions: Vec<Permission> = tables
            .role_permissions
            .iter()
            .filter(|link| link.role_id == role_id)
            .filter_map(|link| tables.permissions.get(&link.permission_id).cloned())
            .collect();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(permissions)
    }

    async fn assign_group_role(&self, link: GroupRole) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&link.group_id) || !tables.roles.contains_key(&link.role_id)
        {
            return Err(AppError::NotFound(
                "failed to assign role to group: referenced entity does not exist".to_owned(),
            ));
        }

        Ok(tables.group_roles.insert(link))
    }

    async fn remove_group_role(&self, link: GroupRole) -> AppResult<bool> {
        Ok(self.tables.write().await.group_roles.remove(&link))
    }

    async fn list_group_roles(&self, group_id: GroupId) -> AppResult<Vec<Role>> {
        let tables = self.tables.read().await;
        let mut roles: Vec<Role> = tables
            .group_roles
            .iter()
            .filter(|link| link.group_id == group_id)
            .filter_map(|link| tables.roles.get(&link.role_id).cloned())
            .collect();
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    async fn add_membership(&self, membership: Membership) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&membership.group_id) {
            return Err(AppError::NotFound(format!(
                "group '{}' was not found",
                membership.group_id
            )));
        }

        let key = (membership.user_id, membership.group_id);
        if tables.memberships.contains_key(&key) {
            return Ok(false);
        }

        tables.memberships.insert(key, membership);
        Ok(true)
    }

    async fn remove_membership(&self, user_id: UserId, group_id: GroupId) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .memberships
            .remove(&(user_id, group_id))
            .is_some())
    }
}

#[async_trait]
impl CascadeMutationStore for InMemoryRbacStore {
    async fn begin_mutation(&self) -> AppResult<Box<dyn MutationTransaction>> {
        let failure_step = *self.failure_step.lock().await;
        if failure_step == Some(MutationStep::Begin) {
            return Err(AppError::Internal(
                "failed to begin transaction: injected failure".to_owned(),
            ));
        }

        let guard = self.tables.clone().write_owned().await;
        let working = RbacTables::clone(&guard);

        Ok(Box::new(InMemoryMutationTransaction {
            guard: Some(guard),
            working,
            failure_step,
        }))
    }
}

struct InMemoryMutationTransaction {
    guard: Option<OwnedRwLockWriteGuard<RbacTables>>,
    working: RbacTables,
    failure_step: Option<MutationStep>,
}

impl InMemoryMutationTransaction {
    fn check(&self, step: MutationStep) -> AppResult<()> {
        if self.guard.is_none() {
            return Err(AppError::Internal("transaction is already closed".to_owned()));
        }

        if self.failure_step == Some(step) {
            return Err(AppError::Internal(format!(
                "failed to {step}: injected failure"
            )));
        }

        Ok(())
    }
}

fn removed(before: usize, after: usize) -> u64 {
    u64::try_from(before - after).unwrap_or(u64::MAX)
}

#[async_trait]
impl MutationTransaction for InMemoryMutationTransaction {
    async fn role_exists(&mut self, role_id: RoleId) -> AppResult<bool> {
        self.check(MutationStep::LockRole)?;
        Ok(self.working.roles.contains_key(&role_id))
    }

    async fn clear_role_permissions(&mut self, role_id: RoleId) -> AppResult<u64> {
        self.check(MutationStep::ClearRolePermissions)?;
        let before = self.working.role_permissions.len();
        self.working
            .role_permissions
            .retain(|link| link.role_id != role_id);
        Ok(removed(before, self.working.role_permissions.len()))
    }

    async fn clear_role_group_links(&mut self, role_id: RoleId) -> AppResult<u64> {
        self.check(MutationStep::ClearRoleGroupLinks)?;
        let before = self.working.group_roles.len();
        self.working.group_roles.retain(|link| link.role_id != role_id);
        Ok(removed(before, self.working.group_roles.len()))
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<u64> {
        self.check(MutationStep::DeleteRole)?;

        let referenced = self
            .working
            .role_permissions
            .iter()
            .any(|link| link.role_id == role_id)
            || self.working.group_roles.iter().any(|link| link.role_id == role_id);
        if referenced {
            return Err(AppError::Internal(format!(
                "failed to delete role '{role_id}': still referenced by join rows"
            )));
        }

        Ok(u64::from(self.working.roles.remove(&role_id).is_some()))
    }

    async fn group_exists(&mut self, group_id: GroupId) -> AppResult<bool> {
        self.check(MutationStep::LockGroup)?;
        Ok(self.working.groups.contains_key(&group_id))
    }

    async fn clear_group_roles(&mut self, group_id: GroupId) -> AppResult<u64> {
        self.check(MutationStep::ClearGroupRoles)?;
        let before = self.working.group_roles.len();
        self.working.group_roles.retain(|link| link.group_id != group_id);
        Ok(removed(before, self.working.group_roles.len()))
    }

    async fn clear_group_memberships(&mut self, group_id: GroupId) -> AppResult<u64> {
        self.check(MutationStep::ClearGroupMemberships)?;
        let before = self.working.memberships.len();
        self.working
            .memberships
            .retain(|(_, member_group_id), _| *member_group_id != group_id);
        Ok(removed(before, self.working.memberships.len()))
    }

    async fn delete_group(&mut self, group_id: GroupId) -> AppResult<u64> {
        self.check(MutationStep::DeleteGroup)?;

        let referenced = self
            .working
            .group_roles
            .iter()
            .any(|link| link.group_id == group_id)
            || self
                .working
                .memberships
                .keys()
                .any(|(_, member_group_id)| *member_group_id == group_id);
        if referenced {
            return Err(AppError::Internal(format!(
                "failed to delete group '{group_id}': still referenced by join rows"
            )));
        }

        Ok(u64::from(self.working.groups.remove(&group_id).is_some()))
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.check(MutationStep::Commit)?;

        if let Some(mut guard) = self.guard.take() {
            *guard = std::mem::take(&mut self.working);
        }

        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.guard = None;
        Ok(())
    }
}
