use std::fmt::{Display, Formatter};

use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::{GroupId, RoleId};

/// Statements a cascading deletion is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationStep {
    /// Opening the transaction.
    Begin,
    /// Locking the role row and checking that it exists.
    LockRole,
    /// Deleting `role_permissions` rows of a role.
    ClearRolePermissions,
    /// Deleting `group_roles` rows of a role.
    ClearRoleGroupLinks,
    /// Deleting the role row.
    DeleteRole,
    /// Locking the group row and checking that it exists.
    LockGroup,
    /// Deleting `group_roles` rows of a group.
    ClearGroupRoles,
    /// Deleting `user_groups` rows of a group.
    ClearGroupMemberships,
    /// Deleting the group row.
    DeleteGroup,
    /// Committing the transaction.
    Commit,
}

impl MutationStep {
    /// Returns a stable name used in logs and error messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::LockRole => "lock_role",
            Self::ClearRolePermissions => "clear_role_permissions",
            Self::ClearRoleGroupLinks => "clear_role_group_links",
            Self::DeleteRole => "delete_role",
            Self::LockGroup => "lock_group",
            Self::ClearGroupRoles => "clear_group_roles",
            Self::ClearGroupMemberships => "clear_group_memberships",
            Self::DeleteGroup => "delete_group",
            Self::Commit => "commit",
        }
    }
}

impl Display for MutationStep {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Store port opening transaction-scoped mutation handles.
#[async_trait]
pub trait CascadeMutationStore: Send + Sync {
    /// Opens a transaction. Nothing done through the handle is visible to
    /// other readers until [`MutationTransaction::commit`] succeeds.
    async fn begin_mutation(&self) -> AppResult<Box<dyn MutationTransaction>>;
}

/// One open transaction over the permission graph tables.
///
/// Row-count results report how many rows a statement removed. Once `commit`
/// or `rollback` has been called the handle is closed and `rollback` becomes
/// a no-op; dropping an open handle discards its changes.
#[async_trait]
pub trait MutationTransaction: Send {
    /// Returns whether the role exists.
    async fn role_exists(&mut self, role_id: RoleId) -> AppResult<bool>;

    /// Deletes every permission grant of the role.
    async fn clear_role_permissions(&mut self, role_id: RoleId) -> AppResult<u64>;

    /// Deletes every group link of the role.
    async fn clear_role_group_links(&mut self, role_id: RoleId) -> AppResult<u64>;

    /// Deletes the role row.
    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<u64>;

    /// Returns whether the group exists.
    async fn group_exists(&mut self, group_id: GroupId) -> AppResult<bool>;

    /// Deletes every role link of the group.
    async fn clear_group_roles(&mut self, group_id: GroupId) -> AppResult<u64>;

    /// Deletes every membership of the group.
    async fn clear_group_memberships(&mut self, group_id: GroupId) -> AppResult<u64>;

    /// Deletes the group row.
    async fn delete_group(&mut self, group_id: GroupId) -> AppResult<u64>;

    /// Publishes all changes atomically.
    async fn commit(&mut self) -> AppResult<()>;

    /// Discards all changes.
    async fn rollback(&mut self) -> AppResult<()>;
}
