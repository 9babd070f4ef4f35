//! Effective-permission resolution over the user → group → role → permission graph.

mod ports;


use std::collections::HashMap;
use std::sync::Arc;

use warden_core::{AppError, AppResult, UserId};
use warden_domain::{Permission, Role, RoleGroup};

pub use ports::{PermissionGraphRepository, PermissionPath};

/// Deduplicated permissions, roles, and groups reachable from one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    /// Permissions reachable through any membership, ordered by name.
    pub permissions: Vec<Permission>,
    /// Roles on at least one reachable permission path, ordered by name.
    pub roles: Vec<Role>,
    /// Groups on at least one reachable permission path, ordered by name.
    pub groups: Vec<RoleGroup>,
}

impl EffectivePermissions {
    /// Returns the permission names, in the same order as `permissions`.
    #[must_use]
    pub fn permission_names(&self) -> Vec<String> {
        self.permissions
            .iter()
            .map(|permission| permission.name().to_owned())
            .collect()
    }
}

/// Application service computing a user's effective permissions.
///
/// Every call hits the repository; nothing is cached between requests.
#[derive(Clone)]
pub struct PermissionResolutionService {
    repository: Arc<dyn PermissionGraphRepository>,
}

impl PermissionResolutionService {
    /// Creates a new resolution service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn PermissionGraphRepository>) -> Self {
        Self { repository }
    }

    /// Resolves the deduplicated permissions, roles, and groups of a user.
    ///
    /// A user without memberships resolves to empty sets. Storage failures
    /// surface as [`AppError::Internal`] and are never read as "no grants".
    pub async fn resolve(&self, user_id: UserId) -> AppResult<EffectivePermissions> {
        let paths = self
            .repository
            .list_permission_paths_for_user(user_id)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to resolve permissions for user '{user_id}': {error}"
                ))
            })?;

        let path_count = paths.len();
        let effective = collapse_paths(paths);

        tracing::debug!(
            %user_id,
            path_count,
            permission_count = effective.permissions.len(),
            "resolved effective permissions"
        );

        Ok(effective)
    }
}

fn collapse_paths(paths: Vec<PermissionPath>) -> EffectivePermissions {
    let mut permissions = HashMap::new();
    let mut roles = HashMap::new();
    let mut groups = HashMap::new();

    // Entity attributes are invariant per id, so overwriting on collision is lossless.
    for path in paths {
        permissions.insert(path.permission.id(), path.permission);
        roles.insert(path.role.id(), path.role);
        groups.insert(path.group.id(), path.group);
    }

    let mut permissions: Vec<Permission> = permissions.into_values().collect();
    permissions.sort_by(|left, right| left.name().cmp(right.name()));
    let mut roles: Vec<Role> = roles.into_values().collect();
    roles.sort_by(|left, right| left.name().cmp(right.name()));
    let mut groups: Vec<RoleGroup> = groups.into_values().collect();
    groups.sort_by(|left, right| left.name().cmp(right.name()));

    EffectivePermissions {
        permissions,
        roles,
        groups,
    }
}
