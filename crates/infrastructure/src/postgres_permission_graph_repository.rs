use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use warden_application::{PermissionGraphRepository, PermissionPath};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{GroupId, Permission, PermissionId, Role, RoleGroup, RoleId};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed read model of the permission graph.
#[derive(Clone)]
pub struct PostgresPermissionGraphRepository {
    pool: PgPool,
}

impl PostgresPermissionGraphRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionPathRow {
    permission_id: uuid::Uuid,
    permission_name: String,
    permission_resource: String,
    permission_action: String,
    role_id: uuid::Uuid,
    role_name: String,
    role_description: String,
    role_created_at: DateTime<Utc>,
    group_id: uuid::Uuid,
    group_name: String,
    group_description: String,
    group_created_at: DateTime<Utc>,
}

#[async_trait]
impl PermissionGraphRepository for PostgresPermissionGraphRepository {
    async fn list_permission_paths_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionPath>> {
        let rows = sqlx::query_as::<_, PermissionPathRow>(
            r#"
            SELECT
                permissions.id AS permission_id,
                permissions.name AS permission_name,
                permissions.resource AS permission_resource,
                permissions.action AS permission_action,
                roles.id AS role_id,
                roles.name AS role_name,
                roles.description AS role_description,
                roles.created_at AS role_created_at,
                role_groups.id AS group_id,
                role_groups.name AS group_name,
                role_groups.description AS group_description,
                role_groups.created_at AS group_created_at
            FROM permissions
            INNER JOIN role_permissions
                ON role_permissions.permission_id = permissions.id
            INNER JOIN group_roles
                ON group_roles.role_id = role_permissions.role_id
            INNER JOIN user_groups
                ON user_groups.group_id = group_roles.group_id
            INNER JOIN roles
                ON roles.id = role_permissions.role_id
            INNER JOIN role_groups
                ON role_groups.id = user_groups.group_id
            WHERE user_groups.user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load permission paths for user '{user_id}': {error}"
            ))
        })?;

        rows.into_iter().map(path_from_row).collect()
    }
}

fn path_from_row(row: PermissionPathRow) -> AppResult<PermissionPath> {
    Ok(PermissionPath {
        permission: Permission::new(
            PermissionId::from_uuid(row.permission_id),
            row.permission_name,
            row.permission_resource,
            row.permission_action,
        )?,
        role: Role::new(
            RoleId::from_uuid(row.role_id),
            row.role_name,
            row.role_description,
            row.role_created_at,
        )?,
        group: RoleGroup::new(
            GroupId::from_uuid(row.group_id),
            row.group_name,
            row.group_description,
            row.group_created_at,
        )?,
    })
}
