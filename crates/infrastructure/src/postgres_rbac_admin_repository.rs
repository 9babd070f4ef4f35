use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use warden_application::RbacAdminRepository;
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    GroupId, GroupRole, Membership, Permission, PermissionId, Role, RoleGroup, RoleId,
    RolePermission,
};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for permission graph administration.
#[derive(Clone)]
pub struct PostgresRbacAdminRepository {
    pool: PgPool,
}

impl PostgresRbacAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: uuid::Uuid,
    name: String,
    resource: String,
    action: String,
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Role::new(
            RoleId::from_uuid(row.id),
            row.name,
            row.description,
            row.created_at,
        )
    }
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        Permission::new(
            PermissionId::from_uuid(row.id),
            row.name,
            row.resource,
            row.action,
        )
    }
}

impl TryFrom<GroupRow> for RoleGroup {
    type Error = AppError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        RoleGroup::new(
            GroupId::from_uuid(row.id),
            row.name,
            row.description,
            row.created_at,
        )
    }
}

#[async_trait]
impl RbacAdminRepository for PostgresRbacAdminRepository {
    async fn create_role(&self, role: &Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name())
        .bind(role.description())
        .bind(role.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "role", role.name()))?;

        Ok(())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3
            WHERE id = $1
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name())
        .bind(role.description())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "role", role.name()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id()
            )));
        }

        Ok(())
    }

    async fn create_permission(&self, permission: &Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, name, resource, action)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.name())
        .bind(permission.resource())
        .bind(permission.action())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "permission", permission.name()))?;

        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, resource, action
            FROM permissions
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, resource, action
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?;

        row.map(Permission::try_from).transpose()
    }

    async fn create_group(&self, group: &RoleGroup) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_groups (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(group.id().as_uuid())
        .bind(group.name())
        .bind(group.description())
        .bind(group.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "group", group.name()))?;

        Ok(())
    }

    async fn list_groups(&self) -> AppResult<Vec<RoleGroup>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name, description, created_at
            FROM role_groups
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list groups: {error}")))?;

        rows.into_iter().map(RoleGroup::try_from).collect()
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<RoleGroup>> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name, description, created_at
            FROM role_groups
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find group: {error}")))?;

        row.map(RoleGroup::try_from).transpose()
    }

    async fn grant_role_permission(&self, link: RolePermission) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(link.role_id.as_uuid())
        .bind(link.permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| map_link_error(error, "grant permission to role"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_role_permission(&self, link: RolePermission) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1 AND permission_id = $2
            "#,
        )
        .bind(link.role_id.as_uuid())
        .bind(link.permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to revoke permission from role: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.id, permissions.name, permissions.resource, permissions.action
            FROM permissions
            INNER JOIN role_permissions
                ON role_permissions.permission_id = permissions.id
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role permissions: {error}"))
        })?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    async fn assign_group_role(&self, link: GroupRole) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_roles (group_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, role_id) DO NOTHING
            "#,
        )
        .bind(link.group_id.as_uuid())
        .bind(link.role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| map_link_error(error, "assign role to group"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_group_role(&self, link: GroupRole) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM group_roles
            WHERE group_id = $1 AND role_id = $2
            "#,
        )
        .bind(link.group_id.as_uuid())
        .bind(link.role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove role from group: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_group_roles(&self, group_id: GroupId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT roles.id, roles.name, roles.description, roles.created_at
            FROM roles
            INNER JOIN group_roles
                ON group_roles.role_id = roles.id
            WHERE group_roles.group_id = $1
            ORDER BY roles.name
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list group roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn add_membership(&self, membership: Membership) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id, assigned_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, group_id) DO NOTHING
            "#,
        )
        .bind(membership.user_id.as_uuid())
        .bind(membership.group_id.as_uuid())
        .bind(membership.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(|error| map_link_error(error, "add group member"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_membership(&self, user_id: UserId, group_id: GroupId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_groups
            WHERE user_id = $1 AND group_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(group_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove group member: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_write_error(error: sqlx::Error, kind: &str, name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("{kind} '{name}' already exists"));
    }

    AppError::Internal(format!("failed to save {kind}: {error}"))
}

fn map_link_error(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!(
            "failed to {operation}: referenced entity does not exist"
        ));
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
