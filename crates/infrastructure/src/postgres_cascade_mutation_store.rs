use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use warden_application::{CascadeMutationStore, MutationTransaction};
use warden_core::{AppError, AppResult};
use warden_domain::{GroupId, RoleId};

#[cfg(test)]
mod tests;

/// PostgreSQL store opening one database transaction per cascading delete.
#[derive(Clone)]
pub struct PostgresCascadeMutationStore {
    pool: PgPool,
}

impl PostgresCascadeMutationStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CascadeMutationStore for PostgresCascadeMutationStore {
    async fn begin_mutation(&self) -> AppResult<Box<dyn MutationTransaction>> {
        let transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        Ok(Box::new(PostgresMutationTransaction {
            transaction: Some(transaction),
        }))
    }
}

/// Open transaction handle. `None` once committed or rolled back.
struct PostgresMutationTransaction {
    transaction: Option<Transaction<'static, Postgres>>,
}

impl PostgresMutationTransaction {
    fn open(&mut self) -> AppResult<&mut Transaction<'static, Postgres>> {
        self.transaction
            .as_mut()
            .ok_or_else(|| AppError::Internal("transaction is already closed".to_owned()))
    }

    async fn exists(&mut self, sql: &str, id: uuid::Uuid, kind: &str) -> AppResult<bool> {
        let transaction = self.open()?;

        // Row lock keeps concurrent link inserts from racing the delete.
        let found = sqlx::query_scalar::<_, uuid::Uuid>(sql)
            .bind(id)
            .fetch_optional(&mut **transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to lock {kind}: {error}")))?;

        Ok(found.is_some())
    }

    async fn execute(&mut self, sql: &str, id: uuid::Uuid, operation: &str) -> AppResult<u64> {
        let transaction = self.open()?;

        let result = sqlx::query(sql)
            .bind(id)
            .execute(&mut **transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to {operation}: {error}")))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MutationTransaction for PostgresMutationTransaction {
    async fn role_exists(&mut self, role_id: RoleId) -> AppResult<bool> {
        self.exists(
            "SELECT id FROM roles WHERE id = $1 FOR UPDATE",
            role_id.as_uuid(),
            "role",
        )
        .await
    }

    async fn clear_role_permissions(&mut self, role_id: RoleId) -> AppResult<u64> {
        self.execute(
            "DELETE FROM role_permissions WHERE role_id = $1",
            role_id.as_uuid(),
            "delete role permissions",
        )
        .await
    }

    async fn clear_role_group_links(&mut self, role_id: RoleId) -> AppResult<u64> {
        self.execute(
            "DELETE FROM group_roles WHERE role_id = $1",
            role_id.as_uuid(),
            "delete role group links",
        )
        .await
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<u64> {
        self.execute(
            "DELETE FROM roles WHERE id = $1",
            role_id.as_uuid(),
            "delete role",
        )
        .await
    }

    async fn group_exists(&mut self, group_id: GroupId) -> AppResult<bool> {
        self.exists(
            "SELECT id FROM role_groups WHERE id = $1 FOR UPDATE",
            group_id.as_uuid(),
            "group",
        )
        .await
    }

    async fn clear_group_roles(&mut self, group_id: GroupId) -> AppResult<u64> {
        self.execute(
            "DELETE FROM group_roles WHERE group_id = $1",
            group_id.as_uuid(),
            "delete group roles",
        )
        .await
    }

    async fn clear_group_memberships(&mut self, group_id: GroupId) -> AppResult<u64> {
        self.execute(
            "DELETE FROM user_groups WHERE group_id = $1",
            group_id.as_uuid(),
            "delete group memberships",
        )
        .await
    }

    async fn delete_group(&mut self, group_id: GroupId) -> AppResult<u64> {
        self.execute(
            "DELETE FROM role_groups WHERE id = $1",
            group_id.as_uuid(),
            "delete group",
        )
        .await
    }

    async fn commit(&mut self) -> AppResult<()> {
        let transaction = self
            .transaction
            .take()
            .ok_or_else(|| AppError::Internal("transaction is already closed".to_owned()))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }

    async fn rollback(&mut self) -> AppResult<()> {
        let Some(transaction) = self.transaction.take() else {
            tracing::debug!("rollback requested on closed transaction");
            return Ok(());
        };

        tracing::debug!("rolling back cascade transaction");
        transaction.rollback().await.map_err(|error| {
            AppError::Internal(format!("failed to roll back transaction: {error}"))
        })
    }
}
