//! Atomic, cascade-safe deletion of roles and role groups.

mod ports;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use warden_core::{AppError, AppResult};
use warden_domain::{GroupId, RoleId};

pub use ports::{CascadeMutationStore, MutationStep, MutationTransaction};

/// Application service deleting graph entities together with their join rows.
///
/// Each call runs in its own transaction. Either every statement commits or
/// the transaction is rolled back and the caller gets one error value.
#[derive(Clone)]
pub struct CascadeMutationService {
    store: Arc<dyn CascadeMutationStore>,
}

impl CascadeMutationService {
    /// Creates a new service from a store implementation.
    #[must_use]
    pub fn new(store: Arc<dyn CascadeMutationStore>) -> Self {
        Self { store }
    }

    /// Deletes a role, its permission grants, and its group links.
    ///
    /// Returns [`AppError::NotFound`] without side effects when the role does
    /// not exist and [`AppError::Internal`] for any storage failure.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut transaction = self.begin("role", role_id.to_string()).await?;
        let outcome = cascade_role(transaction.as_mut(), role_id).await;
        finish(transaction.as_mut(), "role", role_id.to_string(), outcome).await
    }

    /// Deletes a role group, its role links, and its memberships.
    ///
    /// Returns [`AppError::NotFound`] without side effects when the group
    /// does not exist and [`AppError::Internal`] for any storage failure.
    pub async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        let mut transaction = self.begin("group", group_id.to_string()).await?;
        let outcome = cascade_group(transaction.as_mut(), group_id).await;
        finish(transaction.as_mut(), "group", group_id.to_string(), outcome).await
    }

    async fn begin(&self, kind: &str, id: String) -> AppResult<Box<dyn MutationTransaction>> {
        self.store
            .begin_mutation()
            .await
            .map_err(|error| step_failure(kind, id.as_str(), MutationStep::Begin, error))
    }
}

async fn cascade_role(transaction: &mut dyn MutationTransaction, role_id: RoleId) -> AppResult<()> {
    let id = role_id.to_string();

    if !transaction
        .role_exists(role_id)
        .await
        .map_err(|error| step_failure("role", &id, MutationStep::LockRole, error))?
    {
        return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
    }

    let permission_links = transaction
        .clear_role_permissions(role_id)
        .await
        .map_err(|error| step_failure("role", &id, MutationStep::ClearRolePermissions, error))?;
    let group_links = transaction
        .clear_role_group_links(role_id)
        .await
        .map_err(|error| step_failure("role", &id, MutationStep::ClearRoleGroupLinks, error))?;
    let deleted = transaction
        .delete_role(role_id)
        .await
        .map_err(|error| step_failure("role", &id, MutationStep::DeleteRole, error))?;

    if deleted == 0 {
        return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
    }

    transaction
        .commit()
        .await
        .map_err(|error| step_failure("role", &id, MutationStep::Commit, error))?;

    tracing::info!(
        %role_id,
        permission_links,
        group_links,
        "deleted role with cascaded links"
    );

    Ok(())
}

async fn cascade_group(
    transaction: &mut dyn MutationTransaction,
    group_id: GroupId,
) -> AppResult<()> {
    let id = group_id.to_string();

    if !transaction
        .group_exists(group_id)
        .await
        .map_err(|error| step_failure("group", &id, MutationStep::LockGroup, error))?
    {
        return Err(AppError::NotFound(format!(
            "group '{group_id}' was not found"
        )));
    }

    let role_links = transaction
        .clear_group_roles(group_id)
        .await
        .map_err(|error| step_failure("group", &id, MutationStep::ClearGroupRoles, error))?;
    let memberships = transaction
        .clear_group_memberships(group_id)
        .await
        .map_err(|error| step_failure("group", &id, MutationStep::ClearGroupMemberships, error))?;
    let deleted = transaction
        .delete_group(group_id)
        .await
        .map_err(|error| step_failure("group", &id, MutationStep::DeleteGroup, error))?;

    if deleted == 0 {
        return Err(AppError::NotFound(format!(
            "group '{group_id}' was not found"
        )));
    }

    transaction
        .commit()
        .await
        .map_err(|error| step_failure("group", &id, MutationStep::Commit, error))?;

    tracing::info!(
        %group_id,
        role_links,
        memberships,
        "deleted group with cascaded links"
    );

    Ok(())
}

// Rollback runs on every failed outcome, a failed commit included.
async fn finish(
    transaction: &mut dyn MutationTransaction,
    kind: &str,
    id: String,
    outcome: AppResult<()>,
) -> AppResult<()> {
    let Err(error) = outcome else {
        return Ok(());
    };

    if let Err(rollback_error) = transaction.rollback().await {
        tracing::error!(
            kind,
            id = id.as_str(),
            error = %rollback_error,
            "rollback after failed cascading delete also failed"
        );
    }

    if !matches!(error, AppError::NotFound(_)) {
        tracing::error!(kind, id = id.as_str(), %error, "cascading delete rolled back");
    }

    Err(error)
}

fn step_failure(kind: &str, id: &str, step: MutationStep, error: AppError) -> AppError {
    AppError::Internal(format!(
        "failed to delete {kind} '{id}' at step '{step}': {error}"
    ))
}
