use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use warden_application::{
    CascadeMutationService, CascadeMutationStore, PermissionGraphRepository, RbacAdminRepository,
};
use warden_core::{AppError, UserId};
use warden_domain::{
    GroupId, GroupRole, Membership, Permission, PermissionId, Role, RoleGroup, RoleId,
    RolePermission,
};

use super::PostgresCascadeMutationStore;
use crate::{PostgresPermissionGraphRepository, PostgresRbacAdminRepository};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for cascade mutation tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

struct Seed {
    user_id: UserId,
    role_id: RoleId,
    group_id: GroupId,
}

async fn seed(admin: &PostgresRbacAdminRepository) -> Seed {
    let role = Role::new(RoleId::new(), unique("role"), "", Utc::now());
    let group = RoleGroup::new(GroupId::new(), unique("group"), "", Utc::now());
    let permission = Permission::new(PermissionId::new(), unique("perm"), unique("res"), "read");
    let (Ok(role), Ok(group), Ok(permission)) = (role, group, permission) else {
        panic!("invalid seed entities");
    };
    let user_id = UserId::new();

    assert!(admin.create_role(&role).await.is_ok());
    assert!(admin.create_group(&group).await.is_ok());
    assert!(admin.create_permission(&permission).await.is_ok());
    assert!(
        admin
            .grant_role_permission(RolePermission {
                role_id: role.id(),
                permission_id: permission.id(),
            })
            .await
            .is_ok()
    );
    assert!(
        admin
            .assign_group_role(GroupRole {
                group_id: group.id(),
                role_id: role.id(),
            })
            .await
            .is_ok()
    );
    assert!(
        admin
            .add_membership(Membership {
                user_id,
                group_id: group.id(),
                assigned_at: Utc::now(),
            })
            .await
            .is_ok()
    );

    Seed {
        user_id,
        role_id: role.id(),
        group_id: group.id(),
    }
}

#[tokio::test]
async fn delete_role_removes_links_and_row() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let admin = PostgresRbacAdminRepository::new(pool.clone());
    let graph = PostgresPermissionGraphRepository::new(pool.clone());
    let service = CascadeMutationService::new(Arc::new(PostgresCascadeMutationStore::new(pool)));
    let seed = seed(&admin).await;

    assert!(service.delete_role(seed.role_id).await.is_ok());

    assert!(matches!(admin.find_role(seed.role_id).await, Ok(None)));
    assert!(matches!(
        admin.list_group_roles(seed.group_id).await,
        Ok(roles) if roles.is_empty()
    ));
    assert!(matches!(
        graph.list_permission_paths_for_user(seed.user_id).await,
        Ok(paths) if paths.is_empty()
    ));
}

#[tokio::test]
async fn skipped_link_cleanup_fails_and_rolls_back() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let admin = PostgresRbacAdminRepository::new(pool.clone());
    let graph = PostgresPermissionGraphRepository::new(pool.clone());
    let store = PostgresCascadeMutationStore::new(pool);
    let seed = seed(&admin).await;

    let mut transaction = match store.begin_mutation().await {
        Ok(transaction) => transaction,
        Err(error) => panic!("failed to begin: {error}"),
    };
    assert!(matches!(
        transaction.clear_role_permissions(seed.role_id).await,
        Ok(1)
    ));
    // group_roles still references the role, so the foreign key rejects this.
    assert!(transaction.delete_role(seed.role_id).await.is_err());
    assert!(transaction.rollback().await.is_ok());
    assert!(transaction.rollback().await.is_ok());

    assert!(matches!(admin.find_role(seed.role_id).await, Ok(Some(_))));
    assert!(matches!(
        graph.list_permission_paths_for_user(seed.user_id).await,
        Ok(paths) if paths.len() == 1
    ));
}

#[tokio::test]
async fn delete_group_removes_memberships() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let admin = PostgresRbacAdminRepository::new(pool.clone());
    let graph = PostgresPermissionGraphRepository::new(pool.clone());
    let service = CascadeMutationService::new(Arc::new(PostgresCascadeMutationStore::new(pool)));
    let seed = seed(&admin).await;

    assert!(service.delete_group(seed.group_id).await.is_ok());
    assert!(matches!(
        service.delete_group(seed.group_id).await,
        Err(AppError::NotFound(_))
    ));

    assert!(matches!(admin.find_group(seed.group_id).await, Ok(None)));
    assert!(matches!(admin.find_role(seed.role_id).await, Ok(Some(_))));
    assert!(matches!(
        graph.list_permission_paths_for_user(seed.user_id).await,
        Ok(paths) if paths.is_empty()
    ));
}
