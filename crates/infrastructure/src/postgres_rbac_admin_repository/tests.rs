use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use warden_application::RbacAdminRepository;
use warden_core::{AppError, UserId};
use warden_domain::{GroupId, Membership, Permission, PermissionId, Role, RoleGroup, RoleId, RolePermission};

use super::PostgresRbacAdminRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for rbac admin tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
async fn duplicate_role_name_maps_to_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacAdminRepository::new(pool);
    let name = unique("role");
    let first = Role::new(RoleId::new(), name.clone(), "", Utc::now());
    let second = Role::new(RoleId::new(), name, "", Utc::now());

    let (Ok(first), Ok(second)) = (first, second) else {
        panic!("invalid test roles");
    };

    assert!(repository.create_role(&first).await.is_ok());
    assert!(matches!(
        repository.create_role(&second).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn link_inserts_are_idempotent() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacAdminRepository::new(pool);
    let role = Role::new(RoleId::new(), unique("role"), "", Utc::now());
    let permission = Permission::new(PermissionId::new(), unique("perm"), unique("res"), "read");
    let group = RoleGroup::new(GroupId::new(), unique("group"), "", Utc::now());

    let (Ok(role), Ok(permission), Ok(group)) = (role, permission, group) else {
        panic!("invalid test entities");
    };

    assert!(repository.create_role(&role).await.is_ok());
    assert!(repository.create_permission(&permission).await.is_ok());
    assert!(repository.create_group(&group).await.is_ok());

    let link = RolePermission {
        role_id: role.id(),
        permission_id: permission.id(),
    };
    assert!(matches!(repository.grant_role_permission(link).await, Ok(true)));
    assert!(matches!(repository.grant_role_permission(link).await, Ok(false)));

    let membership = Membership {
        user_id: UserId::new(),
        group_id: group.id(),
        assigned_at: Utc::now(),
    };
    assert!(matches!(repository.add_membership(membership).await, Ok(true)));
    assert!(matches!(repository.add_membership(membership).await, Ok(false)));

    let grants = repository.list_role_permissions(role.id()).await;
    assert!(matches!(grants, Ok(grants) if grants.len() == 1));
}

#[tokio::test]
async fn link_to_unknown_role_maps_to_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacAdminRepository::new(pool);
    let permission = match Permission::new(PermissionId::new(), unique("perm"), unique("res"), "read") {
        Ok(permission) => permission,
        Err(error) => panic!("invalid permission: {error}"),
    };
    assert!(repository.create_permission(&permission).await.is_ok());

    let result = repository
        .grant_role_permission(RolePermission {
            role_id: RoleId::new(),
            permission_id: permission.id(),
        })
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
