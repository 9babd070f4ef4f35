use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use warden_application::{PermissionGraphRepository, PermissionResolutionService, RbacAdminRepository};
use warden_core::UserId;
use warden_domain::{
    GroupId, GroupRole, Membership, Permission, PermissionId, Role, RoleGroup, RoleId,
    RolePermission,
};

use super::PostgresPermissionGraphRepository;
use crate::PostgresRbacAdminRepository;

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
        panic!("failed to run migrations for permission graph tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
async fn permission_reached_through_two_groups_is_returned_per_path_and_resolved_once() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let admin = PostgresRbacAdminRepository::new(pool.clone());
    let graph = PostgresPermissionGraphRepository::new(pool);
    let user_id = UserId::new();

    let permission = match Permission::new(
        PermissionId::new(),
        unique("perm"),
        unique("resource"),
        "read",
    ) {
        Ok(permission) => permission,
        Err(error) => panic!("invalid permission: {error}"),
    };
    assert!(admin.create_permission(&permission).await.is_ok());

    let mut role_ids = Vec::new();
    for _ in 0..2 {
        let role = match Role::new(RoleId::new(), unique("role"), "", Utc::now()) {
            Ok(role) => role,
            Err(error) => panic!("invalid role: {error}"),
        };
        let group = match RoleGroup::new(GroupId::new(), unique("group"), "", Utc::now()) {
            Ok(group) => group,
            Err(error) => panic!("invalid group: {error}"),
        };

        assert!(admin.create_role(&role).await.is_ok());
        assert!(admin.create_group(&group).await.is_ok());
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
        role_ids.push(role.id());
    }

    let paths = graph.list_permission_paths_for_user(user_id).await;
    assert!(matches!(paths, Ok(ref paths) if paths.len() == 2));

    let service = PermissionResolutionService::new(std::sync::Arc::new(graph));
    match service.resolve(user_id).await {
        Ok(effective) => {
            assert_eq!(effective.permissions.len(), 1);
            assert_eq!(effective.roles.len(), 2);
            assert_eq!(effective.groups.len(), 2);
        }
        Err(error) => panic!("resolution failed: {error}"),
    }
}

#[tokio::test]
async fn user_without_memberships_has_no_paths() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let graph = PostgresPermissionGraphRepository::new(pool);

    let paths = graph.list_permission_paths_for_user(UserId::new()).await;

    assert!(matches!(paths, Ok(paths) if paths.is_empty()));
}
