use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, delete, get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use warden_core::AppError;
use warden_domain::AdminPermission;

use crate::middleware::{self, PermissionGate};
use crate::handlers;
use crate::state::AppState;


pub fn build_router(app_state: AppState, cors_allowed_origin: Option<&str>) -> Result<Router, AppError> {
    let guard = |route: MethodRouter<AppState>, required: Option<AdminPermission>| {
        route.route_layer(from_fn_with_state(
            PermissionGate {
                state: app_state.clone(),
                required,
            },
            middleware::require_permission,
        ))
    };

    let protected_routes = Router::new()
        .route(
            "/api/me/permissions",
            guard(get(handlers::me::my_permissions_handler), None),
        )
        .route(
            "/api/roles",
            guard(
                get(handlers::roles::list_roles_handler),
                Some(AdminPermission::ReadRole),
            )
            .merge(guard(
                post(handlers::roles::create_role_handler),
                Some(AdminPermission::CreateRole),
            )),
        )
        .route(
            "/api/roles/{role_id}",
            guard(
                get(handlers::roles::get_role_handler),
                Some(AdminPermission::ReadRole),
            )
            .merge(guard(
                put(handlers::roles::update_role_handler),
                Some(AdminPermission::UpdateRole),
            ))
            .merge(guard(
                delete(handlers::roles::delete_role_handler),
                Some(AdminPermission::DeleteRole),
            )),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            guard(
                get(handlers::roles::list_role_permissions_handler),
                Some(AdminPermission::ReadRole),
            ),
        )
        .route(
            "/api/roles/{role_id}/permissions/{permission_id}",
            guard(
                put(handlers::roles::grant_role_permission_handler)
                    .delete(handlers::roles::revoke_role_permission_handler),
                Some(AdminPermission::ManageRolePermissions),
            ),
        )
        .route(
            "/api/permissions",
            guard(
                get(handlers::permissions::list_permissions_handler),
                Some(AdminPermission::ReadPermission),
            )
            .merge(guard(
                post(handlers::permissions::create_permission_handler),
                Some(AdminPermission::CreatePermission),
            )),
        )
        .route(
            "/api/groups",
            guard(
                get(handlers::groups::list_groups_handler),
                Some(AdminPermission::ReadGroup),
            )
            .merge(guard(
                post(handlers::groups::create_group_handler),
                Some(AdminPermission::CreateGroup),
            )),
        )
        .route(
            "/api/groups/{group_id}",
            guard(
                get(handlers::groups::get_group_handler),
                Some(AdminPermission::ReadGroup),
            )
            .merge(guard(
                delete(handlers::groups::delete_group_handler),
                Some(AdminPermission::DeleteGroup),
            )),
        )
        .route(
            "/api/groups/{group_id}/roles",
            guard(
                get(handlers::groups::list_group_roles_handler),
                Some(AdminPermission::ReadGroup),
            ),
        )
        .route(
            "/api/groups/{group_id}/roles/{role_id}",
            guard(
                put(handlers::groups::assign_group_role_handler)
                    .delete(handlers::groups::remove_group_role_handler),
                Some(AdminPermission::ManageGroupRoles),
            ),
        )
        .route(
            "/api/groups/{group_id}/members/{user_id}",
            guard(
                put(handlers::groups::add_group_member_handler)
                    .delete(handlers::groups::remove_group_member_handler),
                Some(AdminPermission::ManageMemberships),
            ),
        )
        // Added after the routes so it wraps every permission gate above.
        .route_layer(from_fn_with_state(app_state.clone(), middleware::rate_limit));

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = cors_allowed_origin {
        app = app.layer(cors_layer(origin)?);
    }

    Ok(app.with_state(app_state))
}

fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin).map_err(|error| {
            AppError::Validation(format!("invalid CORS_ALLOWED_ORIGIN: {error}"))
        })?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}
