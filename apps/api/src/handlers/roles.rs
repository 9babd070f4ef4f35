use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use warden_application::{CreateRoleInput, UpdateRoleInput};
use warden_core::AuthContext;
use warden_domain::{PermissionId, RoleId};

use crate::dto::{CreateRoleRequest, PermissionResponse, RoleResponse, UpdateRoleRequest};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_roles_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .rbac_admin_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    ApiJson(payload): ApiJson<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .rbac_admin_service
        .create_role(CreateRoleInput {
            name: payload.name,
            description: payload.description,
        })
        .await?;

    tracing::info!(actor = %context.subject(), role_id = %role.id(), "role created via api");
    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .get_role(RoleId::from_str(role_id.as_str())?)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .update_role(
            RoleId::from_str(role_id.as_str())?,
            UpdateRoleInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    let role_id = RoleId::from_str(role_id.as_str())?;
    state.cascade_mutation_service.delete_role(role_id).await?;

    tracing::info!(actor = %context.subject(), %role_id, "role deleted via api");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_role_permissions_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .rbac_admin_service
        .list_role_permissions(RoleId::from_str(role_id.as_str())?)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn grant_role_permission_handler(
    State(state): State<AppState>,
    Path((role_id, permission_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .grant_role_permission(
            RoleId::from_str(role_id.as_str())?,
            PermissionId::from_str(permission_id.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_role_permission_handler(
    State(state): State<AppState>,
    Path((role_id, permission_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .revoke_role_permission(
            RoleId::from_str(role_id.as_str())?,
            PermissionId::from_str(permission_id.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
