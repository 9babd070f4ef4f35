use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use warden_application::CreatePermissionInput;

use crate::dto::{CreatePermissionRequest, PermissionResponse};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .rbac_admin_service
        .list_permissions()
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let permission = state
        .rbac_admin_service
        .create_permission(CreatePermissionInput {
            name: payload.name,
            resource: payload.resource,
            action: payload.action,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}
