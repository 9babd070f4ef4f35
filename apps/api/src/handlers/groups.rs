use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use warden_application::CreateGroupInput;
use warden_core::{AuthContext, UserId};
use warden_domain::{GroupId, RoleId};

use crate::dto::{CreateGroupRequest, GroupResponse, RoleResponse};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_groups_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<GroupResponse>>> {
    let groups = state
        .rbac_admin_service
        .list_groups()
        .await?
        .into_iter()
        .map(GroupResponse::from)
        .collect();

    Ok(Json(groups))
}

pub async fn create_group_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<GroupResponse>)> {
    let group = state
        .rbac_admin_service
        .create_group(CreateGroupInput {
            name: payload.name,
            description: payload.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

pub async fn get_group_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<GroupResponse>> {
    let group = state
        .rbac_admin_service
        .get_group(GroupId::from_str(group_id.as_str())?)
        .await?;

    Ok(Json(GroupResponse::from(group)))
}

pub async fn delete_group_handler(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(group_id): Path<String>,
) -> ApiResult<StatusCode> {
    let group_id = GroupId::from_str(group_id.as_str())?;
    state.cascade_mutation_service.delete_group(group_id).await?;

    tracing::info!(actor = %context.subject(), %group_id, "group deleted via api");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_group_roles_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .rbac_admin_service
        .list_group_roles(GroupId::from_str(group_id.as_str())?)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn assign_group_role_handler(
    State(state): State<AppState>,
    Path((group_id, role_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .assign_group_role(
            GroupId::from_str(group_id.as_str())?,
            RoleId::from_str(role_id.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_group_role_handler(
    State(state): State<AppState>,
    Path((group_id, role_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .remove_group_role(
            GroupId::from_str(group_id.as_str())?,
            RoleId::from_str(role_id.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_group_member_handler(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .add_member(
            GroupId::from_str(group_id.as_str())?,
            UserId::from_str(user_id.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_group_member_handler(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .remove_member(
            GroupId::from_str(group_id.as_str())?,
            UserId::from_str(user_id.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
