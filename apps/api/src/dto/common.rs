use serde::Serialize;
use ts_rs::TS;
use warden_application::EffectivePermissions;
use warden_core::AuthContext;

use super::rbac::{GroupResponse, PermissionResponse, RoleResponse};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Effective grants of the authenticated principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub subject: String,
    pub username: String,
    pub permissions: Vec<PermissionResponse>,
    pub roles: Vec<RoleResponse>,
    pub groups: Vec<GroupResponse>,
}

impl EffectivePermissionsResponse {
    pub fn new(context: &AuthContext, effective: EffectivePermissions) -> Self {
        Self {
            subject: context.subject().to_string(),
            username: context.username().to_owned(),
            permissions: effective
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
            roles: effective.roles.into_iter().map(RoleResponse::from).collect(),
            groups: effective
                .groups
                .into_iter()
                .map(GroupResponse::from)
                .collect(),
        }
    }
}
