use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_domain::{Permission, Role, RoleGroup};

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Incoming payload replacing a role's name and description.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub resource: String,
    pub action: String,
}

/// Incoming payload for role group creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-group-request.ts"
)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_owned(),
            description: value.description().to_owned(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// API representation of a permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub resource: String,
    pub action: String,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_owned(),
            resource: value.resource().to_owned(),
            action: value.action().to_owned(),
        }
    }
}

/// API representation of a role group.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/group-response.ts"
)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

impl From<RoleGroup> for GroupResponse {
    fn from(value: RoleGroup) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_owned(),
            description: value.description().to_owned(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}
