mod common;
mod rbac;

pub use common::{EffectivePermissionsResponse, HealthResponse};
pub use rbac::{
    CreateGroupRequest, CreatePermissionRequest, CreateRoleRequest, GroupResponse,
    PermissionResponse, RoleResponse, UpdateRoleRequest,
};

#[cfg(test)]
mod tests {
    use super::{
        CreateGroupRequest, CreatePermissionRequest, CreateRoleRequest,
        EffectivePermissionsResponse, GroupResponse, HealthResponse, PermissionResponse,
        RoleResponse, UpdateRoleRequest,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        CreateRoleRequest::export(&config)?;
        UpdateRoleRequest::export(&config)?;
        CreatePermissionRequest::export(&config)?;
        CreateGroupRequest::export(&config)?;
        RoleResponse::export(&config)?;
        PermissionResponse::export(&config)?;
        GroupResponse::export(&config)?;
        EffectivePermissionsResponse::export(&config)?;
        HealthResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }
}
