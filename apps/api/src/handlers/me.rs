use axum::Json;
use axum::extract::Extension;
use warden_application::EffectivePermissions;
use warden_core::AuthContext;

use crate::dto::EffectivePermissionsResponse;

/// Returns the grants resolved for this request by the authorization layer.
pub async fn my_permissions_handler(
    Extension(context): Extension<AuthContext>,
    Extension(effective): Extension<EffectivePermissions>,
) -> Json<EffectivePermissionsResponse> {
    Json(EffectivePermissionsResponse::new(&context, effective))
}
