use std::sync::Arc;

use ipnet::IpNet;

use warden_application::{
    AccessTokenVerifier, CascadeMutationService, PermissionResolutionService, RateLimitService,
    RbacAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_resolution_service: PermissionResolutionService,
    pub cascade_mutation_service: CascadeMutationService,
    pub rbac_admin_service: RbacAdminService,
    pub rate_limit_service: RateLimitService,
    pub token_verifier: Arc<dyn AccessTokenVerifier>,
    /// Peers allowed to report the client address through `X-Forwarded-For`.
    pub trusted_proxies: Arc<[IpNet]>,
}
