//! Application services and ports.

#![forbid(unsafe_code)]

mod access_token;
mod cascade_mutation_service;
mod permission_resolution_service;
mod rate_limit_service;
mod rbac_admin_ports;
mod rbac_admin_service;

pub use access_token::{AccessTokenClaims, AccessTokenVerifier, TokenRejection};
pub use cascade_mutation_service::{
    CascadeMutationService, CascadeMutationStore, MutationStep, MutationTransaction,
};
pub use permission_resolution_service::{
    EffectivePermissions, PermissionGraphRepository, PermissionPath, PermissionResolutionService,
};
pub use rate_limit_service::{
    RateLimitDecision, RateLimitRepository, RateLimitRule, RateLimitService,
};
pub use rbac_admin_ports::{
    CreateGroupInput, CreatePermissionInput, CreateRoleInput, RbacAdminRepository,
    UpdateRoleInput,
};
pub use rbac_admin_service::RbacAdminService;
