//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_rate_limit_repository;
mod in_memory_rbac_store;
mod jwt_access_token_verifier;
mod postgres_cascade_mutation_store;
mod postgres_permission_graph_repository;
mod postgres_rbac_admin_repository;

pub use in_memory_rate_limit_repository::InMemoryRateLimitRepository;
pub use in_memory_rbac_store::InMemoryRbacStore;
pub use jwt_access_token_verifier::JwtAccessTokenVerifier;
pub use postgres_cascade_mutation_store::PostgresCascadeMutationStore;
pub use postgres_permission_graph_repository::PostgresPermissionGraphRepository;
pub use postgres_rbac_admin_repository::PostgresRbacAdminRepository;
