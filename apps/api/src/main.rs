//! Warden API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use warden_application::{
    CascadeMutationService, PermissionResolutionService, RateLimitRule, RateLimitService,
    RbacAdminService,
};
use warden_core::AppError;
use warden_infrastructure::{
    InMemoryRateLimitRepository, JwtAccessTokenVerifier, PostgresCascadeMutationStore,
    PostgresPermissionGraphRepository, PostgresRbacAdminRepository,
};

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let rate_limit_rule = RateLimitRule::per_seconds(
        "api",
        config.rate_limit_max_requests,
        config.rate_limit_window_seconds,
    );

    let app_state = AppState {
        permission_resolution_service: PermissionResolutionService::new(Arc::new(
            PostgresPermissionGraphRepository::new(pool.clone()),
        )),
        cascade_mutation_service: CascadeMutationService::new(Arc::new(
            PostgresCascadeMutationStore::new(pool.clone()),
        )),
        rbac_admin_service: RbacAdminService::new(Arc::new(PostgresRbacAdminRepository::new(
            pool,
        ))),
        rate_limit_service: RateLimitService::new(
            Arc::new(InMemoryRateLimitRepository::new()),
            rate_limit_rule,
        ),
        token_verifier: Arc::new(JwtAccessTokenVerifier::new(config.jwt_secret.as_bytes())),
        trusted_proxies: Arc::from(config.trusted_proxies.clone()),
    };

    let app = api_router::build_router(app_state, config.cors_allowed_origin.as_deref())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        rate_limit_max_requests = config.rate_limit_max_requests,
        rate_limit_window_seconds = config.rate_limit_window_seconds,
        trusted_proxies = config.trusted_proxies.len(),
        "warden-api listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
