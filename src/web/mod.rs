use axum::{
    Router,
    http::Method,
    middleware as axum_middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info_span;

use crate::platform::AdapterRegistry;
use crate::server::config::ServerConfig;
use crate::services::{CommandFilter, GroupConfigStore, IdentityResolver, OwnershipVerifier};
use crate::web::{middleware::auth, routes::*};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub identity_resolver: Arc<IdentityResolver>,
    pub group_store: Arc<GroupConfigStore>,
    pub command_filter: Arc<CommandFilter>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wires the console components. Each one gets its own span to log under.
    pub fn new(
        db_pool: DatabaseConnection,
        adapters: Arc<AdapterRegistry>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let verifier = Arc::new(OwnershipVerifier::new(
            adapters,
            config.platform.clone(),
            config.ownership_check_timeout(),
            info_span!("ownership", platform = %config.platform),
        ));
        let identity_resolver = Arc::new(IdentityResolver::new(
            db_pool.clone(),
            config.platform.clone(),
            info_span!("identity"),
        ));
        let group_store = Arc::new(GroupConfigStore::new(
            db_pool.clone(),
            verifier,
            info_span!("group_store"),
        ));
        let command_filter = Arc::new(CommandFilter::new(
            db_pool,
            info_span!("command_filter"),
        ));

        Self {
            identity_resolver,
            group_store,
            command_filter,
            config,
        }
    }
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(app_state: AppState) -> Router {
    let app_state = Arc::new(app_state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::PUT, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest(
            "/api/groups",
            group_routes::create_group_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/bot",
            bot_routes::create_bot_router().route_layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth::bot_auth,
            )),
        )
        .with_state(app_state)
        .layer(cors)
}
