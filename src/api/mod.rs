mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::DashboardConfig;
use crate::sessions::{ClientError, SessionClient};
use middleware::{auth_middleware, rate_limit_middleware, AuthConfig};

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub sessions: SessionClient,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(config: DashboardConfig, auth: AuthConfig) -> Result<Self, ClientError> {
        let sessions = SessionClient::new(&config.sessions)?;
        Ok(Self {
            config: Arc::new(config),
            sessions,
            auth,
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    let mut login = Router::new().route("/api/auth", post(handlers::login).delete(handlers::logout));
    if let Some(limiter) = state.auth.login_limiter.clone() {
        login = login.route_layer(from_fn_with_state(limiter, rate_limit_middleware));
    }

    Router::new()
        // Inventory
        .route("/projects-resolution", get(handlers::resolve_projects))
        .route("/sessions-resolution", get(handlers::resolve_sessions))
        // Paths the dashboard UI fetches
        .route("/api/projects", get(handlers::resolve_projects))
        .route("/api/sessions", get(handlers::resolve_sessions))
        // Health
        .route("/health", get(handlers::health))
        .merge(login)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(state.auth.clone(), auth_middleware)),
        )
        .with_state(state)
}
