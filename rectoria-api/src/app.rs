/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use rectoria_api::{app::AppState, config::Config};
/// use rectoria_shared::{data_access::DataAccess, registry::Registry, store::MemoryStore};
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let data = DataAccess::new(Arc::new(Registry::new()?), Arc::new(MemoryStore::new()));
/// let state = AppState::new(data, config);
/// let app = rectoria_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use rectoria_shared::{
    auth::{authorization::admin_only_middleware, middleware::create_jwt_middleware},
    data_access::DataAccess,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Entity data access
    pub data: DataAccess,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(data: DataAccess, config: Config) -> Self {
        Self {
            data,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token verification
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                   # Health check (public)
/// └── /api/v1/rol               # Roles (JWT + admin role)
///     ├── POST /                # Create role
///     ├── GET  /                # List roles
///     ├── GET  /:id             # Get role
///     └── PUT  /:id             # Update role
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Authentication, then the admin gate (role routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Role routes: the JWT layer runs first and hands Claims to the admin gate
    let rol_routes = Router::new()
        .route(
            "/api/v1/rol",
            post(routes::rol::create_role).get(routes::rol::list_roles),
        )
        .route(
            "/api/v1/rol/:id",
            get(routes::rol::get_role).put(routes::rol::update_role),
        )
        .layer(middleware::from_fn(admin_only_middleware))
        .layer(middleware::from_fn(create_jwt_middleware(
            state.jwt_secret().to_string(),
        )));

    Router::new()
        .merge(health_routes)
        .merge(rol_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .with_state(state)
}

/// Permissive when `*` is listed, otherwise restricted to the given origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
