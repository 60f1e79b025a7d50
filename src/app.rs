use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::auth::{AuthError, TokenService};
use crate::config::AppConfig;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::{schema, Stores};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};

/// Shared per-process state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub stores: Stores,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("token service: {0}")]
    Auth(#[from] AuthError),

    #[error("database: {0}")]
    Database(#[from] DatabaseError),
}

impl AppState {
    /// Connect the configured store (running migrations when enabled) and
    /// build the token service.
    pub async fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        if config.uses_memory_store() {
            warn!("DATABASE_URL not set to a Postgres URL; using the in-memory store");
            return Self::in_memory(config);
        }

        let pool = DatabaseManager::connect(&config.database).await?;
        if config.database.run_migrations {
            schema::migrate(&pool).await?;
        }

        Ok(Self {
            tokens: TokenService::from_config(&config.security)?,
            config: Arc::new(config),
            stores: Stores::postgres(pool),
        })
    }

    /// State over fresh in-memory tables; used by tests and `memory://` runs.
    pub fn in_memory(config: AppConfig) -> Result<Self, StartupError> {
        Ok(Self {
            tokens: TokenService::from_config(&config.security)?,
            config: Arc::new(config),
            stores: Stores::in_memory(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(user_routes())
        .merge(repair_request_routes())
        .merge(service_routes())
        .merge(provider_routes())
        .merge(admin_routes())
        // route_layer: the last layer added runs first, so the token is
        // verified before the account is loaded
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let api = Router::new().merge(auth_public_routes()).merge(protected);

    let mut app = Router::new()
        .route("/", get(public::root::root))
        .route("/health", get(public::root::health))
        .nest("/api/v1", api);

    if state.config.security.enable_cors {
        app = app.layer(cors_layer(&state.config));
    }
    if state.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    info!("CORS enabled for {} origin(s)", origins.len());

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .allow_credentials(true)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/jwt/login", post(auth::login))
        .route("/auth/roles", get(auth::roles))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/users/:id", get(users::get_user))
}

fn repair_request_routes() -> Router<AppState> {
    use protected::repair_requests;

    Router::new()
        .route(
            "/repair-requests",
            get(repair_requests::list).post(repair_requests::create),
        )
        .route("/repair-requests/my-requests", get(repair_requests::list_mine))
        .route(
            "/repair-requests/:id",
            get(repair_requests::get)
                .put(repair_requests::update)
                .delete(repair_requests::delete),
        )
}

fn service_routes() -> Router<AppState> {
    use protected::services;

    Router::new()
        .route("/services", get(services::list).post(services::create))
        .route("/services/my/services", get(services::list_mine))
        .route(
            "/services/:id",
            get(services::get).put(services::update).delete(services::delete),
        )
}

fn provider_routes() -> Router<AppState> {
    use protected::providers;

    Router::new()
        .route("/providers", get(providers::list).post(providers::create))
        .route("/providers/my/providers", get(providers::list_mine))
        .route(
            "/providers/:id",
            get(providers::get).put(providers::update).delete(providers::delete),
        )
}

fn admin_routes() -> Router<AppState> {
    use elevated::admin;

    Router::new()
        .route("/admin/analytics/dashboard", get(admin::dashboard))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id/role", put(admin::update_user_role))
        .route("/admin/users/:id", delete(admin::delete_user))
        .route("/admin/repair-requests", get(admin::list_repair_requests))
        .route(
            "/admin/repair-requests/:id",
            delete(admin::delete_repair_request),
        )
        .route("/admin/services", get(admin::list_services))
        .route("/admin/services/:id", delete(admin::delete_service))
}
