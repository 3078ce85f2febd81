/// Application state and router builder
///
/// Defines the shared application state and builds the axum router with
/// all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use identra_api::{app::AppState, config::Config};
/// use sqlx::postgres::PgPoolOptions;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPoolOptions::new().connect(&config.database.url).await?;
/// let state = AppState::new(pool, config)?;
/// let app = identra_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use identra_shared::auth::{seal::TokenSealer, token::TokenCodec};
use identra_shared::service::{RoleService, UserService};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via axum's `State` extractor; the pool
/// and services are cheap handles over shared read-only internals.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// User service
    pub users: UserService,

    /// Role service
    pub roles: RoleService,
}

impl AppState {
    /// Creates application state, wiring services to the token primitives
    ///
    /// Fails when the configured seal key is unusable.
    pub fn new(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let codec = Arc::new(TokenCodec::new(&config.token.jwt_secret));

        let sealer = match &config.token.seal_key {
            Some(key) => Some(Arc::new(TokenSealer::new(key)?)),
            None => None,
        };

        let users = UserService::new(db.clone(), codec, sealer);
        let roles = RoleService::new(db.clone(), users.clone());

        Ok(Self {
            db,
            config: Arc::new(config),
            users,
            roles,
        })
    }
}

/// Builds the complete axum router
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /health                      # Health check (public)
/// ├── GET  /users                       # List users (filters + pagination)
/// ├── POST /users                       # Create user
/// ├── POST /users/login                 # Login, returns user + token
/// ├── GET  /users/me                    # User behind the bearer token
/// ├── GET  /users/:id                   # Get by id
/// ├── PATCH /users/:id                  # Partial update
/// ├── DELETE /users/:id                 # Accepted, not applied
/// ├── PUT  /users/:id/password          # Password change
/// ├── GET  /users/:id/token/:token      # Token access check
/// ├── POST /users/:id/apps              # Create role row for an app
/// ├── PUT  /users/:id/apps/:app         # Merge named roles into the mask
/// └── GET  /users/:id/apps/:app         # Fetch the role row
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route("/login", post(routes::users::login))
        .route("/me", get(routes::users::current_user))
        .route(
            "/:id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/:id/password", put(routes::users::update_password))
        .route("/:id/token/:token", get(routes::users::token_access))
        .route("/:id/apps", post(routes::roles::create_app))
        .route("/:id/apps/:app", put(routes::roles::add_roles))
        .route("/:id/apps/:app", get(routes::roles::get_role));

    let cors = if state.config.http.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .http
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

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
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/users", user_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
