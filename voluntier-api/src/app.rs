/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use voluntier_api::{app::{build_router, AppState}, config::Config};
/// use voluntier_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        identity::{require_login, resolve_identity},
        security::security_headers,
    },
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use voluntier_shared::storage::PictureStore;

/// Shared application state
///
/// Cloned into each handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Profile picture storage
    pub pictures: PictureStore,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let pictures = PictureStore::new(&config.storage.picture_dir);

        Self {
            db,
            config: Arc::new(config),
            pictures,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /, /home, /search               # Listings (public)
/// ├── /register, /login               # Authentication (public)
/// ├── /health                         # Health check (public)
/// ├── /static/profile_pictures/*      # Stored pictures (public)
/// └── everything else                 # Login required
///     ├── /logout, /account, /my_projects
///     ├── /create_project, /create_post/:project_id
///     ├── /post/:post_id/{edit,delete}
///     └── /project/:project_id/...
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. CORS
/// 3. Request tracing
/// 4. Identity resolution from the session cookie
/// 5. Login requirement (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(routes::posts::home))
        .route("/home", get(routes::posts::home))
        .route("/search", get(routes::posts::search))
        .route("/register", post(routes::auth::register))
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login),
        )
        .route("/health", get(routes::health::health_check));

    let protected_routes = Router::new()
        .route(
            "/logout",
            get(routes::auth::logout).post(routes::auth::logout),
        )
        .route(
            "/account",
            get(routes::account::account).post(routes::account::edit_account),
        )
        .route("/my_projects", get(routes::projects::my_projects))
        .route("/create_project", post(routes::projects::create_project))
        .route("/project/:project_id/apply", post(routes::projects::apply))
        .route(
            "/project/:project_id/:application_id/accept",
            get(routes::projects::accept).post(routes::projects::accept),
        )
        .route(
            "/project/:project_id/:application_id/reject",
            get(routes::projects::reject).post(routes::projects::reject),
        )
        .route(
            "/project/:project_id/view_applications",
            get(routes::projects::view_applications),
        )
        .route(
            "/project/:project_id/view_members",
            get(routes::projects::view_members),
        )
        .route("/create_post/:project_id", post(routes::posts::create_post))
        .route(
            "/post/:post_id/edit",
            get(routes::posts::edit_post_form).post(routes::posts::edit_post),
        )
        .route(
            "/post/:post_id/delete",
            get(routes::posts::delete_post).post(routes::posts::delete_post),
        )
        .route_layer(from_fn(require_login));

    let pictures = ServeDir::new(state.pictures.base_dir());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/static/profile_pictures", pictures)
        .layer(from_fn_with_state(state.clone(), resolve_identity))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(from_fn_with_state(state.clone(), security_headers))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
