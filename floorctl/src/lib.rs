//! # floorctl: Shop-Floor Occupancy Tracking
//!
//! `floorctl` tracks machine occupancy and downtime classification for a
//! manufacturing floor. Operators select their shop, authenticate, and claim
//! an equipment unit as "in use"; recorded downtime intervals are later
//! classified with a reason code. A REST API serves the shop-floor terminals.
//!
//! ## Overview
//!
//! The heart of the service is the equipment-claim protocol: who may occupy a
//! machine, how occupancy transfers between users, and how the privileged
//! `master` role overrides an existing claim. The [`occupancy`] module holds
//! that state machine; everything else is a thin projection over the same
//! PostgreSQL store.
//!
//! A claim binds one user to one equipment unit. For any unit, at most one
//! claim is active at a time, under arbitrary concurrency. The engine
//! enforces this by running each toggle as one transaction serialized per
//! equipment unit with a transaction-scoped advisory lock, backed by a
//! partial unique index on active claims. Claims are deactivated rather than
//! deleted, so the claim table doubles as the occupancy history.
//!
//! ### Request Flow
//!
//! A request first passes the session extractor, which resolves the session
//! cookie set at login to the acting `(user, shop)` pair; unauthenticated
//! requests stop there. Handlers then call repositories ([`db`]) for
//! projections, or hand the acting user id to the occupancy engine for claim
//! toggles. The engine decides against the current claim state and commits
//! its mutations atomically; conflicts come back as typed errors that the
//! HTTP layer maps to status codes ([`errors`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use floorctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = floorctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     floorctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs
//! migrations on startup. On first start it also ensures the initial
//! privileged user configured via `admin_username`/`admin_password`.
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod occupancy;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    db::handlers::Users,
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AnswerId, ClaimId, DowntimeStartId, EquipmentId, GroupId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the floorctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Ensure the initial privileged user exists.
///
/// This function is idempotent - it will create a new master user if one
/// doesn't exist, or refresh the password if the user already exists. This is
/// called during application startup so that a freshly provisioned plant
/// always has a privileged login.
#[instrument(skip_all)]
pub async fn ensure_initial_admin(username: &str, password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    // Hash password if provided
    let password_hash = match password {
        Some(pwd) => Some(password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?),
        None => None,
    };

    // Use a transaction to ensure atomicity
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    // Check if user already exists
    if let Some(existing) = user_repo.get_by_username(username).await? {
        // User exists - refresh password if provided
        if let Some(hash) = password_hash {
            user_repo.set_password(existing.id, &hash).await?;
        }
        tx.commit().await?;
        return Ok(existing.id);
    }

    let created = user_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            display_name: None,
            role: Role::Master,
            password_hash,
        })
        .await?;

    tx.commit().await?;
    info!("Created initial master user {}", username);
    Ok(created.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials))
}

/// Build the application router with all endpoints and middleware.
///
/// - Authentication routes at the root (`/authentication/*`)
/// - The JSON API nested under `/api/v1`
/// - A Scalar API reference at `/docs`
/// - CORS and tracing layers
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Authentication routes (at root level)
    let auth_routes = Router::new()
        .route(
            "/authentication/login",
            get(api::handlers::auth::get_login_info).post(api::handlers::auth::login),
        )
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .with_state(state.clone());

    // API routes
    let api_routes = Router::new()
        // Shops and their operators (pre-login selection screens)
        .route("/groups", get(api::handlers::groups::list_groups))
        .route("/groups/{group_id}/users", get(api::handlers::groups::list_group_users))
        // Equipment occupancy
        .route("/equipment", get(api::handlers::equipment::list_equipment))
        .route("/equipment/{equipment_id}/claim", post(api::handlers::equipment::toggle_claim))
        // Downtimes
        .route(
            "/equipment/{equipment_id}/downtimes",
            get(api::handlers::downtimes::list_downtimes),
        )
        .route(
            "/equipment/{equipment_id}/downtimes/{start_id}",
            put(api::handlers::downtimes::classify_downtime),
        )
        // Reason codes
        .route("/answers", get(api::handlers::answers::list_answers))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to PostgreSQL, runs
///    migrations, and ensures the initial master user
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting floorctl with configuration: {:#?}", config);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        migrator().run(&pool).await?;

        ensure_initial_admin(&config.admin_username, config.admin_password.as_deref(), &pool).await?;

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
        };
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "floorctl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_ensure_initial_admin_is_idempotent(pool: PgPool) {
        let first = ensure_initial_admin("master", Some("hunter2"), &pool).await.unwrap();
        let second = ensure_initial_admin("master", Some("changed"), &pool).await.unwrap();
        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let user = Users::new(&mut conn).get_by_username("master").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Master);

        // The second call refreshed the password
        let hash = user.password_hash.as_deref().unwrap();
        assert!(password::verify_string("changed", hash).unwrap());
        assert!(!password::verify_string("hunter2", hash).unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_healthz(pool: PgPool) {
        let server = crate::test_utils::create_test_app(pool).await;
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }
}
