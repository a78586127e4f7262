//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors render through each crate's `IntoResponse` error enum.

mod config;

use std::str::FromStr;

use auth::application::EnsureSuperuserUseCase;
use auth::{AuthAppState, SqliteUserRepository, auth_router, resolve_request_context};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use cases::{
    CasesAppState, DocumentStore, ReconcileStorageUseCase, SqliteCaseRepository, cases_router,
};
use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "legal_api=info,auth=info,cases=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Database connection
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth configuration
    if config.token_secret.is_none() {
        tracing::warn!("TOKEN_SECRET not set, issued tokens will not survive a restart");
    }
    if !config.policy.enforce_roles {
        tracing::warn!("ENFORCE_ROLES is off, any authenticated user passes role checks");
    }

    let auth_state = AuthAppState::new(SqliteUserRepository::new(pool.clone()), config.auth_config());

    if let Some(superuser) = config.superuser.clone() {
        let created = EnsureSuperuserUseCase::new(auth_state.repo.clone(), auth_state.config.clone())
            .execute(superuser)
            .await?;
        if !created {
            tracing::info!("Initial admin already exists");
        }
    }

    // Document storage
    let cases_config = config.cases_config();
    let store = DocumentStore::new(cases_config.upload_dir.clone()).await?;
    let cases_state = CasesAppState::new(SqliteCaseRepository::new(pool.clone()), store, cases_config);

    // Startup cleanup: leftovers from failed deletes and interrupted uploads
    // Errors here should not prevent server startup
    match ReconcileStorageUseCase::new(cases_state.repo.clone(), cases_state.store.clone())
        .execute()
        .await
    {
        Ok(report) => {
            tracing::info!(
                documents_removed = report.documents_removed,
                documents_failed = report.documents_failed,
                temp_files_removed = report.temp_files_removed,
                case_dirs_removed = report.case_dirs_removed,
                "Upload storage cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Upload storage cleanup failed, continuing anyway"
            );
        }
    }

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let api = Router::new()
        .merge(auth_router(auth_state.clone()))
        .merge(cases_router(cases_state))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            resolve_request_context::<SqliteUserRepository>,
        ));

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.http_addr);

    let listener = TcpListener::bind(config.http_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
