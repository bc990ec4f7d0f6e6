use axum::{http, Router};
use connector_database::basic_db::{DbError, InnerDatabase, SafeDatabase};
use connector_service::error::ServiceError;
use connector_service::github::GithubClient;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use crate::auth::*;
use crate::config::{Config, ConfigError};
use crate::post::*;
use crate::profile::*;
use crate::router::*;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("database: {0}")]
    Database(#[from] DbError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn open_state(config: &Config) -> Result<AppState<InnerDatabase>, ServerError> {
    info!("Opening database at {}", config.database_path.display());
    let database = InnerDatabase::open(&config.database_path)?;
    let github = GithubClient::new(config.github.clone())?;
    Ok(AppState::new(database, github, config.session_ttl))
}

pub async fn build_server(config: Config) -> Result<(), ServerError> {
    let state = open_state(&config)?;
    let app = app(state);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server started on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Opens a session for an existing account and returns its bearer token.
pub fn issue_token(config: &Config, user_id: &str) -> Result<String, ServerError> {
    let user = Uuid::parse_str(user_id).map_err(|_| ServiceError::not_found("User not found"))?;
    let token = open_state(config)?.open_session(user)?;
    info!(%user, ttl_secs = config.session_ttl.num_seconds(), "session issued");
    Ok(token)
}

/// Returns `true` when the token named a live session.
pub fn revoke_token(config: &Config, token: &str) -> Result<bool, ServerError> {
    let revoked = open_state(config)?.close_session(token)?;
    info!(revoked, "session revoke requested");
    Ok(revoked)
}

/// The complete router with CORS and request tracing applied.
pub fn app(state: AppState<InnerDatabase>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
            http::Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    main_router(collect_components(), state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "API Running"
}

fn collect_components() -> Vec<(String, Router<AppState<InnerDatabase>>)> {
    vec![
        get_router_builder("/".to_string(), health),
        get_router_builder("/api/auth".to_string(), current_user::<InnerDatabase>),
        // posts
        post_router_builder("/api/posts".to_string(), create_post::<InnerDatabase>),
        get_router_builder("/api/posts".to_string(), get_posts::<InnerDatabase>),
        get_router_builder("/api/posts/{id}".to_string(), get_post::<InnerDatabase>),
        delete_router_builder("/api/posts/{id}".to_string(), delete_post::<InnerDatabase>),
        put_router_builder("/api/posts/like/{id}".to_string(), like_post::<InnerDatabase>),
        put_router_builder("/api/posts/unlike/{id}".to_string(), unlike_post::<InnerDatabase>),
        post_router_builder("/api/posts/comment/{id}".to_string(), add_comment::<InnerDatabase>),
        delete_router_builder(
            "/api/posts/comment/{id}/{comment_id}".to_string(),
            delete_comment::<InnerDatabase>,
        ),
        // profiles
        get_router_builder("/api/profile/me".to_string(), get_my_profile::<InnerDatabase>),
        post_router_builder("/api/profile".to_string(), profile_write::<InnerDatabase>),
        get_router_builder("/api/profile".to_string(), get_all_profiles::<InnerDatabase>),
        delete_router_builder("/api/profile".to_string(), delete_account::<InnerDatabase>),
        get_router_builder("/api/profile/user/{user_id}".to_string(), get_profile_by_user::<InnerDatabase>),
        put_router_builder("/api/profile/experience".to_string(), add_experience::<InnerDatabase>),
        delete_router_builder("/api/profile/experience/{exp_id}".to_string(), delete_experience::<InnerDatabase>),
        put_router_builder("/api/profile/education".to_string(), add_education::<InnerDatabase>),
        delete_router_builder("/api/profile/education/{edu_id}".to_string(), delete_education::<InnerDatabase>),
        get_router_builder("/api/profile/github/{username}".to_string(), github_repos::<InnerDatabase>),
    ]
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
