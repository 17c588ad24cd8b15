//! Documentation of a small user service with a built-in log viewer.
//!
//!
//!
//! # General Infrastructure
//! - One axum server, one Redis instance holding user documents
//! - Every log line the server emits is appended to a JSON lines file
//! - The same file is served back as an HTML table on `/api/logs`
//! - No background jobs, no caches, each request stands alone
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Success | Errors |
//! |---|---|---|---|
//! | GET | `/` | 200 greeting | |
//! | GET | `/api/user` | 200 list | 404 no users |
//! | GET | `/api/user/{id}` | 200 user | 404 |
//! | POST | `/api/user` | 201 user | 400 payload, validation, duplicate email |
//! | PUT | `/api/user/{id}` | 200 user | 400, 404 |
//! | GET | `/api/logs?level=&limit=&page=` | 200 HTML | 404 no log file, 500 read failure |
//!
//! Errors are JSON: `{ "message": "..." }`.
//!
//! Users never come back with their password. Emails are trimmed and
//! lowercased before they are stored, so uniqueness is case-insensitive.
//!
//!
//!
//! # Log Viewer
//!
//! See [`logs`]. `limit` wins over `page` when both are given: a limit turns
//! the view into "latest N" and the page only drives the pagination links.
//!
//!
//!
//! # Configuration
//!
//! Environment only, see [`config::Config`].
//! ```sh
//! ENV=prod REDIS_PROD_URL=redis://cache:6379 LOG_FILE=/var/log/userbase/app.log userbase
//! ```
//!
//! Run without Redis.
//! ```sh
//! userbase --in-memory
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod logs;
pub mod routes;
pub mod state;
pub mod users;
pub mod utils;

use config::Config;
use routes::{
    create_user_handler, get_user_handler, list_users_handler, logs_handler, root_handler,
    update_user_handler,
};
use state::State;
use users::UserStore;

pub fn app(state: Arc<State>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(&state.config.cors_origin)?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/user", get(list_users_handler).post(create_user_handler))
        .route("/user/{id}", get(get_user_handler).put(update_user_handler))
        .route("/logs", get(logs_handler));

    Ok(Router::new()
        .route("/", get(root_handler))
        .nest("/api", api)
        .layer(cors)
        .with_state(state))
}

fn allow_origin(origin: &str) -> Result<AllowOrigin> {
    if origin.trim() == "*" {
        return Ok(AllowOrigin::any());
    }

    let origin = HeaderValue::from_str(origin.trim())
        .with_context(|| format!("invalid CORS_ORIGIN `{origin}`"))?;

    Ok(AllowOrigin::exact(origin))
}

pub async fn start_server(config: Config, store: Arc<dyn UserStore>) -> Result<()> {
    info!("Initializing state...");
    let state = State::new(config, store);

    info!("Starting server...");
    let app = app(state.clone())?;

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(
        env = %state.config.env,
        "Server is running on port {} in {} mode",
        state.config.port,
        state.config.env
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
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
