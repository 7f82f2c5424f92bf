//! Teamdir Server - HTTP webhook server for Slack team directory search.
//!
//! This crate provides:
//! - The slash command / outgoing webhook endpoint
//! - A health check endpoint
//! - Request context (ID and timing) and timeout middleware
//!
//! Every webhook request is handed to [`teamdir_slack::DirectorySearch`]; this
//! crate only deals with HTTP.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use teamdir_slack::RuntimeConfig;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::{HEALTH_PATH, ServerConfig};
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Run the server with the given configuration.
pub async fn run(config: ServerConfig, runtime: RuntimeConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, runtime, std::future::pending()).await
}

/// Run the server with graceful shutdown support.
pub async fn run_with_shutdown<F>(
    config: ServerConfig,
    runtime: RuntimeConfig,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    config.validate()?;

    let state = Arc::new(AppState::new(config.clone(), runtime)?);
    let app = create_router_with_state(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!(
        "Listening on {} (webhook path {})",
        addr, config.webhook_path
    );

    // Fires once the shutdown future completes, starting the drain deadline
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let shutdown = async move {
        shutdown.await;
        let _ = signalled_tx.send(());
    };

    let listener = TcpListener::bind(addr).await?;
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .into_future();
    tokio::pin!(server);

    let drain = Duration::from_secs(config.shutdown_timeout);
    tokio::select! {
        result = &mut server => result?,
        _ = async {
            match signalled_rx.await {
                Ok(()) => tokio::time::sleep(drain).await,
                Err(_) => std::future::pending::<()>().await,
            }
        } => {
            warn!(
                "In-flight requests did not finish within {}s, shutting down anyway",
                config.shutdown_timeout
            );
        }
    }

    info!("Server shut down");
    Ok(())
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    create_router_with_state(Arc::new(state))
}

/// Create the application router with an Arc-wrapped state.
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let mut router = Router::new().route(&state.config.webhook_path, post(handlers::slack_webhook));

    if state.config.health_enabled {
        router = router.route(HEALTH_PATH, get(handlers::health));
    }

    router
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::timeout_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::request_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
