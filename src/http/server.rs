//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all status handlers
//! - Wire up middleware (tracing, timeout, admin auth)
//! - Bind server to listener and serve until shutdown

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::aggregator::Aggregator;
use crate::config::HttpConfig;
use crate::http::auth::admin_auth_middleware;
use crate::http::handlers::*;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    pub http: Arc<HttpConfig>,
}

/// Upper bound for requests that only read or flip in-memory state.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the Axum router with all middleware layers.
///
/// The forced check bounds itself from the live check settings, so it sits
/// outside the fixed request timeout.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/status", get(get_status))
        .route("/status/summary", get(get_summary))
        .route("/status/service/{name}", get(get_service))
        .route("/status/incidents", get(get_incidents))
        .route("/status/uptime", get(get_uptime))
        .route("/status/badge", get(get_badge))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    let admin = Router::new()
        .route(
            "/status/maintenance/{name}",
            post(set_maintenance).layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .route("/status/health-check", post(force_check))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware));

    public
        .merge(admin)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the status API.
pub struct StatusServer {
    router: Router,
}

impl StatusServer {
    pub fn new(aggregator: Aggregator, http: HttpConfig) -> Self {
        let state = AppState {
            aggregator,
            http: Arc::new(http),
        };
        Self {
            router: build_router(state),
        }
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Status API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Status API stopped");
        Ok(())
    }
}
