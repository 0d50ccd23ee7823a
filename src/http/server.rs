//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: `/api` routes to the relay handler, everything
//!   else to the static asset service with SPA fallback
//! - Wire up middleware (origin gate, timeout, request ID, tracing)
//! - Build the shared application state (config, upstream target, client)
//! - Serve with graceful shutdown

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::middleware::origin_gate_middleware;
use crate::http::relay::{relay_handler, UpstreamTarget, UpstreamTargetError};
use crate::lifecycle;

/// Application state injected into handlers and middleware.
///
/// Everything here is read-only after startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub upstream: Arc<UpstreamTarget>,
    pub client: reqwest::Client,
}

/// Error building the server from configuration. Fatal at startup only.
#[derive(Debug, thiserror::Error)]
pub enum ServerBuildError {
    #[error("upstream configuration: {0}")]
    Upstream(#[from] UpstreamTargetError),
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build the server from an immutable configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerBuildError> {
        let upstream = UpstreamTarget::from_config(&config.upstream)?;

        // Redirects are relayed back to the caller verbatim, never followed.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;

        let state = AppState {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
            client,
        };

        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let assets_config = &state.config.static_assets;
        let index = Path::new(&assets_config.dir).join(&assets_config.index);
        let assets = ServeDir::new(&assets_config.dir).not_found_service(ServeFile::new(index));

        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

        Router::new()
            .route("/api", any(relay_handler))
            .route("/api/{*path}", any(relay_handler))
            .fallback_service(assets)
            .with_state(state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(request_timeout))
                    .layer(middleware::from_fn_with_state(
                        state,
                        origin_gate_middleware,
                    )),
            )
    }

    /// Run the server until Ctrl+C or the shutdown coordinator fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(lifecycle::shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
