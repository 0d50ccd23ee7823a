//! api-relay entry point.
//!
//! Startup order: logging, configuration from the environment, metrics
//! exporter, listener bind, HTTP server. Any bind or build error here is
//! fatal; once the server is running, request failures never are.

use tokio::net::TcpListener;

use api_relay::config::loader;
use api_relay::observability::{logging, metrics};
use api_relay::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("api_relay=debug,tower_http=info");

    tracing::info!("api-relay v0.1.0 starting");

    let config = loader::load_from_env();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        allowed_origins = ?config.allow_list.origins(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
