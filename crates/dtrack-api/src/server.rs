//! HTTP server bootstrap with graceful shutdown

use std::time::Duration;

use axum::Router;

use crate::{config::AppConfig, routes, state::AppState};

/// The API server: owns the configuration and the wired application
/// state.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// The application router (exposed separately so tests can drive it
    /// without binding a socket).
    pub fn router(&self) -> Router {
        routes::api_routes(
            self.state.clone(),
            Duration::from_secs(self.config.server.request_timeout_secs),
        )
    }

    /// Bind and serve until a shutdown signal arrives.
    pub async fn run(self) -> std::io::Result<()> {
        let address = self.config.server.address();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!(addr = %address, "starting http server");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("received shutdown signal");
}
