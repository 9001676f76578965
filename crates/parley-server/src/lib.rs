mod cors;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use parley_config::Config;
use parley_files::FileService;
use parley_llm::UpstreamClient;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be built or the
    /// upload directory cannot be created
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address();

        tokio::fs::create_dir_all(&config.uploads.directory)
            .await
            .map_err(|e| anyhow::anyhow!("failed to create upload directory {}: {e}", config.uploads.directory.display()))?;

        let http_client = UpstreamClient::http_client(&config.upstream)?;
        let upstream = parley_llm::build_client(http_client, &config.upstream);
        let files = Arc::new(FileService::from_config(&config.uploads));

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.merge(health::health_router(
                &config.server.health.path,
                config.upstream.base_url.to_string(),
            ));
        }

        // Chat and model routes
        app = app.merge(parley_llm::endpoint_router().with_state(upstream));

        // File routes
        app = app.merge(parley_files::endpoint_router(config.uploads.max_upload_bytes).with_state(files));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        let cors_config = config.server.cors.unwrap_or_default();
        app = app.layer(cors::cors_layer(&cors_config));

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
