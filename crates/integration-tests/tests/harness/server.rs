//! Test server wrapper that starts Parley on a random port

use std::net::SocketAddr;
use std::path::Path;

use parley_config::Config;
use parley_server::Server;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// A running test server instance with its own upload directory
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    uploads: TempDir,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment. Uploads are stored in
    /// a temporary directory removed when the server is dropped.
    pub async fn start(mut config: Config) -> anyhow::Result<Self> {
        let uploads = tempfile::tempdir()?;
        config.uploads.directory = uploads.path().to_path_buf();

        let server = Server::new(config).await?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self {
            addr,
            shutdown,
            client,
            uploads,
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Directory uploaded files are written to
    pub fn upload_dir(&self) -> &Path {
        self.uploads.path()
    }

    /// Upload `bytes` as `name` into `conversation`
    pub async fn upload(&self, conversation: &str, name: &str, bytes: Vec<u8>) -> reqwest::Response {
        let form = reqwest::multipart::Form::new()
            .text("conversation_id", conversation.to_owned())
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(name.to_owned()));

        self.client
            .post(self.url("/v1/files"))
            .multipart(form)
            .send()
            .await
            .expect("upload request")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
