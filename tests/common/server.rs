//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own seeded random source.

use super::constants::*;
use moodboard_server::board::{BoardSettings, MoodBoardService};
use moodboard_server::imagery::{
    DiffusionClient, DiffusionSettings, ImageCompositor, ImageGenerator, ImageModelHandle,
    ModelStatus, PlaceholderProvider,
};
use moodboard_server::llm::OllamaProvider;
use moodboard_server::mood::MoodClassifier;
use moodboard_server::random::RandomSource;
use moodboard_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Collaborators of a test server. The default is fully offline:
/// heuristic classification and placeholder images only.
#[derive(Default)]
pub struct TestServerOptions {
    /// Base URL of an Ollama-compatible service
    pub classifier_url: Option<String>,
    /// Base URL of a Stable Diffusion web API; the model is ready before spawn returns
    pub image_model_url: Option<String>,
    /// Placeholder service base URL, defaults to the public one
    pub placeholder_base_url: Option<String>,
    pub board: BoardSettings,
}

/// Test server instance
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Image model slot shared with the server, for lifecycle tests
    pub image_model: Arc<ImageModelHandle>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns an offline test server on a random port
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawns a test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Port binding fails
    /// - A configured image model fails to initialize
    /// - Server doesn't become ready within timeout
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let random = Arc::new(RandomSource::from_seed(TEST_RNG_SEED));

        let classifier = match &options.classifier_url {
            Some(url) => MoodClassifier::new(
                Arc::new(OllamaProvider::new(url, FAKE_OLLAMA_MODEL)),
                Duration::from_secs(5),
            ),
            None => MoodClassifier::heuristic_only(),
        };

        let image_model = Arc::new(ImageModelHandle::new());
        if let Some(url) = &options.image_model_url {
            let settings = DiffusionSettings {
                base_url: url.clone(),
                model: FAKE_DIFFUSION_MODEL.to_string(),
                ..Default::default()
            };
            let status = image_model
                .initialize(async move {
                    DiffusionClient::connect(settings)
                        .await
                        .map(|client| Arc::new(client) as Arc<dyn ImageGenerator>)
                })
                .await;
            assert_eq!(status, ModelStatus::Ready, "Image model failed to initialize");
        }

        let placeholders = PlaceholderProvider::new(
            options
                .placeholder_base_url
                .clone()
                .unwrap_or_else(|| "https://picsum.photos".to_string()),
            512,
            512,
        );
        let compositor = ImageCompositor::new(image_model.clone(), placeholders, random.clone());
        let board = Arc::new(MoodBoardService::new(
            classifier,
            compositor,
            random,
            options.board,
        ));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            metrics_port: 0,
            allowed_origins: vec![TEST_ORIGIN.to_string()],
        };
        let app = make_app(config, board).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            image_model,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling "/"
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
