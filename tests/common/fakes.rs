//! Stand-ins for the external services the server talks to
//!
//! Each fake is a small axum app on a random local port, shut down on drop.
#![allow(dead_code)]

use super::constants::*;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Minimal PNG signature, enough for mime sniffing
pub const FAKE_PNG: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

struct RunningService {
    base_url: String,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl RunningService {
    async fn start(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake service");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake service failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            shutdown_tx: Some(shutdown_tx),
        }
    }
}

impl Drop for RunningService {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// Ollama
// ============================================================================

#[derive(Clone)]
struct OllamaState {
    completion: Arc<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

async fn ollama_generate(State(state): State<OllamaState>, Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["stream"], false, "classifier must not stream");
    if let Some(prompt) = body["prompt"].as_str() {
        state.prompts.lock().unwrap().push(prompt.to_string());
    }
    Json(json!({ "model": body["model"], "response": state.completion.as_str(), "done": true }))
}

async fn ollama_tags() -> Json<Value> {
    Json(json!({ "models": [{ "name": FAKE_OLLAMA_MODEL }] }))
}

/// Answers every generate call with a fixed completion
pub struct FakeOllamaService {
    pub base_url: String,
    prompts: Arc<Mutex<Vec<String>>>,
    _service: RunningService,
}

impl FakeOllamaService {
    pub async fn spawn(completion: &str) -> Self {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let state = OllamaState {
            completion: Arc::new(completion.to_string()),
            prompts: prompts.clone(),
        };
        let app = Router::new()
            .route("/api/generate", post(ollama_generate))
            .route("/api/tags", get(ollama_tags))
            .with_state(state);
        let service = RunningService::start(app).await;

        Self {
            base_url: service.base_url.clone(),
            prompts,
            _service: service,
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

// ============================================================================
// Stable Diffusion web API
// ============================================================================

async fn sd_models() -> Json<Value> {
    Json(json!([{ "title": format!("{} [abc123]", FAKE_DIFFUSION_MODEL), "model_name": FAKE_DIFFUSION_MODEL }]))
}

async fn txt2img(State(calls): State<Arc<AtomicUsize>>, Json(body): Json<Value>) -> Json<Value> {
    calls.fetch_add(1, Ordering::SeqCst);
    assert!(body["prompt"].is_string(), "txt2img needs a prompt");
    let image = base64::engine::general_purpose::STANDARD.encode(FAKE_PNG);
    Json(json!({ "images": [image], "parameters": {}, "info": "" }))
}

/// Returns the same tiny PNG for every prompt
pub struct FakeDiffusionService {
    pub base_url: String,
    calls: Arc<AtomicUsize>,
    _service: RunningService,
}

impl FakeDiffusionService {
    pub async fn spawn() -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/sdapi/v1/sd-models", get(sd_models))
            .route("/sdapi/v1/txt2img", post(txt2img))
            .with_state(calls.clone());
        let service = RunningService::start(app).await;

        Self {
            base_url: service.base_url.clone(),
            calls,
            _service: service,
        }
    }

    /// Number of txt2img calls served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
