//! AI image generation.
//!
//! The diffusion model runs out of process behind an HTTP API. The server
//! holds at most one generator in an [`ImageModelHandle`], installed once at
//! startup and read concurrently by every request afterwards.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_IMAGE_MODEL: &str = "runwayml/stable-diffusion-v1-5";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Image model unavailable")]
    ModelUnavailable,

    #[error("Image model error: {0}")]
    Model(String),

    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
}

/// Text-to-image backend.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Identifier of the loaded model.
    fn model(&self) -> &str;

    /// Run inference and return the encoded bitmap.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

enum ModelState {
    Uninitialized,
    Initializing,
    Ready(Arc<dyn ImageGenerator>),
    Failed(String),
}

/// Process-wide slot for the image generator.
///
/// Callers never wait on initialization: anything but a ready model reports
/// [`GenerationError::ModelUnavailable`] straight away.
pub struct ImageModelHandle {
    state: RwLock<ModelState>,
}

impl ImageModelHandle {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ModelState::Uninitialized),
        }
    }

    /// Handle that is ready from the start.
    pub fn with_generator(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            state: RwLock::new(ModelState::Ready(generator)),
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, ModelState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, ModelState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `loader` and install its generator.
    ///
    /// Does nothing if a model is ready or another initialization is running.
    /// Returns the resulting status. Dropping the returned future before it
    /// completes puts the handle back to uninitialized.
    pub async fn initialize<F>(&self, loader: F) -> ModelStatus
    where
        F: std::future::Future<Output = Result<Arc<dyn ImageGenerator>, GenerationError>>,
    {
        {
            let mut state = self.write_state();
            match *state {
                ModelState::Ready(_) => return ModelStatus::Ready,
                ModelState::Initializing => return ModelStatus::Initializing,
                ModelState::Uninitialized | ModelState::Failed(_) => {
                    *state = ModelState::Initializing;
                }
            }
        }

        let pending = PendingInitialization { handle: self };
        let loaded = loader.await;
        pending.complete();

        let mut state = self.write_state();
        match loaded {
            Ok(generator) => {
                info!(model = %generator.model(), "Image model ready");
                *state = ModelState::Ready(generator);
                ModelStatus::Ready
            }
            Err(e) => {
                warn!(error = %e, "Image model failed to initialize, placeholders only");
                *state = ModelState::Failed(e.to_string());
                ModelStatus::Failed
            }
        }
    }

    /// Drop the generator. In-flight generations keep their own reference.
    pub fn shutdown(&self) {
        let mut state = self.write_state();
        if matches!(*state, ModelState::Ready(_)) {
            info!("Image model released");
        }
        *state = ModelState::Uninitialized;
    }

    pub fn status(&self) -> ModelStatus {
        match *self.read_state() {
            ModelState::Uninitialized => ModelStatus::Uninitialized,
            ModelState::Initializing => ModelStatus::Initializing,
            ModelState::Ready(_) => ModelStatus::Ready,
            ModelState::Failed(_) => ModelStatus::Failed,
        }
    }

    pub fn failure_reason(&self) -> Option<String> {
        match &*self.read_state() {
            ModelState::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    pub fn generator(&self) -> Result<Arc<dyn ImageGenerator>, GenerationError> {
        match &*self.read_state() {
            ModelState::Ready(generator) => Ok(generator.clone()),
            _ => Err(GenerationError::ModelUnavailable),
        }
    }
}

/// Resets an abandoned initialization.
struct PendingInitialization<'a> {
    handle: &'a ImageModelHandle,
}

impl PendingInitialization<'_> {
    fn complete(self) {
        std::mem::forget(self);
    }
}

impl Drop for PendingInitialization<'_> {
    fn drop(&mut self) {
        let mut state = self.handle.write_state();
        if matches!(*state, ModelState::Initializing) {
            warn!("Image model initialization cancelled");
            *state = ModelState::Uninitialized;
        }
    }
}

impl Default for ImageModelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for [`DiffusionClient`].
#[derive(Debug, Clone)]
pub struct DiffusionSettings {
    pub base_url: String,
    pub model: String,
    pub steps: u32,
    pub guidance_scale: f32,
    pub width: u32,
    pub height: u32,
    /// `None` lets inference take as long as it needs.
    pub timeout: Option<Duration>,
}

impl Default for DiffusionSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7860".to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            steps: 20,
            guidance_scale: 7.5,
            width: 512,
            height: 512,
            timeout: None,
        }
    }
}

/// Client for a local Stable Diffusion web API (`/sdapi/v1`).
pub struct DiffusionClient {
    client: reqwest::Client,
    settings: DiffusionSettings,
}

impl DiffusionClient {
    /// Probe the service and return a client for it.
    ///
    /// Fails when the service is unreachable. A configured model missing from
    /// the service's list is only logged; the service then uses its default.
    pub async fn connect(settings: DiffusionSettings) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GenerationError::Model(format!("Failed to create HTTP client: {}", e)))?;

        let settings = DiffusionSettings {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            ..settings
        };

        let url = format!("{}/sdapi/v1/sd-models", settings.base_url);
        let response = client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| GenerationError::Model(format!("Diffusion service unreachable: {}", e)))?;
        if !response.status().is_success() {
            return Err(GenerationError::Model(format!(
                "Diffusion service probe failed with status {}",
                response.status()
            )));
        }

        let models: Vec<SdModel> = response.json().await.map_err(|e| {
            GenerationError::InvalidOutput(format!("Failed to parse model list: {}", e))
        })?;
        let model_known = models
            .iter()
            .any(|m| m.model_name == settings.model || m.title.starts_with(&settings.model));
        if !model_known {
            warn!(
                model = %settings.model,
                available_models = ?models.iter().map(|m| &m.model_name).collect::<Vec<_>>(),
                "Configured image model not found in diffusion service"
            );
        }

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ImageGenerator for DiffusionClient {
    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let url = format!("{}/sdapi/v1/txt2img", self.settings.base_url);
        let request = Txt2ImgRequest {
            prompt,
            steps: self.settings.steps,
            cfg_scale: self.settings.guidance_scale,
            width: self.settings.width,
            height: self.settings.height,
            override_settings: OverrideSettings {
                sd_model_checkpoint: &self.settings.model,
            },
        };

        debug!(prompt = %prompt, "Generating image");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Model(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Model(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let body: Txt2ImgResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidOutput(e.to_string()))?;

        let encoded = body
            .images
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::InvalidOutput("no image returned".to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| GenerationError::InvalidOutput(format!("bad base64 payload: {}", e)))
    }
}

// Diffusion API types

#[derive(Debug, Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    steps: u32,
    cfg_scale: f32,
    width: u32,
    height: u32,
    override_settings: OverrideSettings<'a>,
}

#[derive(Debug, Serialize)]
struct OverrideSettings<'a> {
    sd_model_checkpoint: &'a str,
}

#[derive(Debug, Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SdModel {
    #[serde(default)]
    title: String,
    #[serde(default)]
    model_name: String,
}

/// Wrap a bitmap as a `data:` URL, sniffing the mime type.
pub fn to_data_url(bytes: &[u8]) -> String {
    let mime = infer::get(bytes)
        .map(|kind| kind.mime_type())
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or("image/png");
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
