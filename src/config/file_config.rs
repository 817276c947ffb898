use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
    pub rng_seed: Option<u64>,

    // Collaborators
    pub classifier: Option<ClassifierConfig>,
    pub image_model: Option<ImageModelConfig>,
    pub placeholder: Option<PlaceholderConfig>,
    pub board: Option<BoardConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Set to false to always use the keyword heuristic.
    pub enabled: Option<bool>,
    pub url: Option<String>,
    pub model: Option<String>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ImageModelConfig {
    pub url: Option<String>,
    pub model: Option<String>,
    pub steps: Option<u32>,
    pub guidance_scale: Option<f32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Per-inference timeout. Unset means no timeout.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub base_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BoardConfig {
    pub images_per_board: Option<usize>,
    pub max_images_per_request: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
