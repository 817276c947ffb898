mod file_config;

pub use file_config::{BoardConfig, ClassifierConfig, FileConfig, ImageModelConfig, PlaceholderConfig};

use crate::board::BoardSettings;
use crate::imagery::DiffusionSettings;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub classifier_url: String,
    pub classifier_model: String,
    pub classifier_timeout_sec: u64,
    pub disable_classifier: bool,
    pub image_model_url: Option<String>,
    pub image_model: String,
    pub placeholder_base_url: String,
    pub allowed_origins: Vec<String>,
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub allowed_origins: Vec<String>,
    pub rng_seed: Option<u64>,

    /// `None` when the classifier is disabled.
    pub classifier: Option<ClassifierSettings>,
    /// `None` when no diffusion service is configured.
    pub image_model: Option<DiffusionSettings>,
    pub placeholder: PlaceholderSettings,
    pub board: BoardSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSettings {
    pub url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSettings {
    pub base_url: String,
    pub width: u32,
    pub height: u32,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let allowed_origins = file
            .allowed_origins
            .unwrap_or_else(|| cli.allowed_origins.clone());
        for origin in &allowed_origins {
            if origin == "*" {
                bail!("Wildcard origin is not allowed, credentials are enabled");
            }
            if reqwest::Url::parse(origin).is_err() {
                bail!("Invalid allowed origin: {}", origin);
            }
        }

        let rng_seed = file.rng_seed.or(cli.rng_seed);

        let classifier_file = file.classifier.unwrap_or_default();
        let classifier_enabled = classifier_file.enabled.unwrap_or(!cli.disable_classifier);
        let classifier = classifier_enabled.then(|| ClassifierSettings {
            url: classifier_file
                .url
                .unwrap_or_else(|| cli.classifier_url.clone()),
            model: classifier_file
                .model
                .unwrap_or_else(|| cli.classifier_model.clone()),
            timeout: Duration::from_secs(
                classifier_file
                    .timeout_sec
                    .unwrap_or(cli.classifier_timeout_sec),
            ),
        });

        let image_file = file.image_model.unwrap_or_default();
        let image_defaults = DiffusionSettings::default();
        let image_model = image_file
            .url
            .or_else(|| cli.image_model_url.clone())
            .map(|base_url| DiffusionSettings {
                base_url,
                model: image_file
                    .model
                    .clone()
                    .unwrap_or_else(|| cli.image_model.clone()),
                steps: image_file.steps.unwrap_or(image_defaults.steps),
                guidance_scale: image_file
                    .guidance_scale
                    .unwrap_or(image_defaults.guidance_scale),
                width: image_file.width.unwrap_or(image_defaults.width),
                height: image_file.height.unwrap_or(image_defaults.height),
                timeout: image_file.timeout_secs.map(Duration::from_secs),
            });

        let placeholder_file = file.placeholder.unwrap_or_default();
        let placeholder = PlaceholderSettings {
            base_url: placeholder_file
                .base_url
                .unwrap_or_else(|| cli.placeholder_base_url.clone()),
            width: placeholder_file.width.unwrap_or(512),
            height: placeholder_file.height.unwrap_or(512),
        };
        if placeholder.width == 0 || placeholder.height == 0 {
            bail!("Placeholder width and height must be positive");
        }

        let board_file = file.board.unwrap_or_default();
        let board_defaults = BoardSettings::default();
        let board = BoardSettings {
            images_per_board: board_file
                .images_per_board
                .unwrap_or(board_defaults.images_per_board),
            max_images_per_request: board_file
                .max_images_per_request
                .unwrap_or(board_defaults.max_images_per_request),
        };
        if board.images_per_board > board.max_images_per_request {
            bail!(
                "images_per_board ({}) exceeds max_images_per_request ({})",
                board.images_per_board,
                board.max_images_per_request
            );
        }

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            allowed_origins,
            rng_seed,
            classifier,
            image_model,
            placeholder,
            board,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

/// Splits a comma-separated origin list, dropping empty entries.
pub fn parse_origins(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
