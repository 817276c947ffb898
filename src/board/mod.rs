//! Mood board assembly.
//!
//! Description in, board out: classify the mood, pick a palette for it and
//! fill the image slots. Every external dependency is absorbed by its own
//! fallback, so the operations here have no error path.

use crate::example_prompts::{pick_example_prompts, ExamplePrompts};
use crate::imagery::{GenerationResult, ImageCompositor, ImageResult, ModelStatus};
use crate::mood::{MoodClassifier, MoodResult};
use crate::palette::{select_palette, Palette};
use crate::random::RandomSource;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub use crate::imagery::compositor::DEFAULT_STYLE;

pub const DEFAULT_IMAGES_PER_BOARD: usize = 5;
pub const DEFAULT_MAX_IMAGES_PER_REQUEST: usize = 20;

/// Range of the numeric part of a saved board id.
const BOARD_ID_RANGE: std::ops::RangeInclusive<u32> = 1000..=9999;

#[derive(Debug, Clone, Copy)]
pub struct BoardSettings {
    pub images_per_board: usize,
    pub max_images_per_request: usize,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            images_per_board: DEFAULT_IMAGES_PER_BOARD,
            max_images_per_request: DEFAULT_MAX_IMAGES_PER_REQUEST,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodBoard {
    pub images: Vec<ImageResult>,
    pub color_palette: Palette,
    pub inspiration_text: String,
    pub mood_analysis: MoodResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedBoard {
    pub message: String,
    pub board_id: String,
    pub data: serde_json::Value,
}

pub struct MoodBoardService {
    classifier: MoodClassifier,
    compositor: ImageCompositor,
    random: Arc<RandomSource>,
    settings: BoardSettings,
}

impl MoodBoardService {
    pub fn new(
        classifier: MoodClassifier,
        compositor: ImageCompositor,
        random: Arc<RandomSource>,
        settings: BoardSettings,
    ) -> Self {
        Self {
            classifier,
            compositor,
            random,
            settings,
        }
    }

    pub fn image_model_status(&self) -> ModelStatus {
        self.compositor.model().status()
    }

    /// Why the image model failed to load, if it did.
    pub fn image_model_failure(&self) -> Option<String> {
        self.compositor.model().failure_reason()
    }

    pub async fn analyze(&self, description: &str, style: Option<&str>) -> MoodBoard {
        let mood_analysis = self.classifier.classify(description).await;
        let color_palette = select_palette(mood_analysis.mood, &self.random);
        let images = self
            .compositor
            .compose_images(
                &mood_analysis.keywords,
                Some(&color_palette),
                self.settings.images_per_board,
                style.unwrap_or(DEFAULT_STYLE),
            )
            .await;

        info!(
            mood = %mood_analysis.mood,
            source = mood_analysis.source.as_str(),
            images = images.len(),
            "Mood board created"
        );

        MoodBoard {
            images,
            color_palette,
            inspiration_text: mood_analysis.inspiration_text.clone(),
            mood_analysis,
        }
    }

    /// Images for a free-text query, without color hints.
    ///
    /// `count` is clamped to the configured per-request maximum.
    pub async fn search_images(&self, query: &str, count: usize) -> Vec<ImageResult> {
        let keywords: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        let count = count.min(self.settings.max_images_per_request);
        self.compositor
            .compose_images(&keywords, None, count, DEFAULT_STYLE)
            .await
    }

    pub async fn generate_image(&self, prompt: &str, style: Option<&str>) -> GenerationResult {
        self.compositor
            .generate_single(prompt, style.unwrap_or(DEFAULT_STYLE))
            .await
    }

    /// Acknowledges a board. Nothing is stored.
    pub fn save_board(&self, data: serde_json::Value) -> SavedBoard {
        let board_id = format!("board_{}", self.random.range(BOARD_ID_RANGE));
        info!(board_id = %board_id, "Mood board saved");
        SavedBoard {
            message: "Mood board saved successfully".to_string(),
            board_id,
            data,
        }
    }

    pub fn example_prompts(&self) -> ExamplePrompts {
        pick_example_prompts(&self.random, chrono::Utc::now().timestamp())
    }
}
