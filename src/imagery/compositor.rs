//! Builds the image set of a board.

use super::generator::{to_data_url, GenerationError, ImageModelHandle};
use super::placeholder::{PlaceholderError, PlaceholderProvider};
use super::{ChainOutcome, GenerationResult, ImageResult};
use crate::palette::{name_color, Palette};
use crate::random::RandomSource;
use crate::server::metrics;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_STYLE: &str = "realistic";

const DEFAULT_QUERY: &str = "inspiration";
const MAX_QUERY_KEYWORDS: usize = 3;
const MAX_COLOR_NAMES: usize = 2;

/// Per-slot prompt flavors as (color noun, trailing phrase), picked by
/// slot index modulo their count.
const PROMPT_FLAVORS: [(&str, &str); 5] = [
    ("theme", "soft lighting, beautiful, high quality"),
    ("palette", "warm atmosphere, artistic, creative"),
    ("scheme", "natural lighting, inspiring, detailed"),
    ("tones", "ambient lighting, aesthetic, masterpiece"),
    ("harmony", "golden hour lighting, elegant, professional"),
];

pub fn search_query(keywords: &[String]) -> String {
    if keywords.is_empty() {
        return DEFAULT_QUERY.to_string();
    }
    keywords
        .iter()
        .take(MAX_QUERY_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Names of the first two nameable palette colors, joined with ", ".
///
/// Colors without a close reference name are skipped. Repeated names are
/// kept as they are.
pub fn color_description(palette: Option<&Palette>) -> String {
    let Some(palette) = palette else {
        return String::new();
    };

    palette
        .colors()
        .iter()
        .filter_map(|color| name_color(*color))
        .take(MAX_COLOR_NAMES)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn slot_prompt(slot: usize, query: &str, colors: &str) -> String {
    let (color_noun, phrase) = PROMPT_FLAVORS[slot % PROMPT_FLAVORS.len()];
    if colors.is_empty() {
        format!("{}, {}", query, phrase)
    } else {
        format!("{}, {} color {}, {}", query, colors, color_noun, phrase)
    }
}

pub fn enhance_prompt(prompt: &str, style: &str) -> String {
    format!(
        "{}, {} style, high quality, detailed, beautiful, masterpiece",
        prompt, style
    )
}

/// Runs the generation chain for each board slot.
pub struct ImageCompositor {
    model: Arc<ImageModelHandle>,
    placeholders: PlaceholderProvider,
    random: Arc<RandomSource>,
}

impl ImageCompositor {
    pub fn new(
        model: Arc<ImageModelHandle>,
        placeholders: PlaceholderProvider,
        random: Arc<RandomSource>,
    ) -> Self {
        Self {
            model,
            placeholders,
            random,
        }
    }

    pub fn model(&self) -> &Arc<ImageModelHandle> {
        &self.model
    }

    /// Exactly `count` images, one per slot, computed concurrently.
    pub async fn compose_images(
        &self,
        keywords: &[String],
        palette: Option<&Palette>,
        count: usize,
        style: &str,
    ) -> Vec<ImageResult> {
        let query = search_query(keywords);
        let colors = color_description(palette);
        let alt_text = keywords
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_QUERY);

        debug!(query = %query, colors = %colors, count, "Composing board images");

        let slots = (0..count).map(|slot| {
            let prompt = slot_prompt(slot, &query, &colors);
            async move {
                let outcome = self.run_chain(&prompt, style).await;
                ImageResult::from_outcome(slot, alt_text, outcome)
            }
        });
        join_all(slots).await
    }

    pub async fn generate_single(&self, prompt: &str, style: &str) -> GenerationResult {
        let outcome = self.run_chain(prompt, style).await;
        GenerationResult::from_outcome(prompt, outcome)
    }

    async fn run_chain(&self, prompt: &str, style: &str) -> ChainOutcome {
        let outcome = match self.generate(prompt, style).await {
            Ok(outcome) => outcome,
            Err(GenerationError::ModelUnavailable) => {
                debug!("Image model not available, using themed placeholder");
                self.placeholder(prompt)
            }
            Err(err @ (GenerationError::Model(_) | GenerationError::InvalidOutput(_))) => {
                warn!(error = %err, "Image generation failed, using themed placeholder");
                self.placeholder(prompt)
            }
        };
        metrics::record_image(outcome.kind());
        outcome
    }

    async fn generate(&self, prompt: &str, style: &str) -> Result<ChainOutcome, GenerationError> {
        let generator = self.model.generator()?;
        let enhanced_prompt = enhance_prompt(prompt, style);
        let bitmap = generator.generate(&enhanced_prompt).await?;
        if bitmap.is_empty() {
            return Err(GenerationError::InvalidOutput("empty image".to_string()));
        }
        Ok(ChainOutcome::Generated {
            url: to_data_url(&bitmap),
            enhanced_prompt,
            model: generator.model().to_string(),
        })
    }

    fn placeholder(&self, prompt: &str) -> ChainOutcome {
        match self.placeholders.themed(prompt, &self.random) {
            Ok((url, category)) => ChainOutcome::Themed { url, category },
            Err(err @ PlaceholderError::InvalidBaseUrl { .. })
            | Err(err @ PlaceholderError::EmptySeedPool(_)) => {
                warn!(error = %err, "Themed placeholder failed, using random placeholder");
                ChainOutcome::Random {
                    url: self.placeholders.random_url(&self.random),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::generator::ImageGenerator;
    use crate::imagery::{PlaceholderCategory, SourceKind};
    use crate::mood::MoodLabel;
    use crate::palette::{palette_variants, Color};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeGenerator {
        result: Result<Vec<u8>, fn() -> GenerationError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn returning(bytes: Vec<u8>) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(bytes),
                prompts: Mutex::new(vec![]),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: Err(|| GenerationError::Model("out of memory".to_string())),
                prompts: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait]
    impl ImageGenerator for FakeGenerator {
        fn model(&self) -> &str {
            "fake-diffusion"
        }

        async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.result {
                Ok(bytes) => Ok(bytes.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn greens() -> Palette {
        Palette([
            Color::from_u24(0x228B22),
            Color::from_u24(0x32CD32),
            Color::from_u24(0x98FB98),
            Color::from_u24(0x90EE90),
            Color::from_u24(0x006400),
        ])
    }

    fn compositor(model: ImageModelHandle, base_url: &str) -> ImageCompositor {
        ImageCompositor::new(
            Arc::new(model),
            PlaceholderProvider::new(base_url, 512, 512),
            Arc::new(RandomSource::from_seed(42)),
        )
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn query_uses_first_three_keywords() {
        assert_eq!(
            search_query(&keywords(&["a", "b", "c", "d"])),
            "a b c"
        );
        assert_eq!(search_query(&[]), "inspiration");
    }

    #[test]
    fn color_description_takes_first_two_names() {
        // 0x228B22 and 0x32CD32 both name as lime green.
        assert_eq!(color_description(Some(&greens())), "lime green, lime green");
        assert_eq!(color_description(None), "");
    }

    #[test]
    fn color_description_keeps_repeated_names() {
        let romantic = palette_variants(MoodLabel::Romantic)[1];
        assert_eq!(color_description(Some(&romantic)), "pink, pink");

        let melancholic = palette_variants(MoodLabel::Melancholic);
        assert_eq!(color_description(Some(&melancholic[0])), "gray, gray");
        assert_eq!(color_description(Some(&melancholic[2])), "gray, gray");
    }

    #[test]
    fn slot_prompts_cycle() {
        assert_eq!(
            slot_prompt(0, "forest calm", "green"),
            "forest calm, green color theme, soft lighting, beautiful, high quality"
        );
        assert_eq!(slot_prompt(5, "q", "c"), slot_prompt(0, "q", "c"));
        assert_eq!(
            slot_prompt(4, "q", ""),
            "q, golden hour lighting, elegant, professional"
        );
    }

    #[tokio::test]
    async fn returns_exactly_count_images() {
        let compositor = compositor(ImageModelHandle::new(), "https://picsum.photos");
        for count in [0, 1, 7] {
            let images = compositor
                .compose_images(&keywords(&["sunset"]), None, count, DEFAULT_STYLE)
                .await;
            assert_eq!(images.len(), count);
        }
    }

    #[tokio::test]
    async fn failing_model_falls_back_to_themed_nature() {
        let compositor = compositor(
            ImageModelHandle::with_generator(FakeGenerator::failing()),
            "https://picsum.photos",
        );
        let images = compositor
            .compose_images(&keywords(&["forest", "calm"]), Some(&greens()), 3, DEFAULT_STYLE)
            .await;

        assert_eq!(images.len(), 3);
        for (slot, image) in images.iter().enumerate() {
            assert_eq!(image.source_kind, SourceKind::ThemedPlaceholder);
            assert_eq!(image.category, Some(PlaceholderCategory::Nature));
            assert_eq!(image.identifier, format!("themed_{}", slot));
            assert_eq!(image.alt_text, "forest");
            let seed: u32 = image.url.rsplit('=').next().unwrap().parse().unwrap();
            assert!(PlaceholderCategory::Nature.seeds().contains(&seed));
        }
    }

    #[tokio::test]
    async fn working_model_yields_data_urls() {
        let generator = FakeGenerator::returning(vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4]);
        let compositor = compositor(
            ImageModelHandle::with_generator(generator.clone()),
            "https://picsum.photos",
        );
        let images = compositor
            .compose_images(&keywords(&["ocean"]), None, 2, "watercolor")
            .await;

        assert!(images
            .iter()
            .all(|image| image.source_kind == SourceKind::AiGenerated
                && image.url.starts_with("data:image/png;base64,")));
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts
            .iter()
            .all(|p| p.ends_with("watercolor style, high quality, detailed, beautiful, masterpiece")));
    }

    #[tokio::test]
    async fn empty_bitmap_is_not_accepted() {
        let compositor = compositor(
            ImageModelHandle::with_generator(FakeGenerator::returning(vec![])),
            "https://picsum.photos",
        );
        let result = compositor.generate_single("a quiet city", DEFAULT_STYLE).await;
        assert_eq!(result.source_kind, SourceKind::ThemedPlaceholder);
        assert_eq!(result.category, Some(PlaceholderCategory::Urban));
    }

    #[tokio::test]
    async fn bad_placeholder_base_falls_back_to_random() {
        let compositor = compositor(ImageModelHandle::new(), "::not a url::");
        let images = compositor
            .compose_images(&keywords(&["forest"]), None, 2, DEFAULT_STYLE)
            .await;
        for image in &images {
            assert_eq!(image.source_kind, SourceKind::RandomPlaceholder);
            assert!(image.identifier.starts_with("fallback_"));
            assert!(image.category.is_none());
        }
    }

    #[tokio::test]
    async fn single_generation_reports_model_and_enhanced_prompt() {
        let compositor = compositor(
            ImageModelHandle::with_generator(FakeGenerator::returning(vec![0xFF, 0xD8, 0xFF, 0xE0])),
            "https://picsum.photos",
        );
        let result = compositor.generate_single("a lighthouse", DEFAULT_STYLE).await;
        assert_eq!(result.source, "Local Stable Diffusion");
        assert_eq!(result.model.as_deref(), Some("fake-diffusion"));
        assert_eq!(
            result.prompt,
            "a lighthouse, realistic style, high quality, detailed, beautiful, masterpiece"
        );
        assert!(result.url.starts_with("data:image/jpeg;base64,"));
    }
}
