//! Board images.
//!
//! Each image slot walks a three step chain: AI generation, then a themed
//! placeholder picked by category and seed, then a random placeholder. The
//! last step is plain string formatting and cannot fail, so every slot ends
//! up with an image.

pub mod compositor;
pub mod generator;
pub mod placeholder;

pub use compositor::ImageCompositor;
pub use generator::{
    DiffusionClient, DiffusionSettings, GenerationError, ImageGenerator, ImageModelHandle,
    ModelStatus,
};
pub use placeholder::{PlaceholderCategory, PlaceholderError, PlaceholderProvider};

use serde::{Serialize, Serializer};

/// Which step of the chain produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    AiGenerated,
    ThemedPlaceholder,
    RandomPlaceholder,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::AiGenerated => "ai_generated",
            SourceKind::ThemedPlaceholder => "themed_placeholder",
            SourceKind::RandomPlaceholder => "random_placeholder",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            SourceKind::AiGenerated => "ai",
            SourceKind::ThemedPlaceholder => "themed",
            SourceKind::RandomPlaceholder => "fallback",
        }
    }

    fn attribution(&self) -> &'static str {
        match self {
            SourceKind::AiGenerated => "AI Generated",
            SourceKind::ThemedPlaceholder => "Themed Image",
            SourceKind::RandomPlaceholder => "Fallback Image",
        }
    }
}

/// One image of a board.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResult {
    pub identifier: String,
    /// Remote URL or a `data:` URL holding the bitmap.
    pub url: String,
    pub alt_text: String,
    pub attribution: String,
    pub source_kind: SourceKind,
    /// Human readable origin, e.g. "Themed nature image".
    pub source: String,
    pub category: Option<PlaceholderCategory>,
}

impl ImageResult {
    pub(crate) fn from_outcome(slot: usize, alt_text: &str, outcome: ChainOutcome) -> Self {
        let kind = outcome.kind();
        ImageResult {
            identifier: format!("{}_{}", kind.id_prefix(), slot),
            alt_text: alt_text.to_string(),
            attribution: kind.attribution().to_string(),
            source_kind: kind,
            source: outcome.source_description(),
            category: outcome.category(),
            url: outcome.into_url(),
        }
    }
}

impl Serialize for ImageResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Urls<'a> {
            regular: &'a str,
        }

        #[derive(Serialize)]
        struct User<'a> {
            name: &'a str,
        }

        #[derive(Serialize)]
        struct Wire<'a> {
            id: &'a str,
            urls: Urls<'a>,
            alt_description: &'a str,
            user: User<'a>,
            source: &'a str,
            source_kind: SourceKind,
            #[serde(skip_serializing_if = "Option::is_none")]
            category: Option<PlaceholderCategory>,
        }

        Wire {
            id: &self.identifier,
            urls: Urls { regular: &self.url },
            alt_description: &self.alt_text,
            user: User {
                name: &self.attribution,
            },
            source: &self.source,
            source_kind: self.source_kind,
            category: self.category,
        }
        .serialize(serializer)
    }
}

/// Answer of the single-image generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub url: String,
    pub prompt: String,
    pub source: String,
    pub source_kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PlaceholderCategory>,
}

impl GenerationResult {
    pub(crate) fn from_outcome(prompt: &str, outcome: ChainOutcome) -> Self {
        let kind = outcome.kind();
        let source = outcome.source_description();
        match outcome {
            ChainOutcome::Generated {
                url,
                enhanced_prompt,
                model,
            } => GenerationResult {
                url,
                prompt: enhanced_prompt,
                source,
                source_kind: kind,
                model: Some(model),
                category: None,
            },
            ChainOutcome::Themed { url, category } => GenerationResult {
                url,
                prompt: prompt.to_string(),
                source,
                source_kind: kind,
                model: None,
                category: Some(category),
            },
            ChainOutcome::Random { url } => GenerationResult {
                url,
                prompt: prompt.to_string(),
                source,
                source_kind: kind,
                model: None,
                category: None,
            },
        }
    }
}

/// What the fallback chain settled on for one prompt.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ChainOutcome {
    Generated {
        url: String,
        enhanced_prompt: String,
        model: String,
    },
    Themed {
        url: String,
        category: PlaceholderCategory,
    },
    Random {
        url: String,
    },
}

impl ChainOutcome {
    fn kind(&self) -> SourceKind {
        match self {
            ChainOutcome::Generated { .. } => SourceKind::AiGenerated,
            ChainOutcome::Themed { .. } => SourceKind::ThemedPlaceholder,
            ChainOutcome::Random { .. } => SourceKind::RandomPlaceholder,
        }
    }

    fn source_description(&self) -> String {
        match self {
            ChainOutcome::Generated { .. } => "Local Stable Diffusion".to_string(),
            ChainOutcome::Themed { category, .. } => format!("Themed {} image", category),
            ChainOutcome::Random { .. } => "Fallback random image".to_string(),
        }
    }

    fn category(&self) -> Option<PlaceholderCategory> {
        match self {
            ChainOutcome::Themed { category, .. } => Some(*category),
            _ => None,
        }
    }

    fn into_url(self) -> String {
        match self {
            ChainOutcome::Generated { url, .. }
            | ChainOutcome::Themed { url, .. }
            | ChainOutcome::Random { url } => url,
        }
    }
}
