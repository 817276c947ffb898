//! Stock placeholder images keyed by seed.

use crate::random::RandomSource;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_PLACEHOLDER_BASE_URL: &str = "https://picsum.photos";

/// Range of the seed used by the random placeholder.
pub const RANDOM_SEED_RANGE: std::ops::RangeInclusive<u32> = 1000..=9999;

#[derive(Debug, Error)]
pub enum PlaceholderError {
    #[error("Invalid placeholder base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("No seeds configured for category {0}")]
    EmptySeedPool(PlaceholderCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderCategory {
    Nature,
    Urban,
    Romantic,
    Peaceful,
    Energetic,
    Vintage,
    Modern,
}

impl PlaceholderCategory {
    /// Every category, in matching priority order.
    pub const ALL: [PlaceholderCategory; 7] = [
        PlaceholderCategory::Nature,
        PlaceholderCategory::Urban,
        PlaceholderCategory::Romantic,
        PlaceholderCategory::Peaceful,
        PlaceholderCategory::Energetic,
        PlaceholderCategory::Vintage,
        PlaceholderCategory::Modern,
    ];

    pub const DEFAULT: PlaceholderCategory = PlaceholderCategory::Nature;

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderCategory::Nature => "nature",
            PlaceholderCategory::Urban => "urban",
            PlaceholderCategory::Romantic => "romantic",
            PlaceholderCategory::Peaceful => "peaceful",
            PlaceholderCategory::Energetic => "energetic",
            PlaceholderCategory::Vintage => "vintage",
            PlaceholderCategory::Modern => "modern",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            PlaceholderCategory::Nature => &[
                "forest",
                "mountain",
                "sea",
                "ocean",
                "tree",
                "flower",
                "landscape",
            ],
            PlaceholderCategory::Urban => &["city", "building", "street", "architecture", "modern"],
            PlaceholderCategory::Romantic => &["love", "heart", "romantic", "candle", "wine", "rose"],
            PlaceholderCategory::Peaceful => &["calm", "serene", "peaceful", "meditation", "yoga"],
            PlaceholderCategory::Energetic => {
                &["sport", "fitness", "dynamic", "energetic", "active"]
            }
            PlaceholderCategory::Vintage => &["retro", "vintage", "old", "classic", "nostalgic"],
            PlaceholderCategory::Modern => {
                &["modern", "minimalist", "clean", "simple", "contemporary"]
            }
        }
    }

    pub fn seeds(&self) -> &'static [u32] {
        match self {
            PlaceholderCategory::Nature => &[100, 200, 300, 400, 500],
            PlaceholderCategory::Urban => &[600, 700, 800, 900, 1000],
            PlaceholderCategory::Romantic => &[1100, 1200, 1300, 1400, 1500],
            PlaceholderCategory::Peaceful => &[1600, 1700, 1800, 1900, 2000],
            PlaceholderCategory::Energetic => &[2100, 2200, 2300, 2400, 2500],
            PlaceholderCategory::Vintage => &[2600, 2700, 2800, 2900, 3000],
            PlaceholderCategory::Modern => &[3100, 3200, 3300, 3400, 3500],
        }
    }
}

impl fmt::Display for PlaceholderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First category with a keyword among the prompt's lower-cased tokens.
pub fn classify_prompt(prompt: &str) -> PlaceholderCategory {
    let lowered = prompt.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();

    PlaceholderCategory::ALL
        .into_iter()
        .find(|category| {
            category
                .keywords()
                .iter()
                .any(|keyword| tokens.contains(keyword))
        })
        .unwrap_or(PlaceholderCategory::DEFAULT)
}

/// Builds placeholder image URLs of a fixed size.
#[derive(Debug, Clone)]
pub struct PlaceholderProvider {
    base_url: String,
    width: u32,
    height: u32,
}

impl PlaceholderProvider {
    pub fn new(base_url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            base_url: base_url.into(),
            width,
            height,
        }
    }

    /// URL of the image stored under `seed`.
    pub fn url_for_seed(&self, seed: u32) -> Result<String, PlaceholderError> {
        let invalid = |reason: String| PlaceholderError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };

        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.width.to_string())
            .push(&self.height.to_string());
        url.query_pairs_mut()
            .clear()
            .append_pair("random", &seed.to_string());
        Ok(url.to_string())
    }

    /// Placeholder matching the prompt's category, with a seed from its pool.
    pub fn themed(
        &self,
        prompt: &str,
        random: &RandomSource,
    ) -> Result<(String, PlaceholderCategory), PlaceholderError> {
        let category = classify_prompt(prompt);
        let seed = random
            .choose(category.seeds())
            .copied()
            .ok_or(PlaceholderError::EmptySeedPool(category))?;
        Ok((self.url_for_seed(seed)?, category))
    }

    /// Any placeholder at all. Plain formatting, so it cannot fail.
    pub fn random_url(&self, random: &RandomSource) -> String {
        let seed = random.range(RANDOM_SEED_RANGE);
        format!(
            "{}/{}/{}?random={}",
            self.base_url.trim_end_matches('/'),
            self.width,
            self.height,
            seed
        )
    }
}

impl Default for PlaceholderProvider {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_BASE_URL, 512, 512)
    }
}
