//! Mood detection.
//!
//! A description is mapped to one of eight fixed [`MoodLabel`]s together with
//! up to three visual keywords and an inspirational sentence. The external
//! classifier is preferred; the keyword heuristic is the total fallback.

pub mod classifier;
mod heuristic;

pub use classifier::{ClassifierError, MoodClassifier, CLASSIFIER_TIMEOUT};
pub use heuristic::{analyze_heuristically, detect_mood, extract_keywords, inspiration_for};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of moods a board can be built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Romantic,
    Peaceful,
    Energetic,
    Melancholic,
    Nature,
    Urban,
    Vintage,
    Modern,
}

impl MoodLabel {
    /// Declaration order. Heuristic ties resolve to the earliest entry.
    pub const ALL: [MoodLabel; 8] = [
        MoodLabel::Romantic,
        MoodLabel::Peaceful,
        MoodLabel::Energetic,
        MoodLabel::Melancholic,
        MoodLabel::Nature,
        MoodLabel::Urban,
        MoodLabel::Vintage,
        MoodLabel::Modern,
    ];

    /// Label used whenever nothing better is known.
    pub const FALLBACK: MoodLabel = MoodLabel::Modern;

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Romantic => "romantic",
            MoodLabel::Peaceful => "peaceful",
            MoodLabel::Energetic => "energetic",
            MoodLabel::Melancholic => "melancholic",
            MoodLabel::Nature => "nature",
            MoodLabel::Urban => "urban",
            MoodLabel::Vintage => "vintage",
            MoodLabel::Modern => "modern",
        }
    }

    /// Case-insensitive lookup, surrounding whitespace ignored.
    pub fn from_label(label: &str) -> Option<MoodLabel> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(label))
    }

    /// Like [`MoodLabel::from_label`] but clamps unknown values to [`MoodLabel::FALLBACK`].
    pub fn from_label_or_fallback(label: &str) -> MoodLabel {
        Self::from_label(label).unwrap_or(Self::FALLBACK)
    }
}

impl Default for MoodLabel {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a [`MoodResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Ai,
    Heuristic,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Ai => "ai",
            AnalysisSource::Heuristic => "heuristic",
        }
    }
}

/// Outcome of classifying one description. Built once per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodResult {
    pub mood: MoodLabel,
    pub keywords: Vec<String>,
    pub inspiration_text: String,
    #[serde(rename = "color_palette")]
    pub source_palette_key: String,
    #[serde(rename = "analysis_source")]
    pub source: AnalysisSource,
}
