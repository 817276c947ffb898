//! Local keyword-scoring classifier, used whenever the external one is not.

use super::{AnalysisSource, MoodLabel, MoodResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\b\w+\b").expect("static regex");
}

/// Tokens that never make it into the keyword list.
const STOP_WORDS: &[&str] = &[
    "the", "and", "with", "for", "like", "feel", "want", "wanting",
];

const MAX_KEYWORDS: usize = 3;
const MIN_KEYWORD_CHARS: usize = 4;

const DEFAULT_KEYWORDS: [&str; 3] = ["inspiration", "creative", "design"];

fn mood_keywords(mood: MoodLabel) -> &'static [&'static str] {
    match mood {
        MoodLabel::Romantic => &[
            "romantic", "love", "heart", "flower", "candle", "wine", "passion", "romance",
        ],
        MoodLabel::Peaceful => &[
            "peaceful",
            "calm",
            "serene",
            "meditation",
            "yoga",
            "tranquil",
            "quiet",
        ],
        // "energetic" is listed twice, so it scores double.
        MoodLabel::Energetic => &[
            "energetic",
            "dynamic",
            "vibrant",
            "active",
            "sport",
            "energetic",
            "lively",
        ],
        MoodLabel::Melancholic => &[
            "melancholic",
            "sad",
            "nostalgic",
            "melancholy",
            "sorrow",
            "blue",
        ],
        MoodLabel::Nature => &[
            "nature", "forest", "sea", "mountain", "flower", "tree", "outdoor", "natural",
        ],
        MoodLabel::Urban => &[
            "urban",
            "city",
            "modern",
            "building",
            "street",
            "metropolitan",
            "downtown",
        ],
        MoodLabel::Vintage => &[
            "vintage",
            "retro",
            "old",
            "classic",
            "nostalgic",
            "antique",
            "traditional",
        ],
        MoodLabel::Modern => &[
            "modern",
            "minimalist",
            "clean",
            "simple",
            "contemporary",
            "sleek",
        ],
    }
}

/// Fixed inspirational sentence for each mood.
pub fn inspiration_for(mood: MoodLabel) -> &'static str {
    match mood {
        MoodLabel::Romantic => {
            "The dance of love and passion, in harmony with your heart's rhythm"
        }
        MoodLabel::Peaceful => "The silent call of tranquility, soothing your soul",
        MoodLabel::Energetic => "The excitement of energy, reflecting life's dynamic flow",
        MoodLabel::Melancholic => {
            "In the depths of melancholy lies the hidden treasure of beauty"
        }
        MoodLabel::Nature => "The pure beauty of nature, renewing your spirit",
        MoodLabel::Urban => "The modern rhythm of the city, carrying life's dynamic energy",
        MoodLabel::Vintage => "The elegance of the past meets today's creativity",
        MoodLabel::Modern => {
            "The minimal elegance of modernity, exploring the boundaries of creativity"
        }
    }
}

/// Counts substring hits of each mood's keyword list in the lower-cased text.
///
/// The highest score wins, ties go to the label declared first and a text
/// without any hit is [`MoodLabel::FALLBACK`].
pub fn detect_mood(description: &str) -> MoodLabel {
    let lowered = description.to_lowercase();

    let mut detected = MoodLabel::FALLBACK;
    let mut best_score = 0;
    for mood in MoodLabel::ALL {
        let score = mood_keywords(mood)
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .count();
        if score > best_score {
            best_score = score;
            detected = mood;
        }
    }
    detected
}

/// First three meaningful words of the description, in order.
pub fn extract_keywords(description: &str) -> Vec<String> {
    let lowered = description.to_lowercase();

    let keywords: Vec<String> = WORD
        .find_iter(&lowered)
        .map(|token| token.as_str())
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect();

    if keywords.is_empty() {
        DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
    } else {
        keywords
    }
}

/// Complete heuristic analysis. Pure: equal inputs give equal results.
pub fn analyze_heuristically(description: &str) -> MoodResult {
    let mood = detect_mood(description);
    MoodResult {
        mood,
        keywords: extract_keywords(description),
        inspiration_text: inspiration_for(mood).to_string(),
        source_palette_key: mood.as_str().to_string(),
        source: AnalysisSource::Heuristic,
    }
}
