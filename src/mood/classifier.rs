//! External mood classification with heuristic fallback.
//!
//! [`MoodClassifier::classify`] never fails. Transport problems, non-success
//! statuses and unparsable completions all degrade to
//! [`analyze_heuristically`], and fields the model leaves out are filled
//! from the heuristic result field by field.

use super::heuristic::analyze_heuristically;
use super::{AnalysisSource, MoodLabel, MoodResult};
use crate::llm::{GenerateOptions, LlmError, LlmProvider};
use crate::server::metrics;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Bound on the external call.
pub const CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_KEYWORDS: usize = 3;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("No classifier configured")]
    NotConfigured,

    #[error("Classifier unavailable: {0}")]
    Unavailable(#[from] LlmError),

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),
}

impl ClassifierError {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierError::NotConfigured => "not_configured",
            ClassifierError::Unavailable(e) => e.kind(),
            ClassifierError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// Fields recovered from the model output. Any of them may be missing.
#[derive(Debug, Default, Clone, PartialEq)]
struct PartialMoodAnalysis {
    mood: Option<String>,
    keywords: Option<Vec<String>>,
    inspiration_text: Option<String>,
    color_palette: Option<String>,
}

impl PartialMoodAnalysis {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            mood: non_blank_string(object.get("mood")),
            keywords: object.get("keywords").and_then(keyword_list),
            inspiration_text: non_blank_string(object.get("inspiration_text")),
            color_palette: non_blank_string(object.get("color_palette")),
        }
    }

    /// Fill the gaps from the heuristic analysis of the same description,
    /// field by field.
    ///
    /// A mood the model did provide but that is not one of the known labels
    /// is clamped to [`MoodLabel::FALLBACK`].
    fn merge_with(self, heuristic: MoodResult) -> MoodResult {
        let mood = match &self.mood {
            Some(label) => MoodLabel::from_label_or_fallback(label),
            None => heuristic.mood,
        };

        let keywords = self.keywords.unwrap_or(heuristic.keywords);

        let inspiration_text = self.inspiration_text.unwrap_or(heuristic.inspiration_text);

        let source_palette_key = match self.color_palette.as_deref().and_then(MoodLabel::from_label)
        {
            Some(label) => label.as_str().to_string(),
            None => heuristic.source_palette_key,
        };

        MoodResult {
            mood,
            keywords,
            inspiration_text,
            source_palette_key,
            source: AnalysisSource::Ai,
        }
    }
}

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Accepts a JSON array of strings or a single comma separated string.
fn keyword_list(value: &Value) -> Option<Vec<String>> {
    let keywords: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(MAX_KEYWORDS)
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(MAX_KEYWORDS)
            .collect(),
        _ => return None,
    };
    if keywords.is_empty() {
        None
    } else {
        Some(keywords)
    }
}

/// Cut the text from the first `{` to the last `}` and parse it as an object.
///
/// Models tend to wrap the JSON in prose or code fences.
fn extract_json_object(text: &str) -> Result<Map<String, Value>, ClassifierError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(ClassifierError::MalformedResponse(
                "no JSON object found in response".to_string(),
            ))
        }
    };

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ClassifierError::MalformedResponse(
            "response JSON is not an object".to_string(),
        )),
        Err(e) => Err(ClassifierError::MalformedResponse(e.to_string())),
    }
}

fn build_prompt(description: &str) -> String {
    let labels: Vec<&str> = MoodLabel::ALL.iter().map(|m| m.as_str()).collect();
    format!(
        r#"You are a mood analysis expert. Analyze this description: "{description}"

Determine:
1. Main emotion/mood ({labels})
2. Color palette suggestion
3. Keywords for visual search
4. Inspiring sentence

Return only a JSON object:
{{
    "mood": "romantic",
    "keywords": ["keyword1", "keyword2", "keyword3"],
    "inspiration_text": "Inspiring sentence",
    "color_palette": "romantic"
}}"#,
        labels = labels.join("/"),
    )
}

pub struct MoodClassifier {
    provider: Option<Arc<dyn LlmProvider>>,
    options: GenerateOptions,
}

impl MoodClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            options: GenerateOptions { timeout },
        }
    }

    /// A classifier that always answers with the heuristic.
    pub fn heuristic_only() -> Self {
        Self {
            provider: None,
            options: GenerateOptions::default(),
        }
    }

    pub async fn classify(&self, description: &str) -> MoodResult {
        let heuristic = analyze_heuristically(description);

        match self.classify_externally(description).await {
            Ok(partial) => {
                let result = partial.merge_with(heuristic);
                debug!(mood = %result.mood, "Mood classified by external model");
                metrics::record_classification(AnalysisSource::Ai, None);
                result
            }
            Err(ClassifierError::NotConfigured) => {
                metrics::record_classification(AnalysisSource::Heuristic, Some("not_configured"));
                heuristic
            }
            Err(err) => {
                warn!(error = %err, "Mood classifier failed, using keyword heuristic");
                metrics::record_classification(AnalysisSource::Heuristic, Some(err.kind()));
                heuristic
            }
        }
    }

    async fn classify_externally(
        &self,
        description: &str,
    ) -> Result<PartialMoodAnalysis, ClassifierError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(ClassifierError::NotConfigured)?;

        let raw = provider
            .generate(&build_prompt(description), &self.options)
            .await?;
        let object = extract_json_object(&raw)?;
        Ok(PartialMoodAnalysis::from_object(&object))
    }
}
