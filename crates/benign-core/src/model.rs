use serde::{Deserialize, Serialize};
use std::fmt;

/// Humor category a joke is generated for, ordered by embodiment requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Linguistic,
    Physical,
    Social,
    Dark,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Linguistic,
        Category::Physical,
        Category::Social,
        Category::Dark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Linguistic => "linguistic",
            Category::Physical => "physical",
            Category::Social => "social",
            Category::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linguistic" => Some(Category::Linguistic),
            "physical" => Some(Category::Physical),
            "social" => Some(Category::Social),
            "dark" => Some(Category::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Openai,
    Anthropic,
    Google,
    /// Deterministic offline provider (tests, dry runs).
    Fake,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Openai => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::Fake => "fake",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            Provider::Openai => Some("OPENAI_API_KEY"),
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::Google => Some("GOOGLE_API_KEY"),
            Provider::Fake => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Short id used in joke ids and on the command line (e.g. `gpt4o`).
    pub key: String,
    /// Vendor model identifier.
    pub name: String,
    pub provider: Provider,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

fn default_max_tokens() -> u32 {
    150
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JokeStatus {
    Parsed,
    ParseFailed,
    GenerationFailed,
}

impl JokeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JokeStatus::Parsed => "parsed",
            JokeStatus::ParseFailed => "parse_failed",
            JokeStatus::GenerationFailed => "generation_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCounts {
    pub setup: usize,
    pub punchline: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub attempts: u32,
}

/// 1-7 human ratings attached by the rating stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualRatings {
    pub funniness: Option<u8>,
    pub category_fit: Option<u8>,
    pub structural_coherence: Option<u8>,
    pub originality: Option<u8>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_at: Option<String>,
}

impl ManualRatings {
    pub fn is_rated(&self) -> bool {
        self.funniness.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JokeRecord {
    pub id: String,
    pub timestamp: String,
    pub model: String,
    pub model_name: String,
    pub category: Category,
    pub temperature: f32,
    pub prompt_index: usize,
    pub prompt: String,
    #[serde(default)]
    pub raw_response: Option<String>,
    #[serde(default)]
    pub setup: String,
    #[serde(default)]
    pub punchline: String,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub word_counts: Option<WordCounts>,
    pub status: JokeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    #[serde(default)]
    pub api: ApiInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_ratings: Option<ManualRatings>,
}

impl JokeRecord {
    /// The vendor returned non-blank text (parsed or not).
    pub fn succeeded(&self) -> bool {
        self.status != JokeStatus::GenerationFailed
    }

    pub fn is_parsed(&self) -> bool {
        self.status == JokeStatus::Parsed && !self.setup.is_empty() && !self.punchline.is_empty()
    }

    pub fn is_rated(&self) -> bool {
        self.manual_ratings.as_ref().is_some_and(|r| r.is_rated())
    }
}

/// Generation id: `{model}_{category}_t{temperature}_{index}`.
pub fn joke_id(model: &str, category: Category, temperature: f32, index: usize) -> String {
    format!("{}_{}_t{}_{}", model, category, temperature, index)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCodes {
    pub has_semantic: bool,
    pub has_embodied: bool,
    pub has_social: bool,
    pub has_threat: bool,
    pub semantic_count: u32,
    pub embodied_count: u32,
    pub social_count: u32,
    pub threat_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRecord {
    pub joke_id: String,
    pub explaining_model: String,
    #[serde(default)]
    pub explanation: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    pub joke_category: Category,
    pub joke_generator_model: String,
    pub joke_temperature: f32,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<FeatureCodes>,
}

/// Flat row of the explanation analysis table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedExplanation {
    pub joke_id: String,
    pub joke_category: Category,
    pub joke_generator: String,
    pub explaining_model: String,
    pub has_semantic: bool,
    pub has_embodied: bool,
    pub has_social: bool,
    pub has_threat: bool,
    pub semantic_count: u32,
    pub embodied_count: u32,
    pub social_count: u32,
    pub threat_count: u32,
}

impl CodedExplanation {
    pub fn new(rec: &ExplanationRecord, codes: FeatureCodes) -> Self {
        Self {
            joke_id: rec.joke_id.clone(),
            joke_category: rec.joke_category,
            joke_generator: rec.joke_generator_model.clone(),
            explaining_model: rec.explaining_model.clone(),
            has_semantic: codes.has_semantic,
            has_embodied: codes.has_embodied,
            has_social: codes.has_social,
            has_threat: codes.has_threat,
            semantic_count: codes.semantic_count,
            embodied_count: codes.embodied_count,
            social_count: codes.social_count,
            threat_count: codes.threat_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralRecord {
    pub id: String,
    pub model: String,
    pub category: Category,
    pub temperature: f32,
    pub has_setup: bool,
    pub has_punchline: bool,
    pub structure_valid: bool,
    pub setup_words: usize,
    pub punchline_words: usize,
    pub total_words: usize,
    pub within_target_length: bool,
    pub setup_punchline_ratio: Option<f64>,
    pub has_question: bool,
    pub has_exclamation: bool,
    pub has_period: bool,
    pub explicit_format_markers: bool,
    pub sentence_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurpriseRecord {
    pub id: String,
    pub model: String,
    pub category: Category,
    pub temperature: f32,
    pub setup: String,
    pub punchline: String,
    pub predicted_punchline: Option<String>,
    pub punchline_overlap_with_setup: Option<f64>,
    pub prediction_accuracy: Option<f64>,
    pub surprise_score: Option<f64>,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_lowercase() {
        let s = serde_json::to_string(&Category::Dark).unwrap();
        assert_eq!(s, "\"dark\"");
        let c: Category = serde_yaml::from_str("physical").unwrap();
        assert_eq!(c, Category::Physical);
        assert_eq!(Category::parse(" Social "), Some(Category::Social));
        assert_eq!(Category::parse("slapstick"), None);
    }

    #[test]
    fn joke_id_format() {
        assert_eq!(
            joke_id("gpt4o", Category::Linguistic, 0.7, 3),
            "gpt4o_linguistic_t0.7_3"
        );
    }

    #[test]
    fn provider_key_vars() {
        assert_eq!(Provider::Openai.api_key_var(), Some("OPENAI_API_KEY"));
        assert_eq!(Provider::Fake.api_key_var(), None);
        let p: Provider = serde_yaml::from_str("google").unwrap();
        assert_eq!(p, Provider::Google);
    }
}
