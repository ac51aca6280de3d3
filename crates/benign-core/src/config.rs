use crate::errors::ConfigError;
use crate::model::{Category, ModelSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub mod credentials;
pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default, rename = "configVersion", alias = "version")]
    pub version: u32,
    pub name: String,
    pub models: Vec<ModelSpec>,
    #[serde(default)]
    pub study: StudySettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub settings: Settings,
}

impl StudyConfig {
    pub fn model(&self, key: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.key == key)
    }

    /// Models that take part in generation, in config order.
    pub fn generation_models(&self) -> Vec<&ModelSpec> {
        select_models(&self.models, &self.study.models)
    }

    pub fn explanation_models(&self) -> Vec<&ModelSpec> {
        select_models(&self.models, &self.analysis.explanation_models)
    }

    pub fn planned_generations(&self) -> usize {
        let per_category = match self.study.prompts {
            PromptMode::Novel => self
                .study
                .n_per_category
                .min(crate::prompts::NOVEL_CONTEXT_COUNT),
            PromptMode::Extended => self.study.n_per_category,
        };
        self.generation_models().len()
            * self.study.categories.len()
            * self.study.temperatures.len()
            * per_category
    }
}

fn select_models<'a>(all: &'a [ModelSpec], keys: &[String]) -> Vec<&'a ModelSpec> {
    if keys.is_empty() {
        return all.iter().collect();
    }
    keys.iter()
        .filter_map(|k| all.iter().find(|m| &m.key == k))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// First `n` fixed novel contexts per category.
    #[default]
    Novel,
    /// `n` prompts cycling through the novel contexts.
    Extended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySettings {
    /// Model keys used for generation. Empty means every configured model.
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default = "default_temperatures")]
    pub temperatures: Vec<f32>,
    #[serde(default = "default_n_per_category")]
    pub n_per_category: usize,
    #[serde(default)]
    pub prompts: PromptMode,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            models: vec![],
            categories: default_categories(),
            temperatures: default_temperatures(),
            n_per_category: default_n_per_category(),
            prompts: PromptMode::default(),
        }
    }
}

fn default_categories() -> Vec<Category> {
    Category::ALL.to_vec()
}

fn default_temperatures() -> Vec<f32> {
    vec![0.5, 0.7, 0.9]
}

fn default_n_per_category() -> usize {
    5
}

/// Inclusive word-count bounds for the target-length check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self { min: 15, max: 50 }
    }
}

impl LengthBounds {
    pub fn contains(&self, words: usize) -> bool {
        (self.min..=self.max).contains(&words)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default)]
    pub length_bounds: LengthBounds,
    #[serde(default = "default_surprise_model")]
    pub surprise_model: String,
    #[serde(default = "default_surprise_temperature")]
    pub surprise_temperature: f32,
    #[serde(default = "default_surprise_sample_size")]
    pub surprise_sample_size: usize,
    /// Empty means every configured model.
    #[serde(default)]
    pub explanation_models: Vec<String>,
    #[serde(default = "default_explanation_temperature")]
    pub explanation_temperature: f32,
    #[serde(default = "default_explanation_sample_size")]
    pub explanation_sample_size: Option<usize>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            length_bounds: LengthBounds::default(),
            surprise_model: default_surprise_model(),
            surprise_temperature: default_surprise_temperature(),
            surprise_sample_size: default_surprise_sample_size(),
            explanation_models: vec![],
            explanation_temperature: default_explanation_temperature(),
            explanation_sample_size: default_explanation_sample_size(),
        }
    }
}

fn default_surprise_model() -> String {
    "gpt4o".to_string()
}

fn default_surprise_temperature() -> f32 {
    0.7
}

fn default_surprise_sample_size() -> usize {
    30
}

fn default_explanation_temperature() -> f32 {
    0.3
}

fn default_explanation_sample_size() -> Option<usize> {
    Some(40)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Immediate reattempts of a failed vendor call.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_db")]
    pub db: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            timeout_seconds: None,
            output_dir: default_output_dir(),
            db: default_db(),
        }
    }
}

fn default_retries() -> u32 {
    1
}

fn default_output_dir() -> String {
    "out".to_string()
}

fn default_db() -> String {
    "out/benign.db".to_string()
}

pub fn load_config(path: &Path, strict: bool) -> Result<StudyConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    let mut cfg = parse_config(&raw, strict)
        .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))?;
    normalize_paths(&mut cfg, path);
    Ok(cfg)
}

/// Parse and validate a config document without touching paths.
pub fn parse_config(raw: &str, strict: bool) -> Result<StudyConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let cfg: StudyConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();

    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "unknown fields detected in strict mode: {:?}",
                meaningful_unknowns
            )));
        }
        tracing::warn!(
            event = "config.unknown_fields",
            fields = ?meaningful_unknowns,
            "ignored unknown config fields"
        );
    }

    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &StudyConfig) -> Result<(), ConfigError> {
    if cfg.version != 0 && cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: 0, {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    if cfg.models.is_empty() {
        return Err(ConfigError("config has no models".into()));
    }

    let mut seen = HashSet::new();
    for m in &cfg.models {
        if m.key.trim().is_empty() {
            return Err(ConfigError("model with empty key".into()));
        }
        if !seen.insert(m.key.as_str()) {
            return Err(ConfigError(format!("duplicate model key '{}'", m.key)));
        }
        if m.max_tokens == 0 {
            return Err(ConfigError(format!("model '{}' has max_tokens 0", m.key)));
        }
    }

    let known = |key: &str, field: &str| -> Result<(), ConfigError> {
        if cfg.model(key).is_none() {
            return Err(ConfigError(format!(
                "{} references unknown model '{}'",
                field, key
            )));
        }
        Ok(())
    };
    for k in &cfg.study.models {
        known(k, "study.models")?;
    }
    for k in &cfg.analysis.explanation_models {
        known(k, "analysis.explanation_models")?;
    }
    known(&cfg.analysis.surprise_model, "analysis.surprise_model")?;

    if cfg.study.categories.is_empty() {
        return Err(ConfigError("study.categories is empty".into()));
    }
    if cfg.study.temperatures.is_empty() {
        return Err(ConfigError("study.temperatures is empty".into()));
    }

    // Generation ids embed model key, category and rendered temperature.
    reject_duplicates("study.models", cfg.study.models.iter().cloned())?;
    reject_duplicates(
        "analysis.explanation_models",
        cfg.analysis.explanation_models.iter().cloned(),
    )?;
    reject_duplicates(
        "study.categories",
        cfg.study.categories.iter().map(|c| c.to_string()),
    )?;
    reject_duplicates(
        "study.temperatures",
        cfg.study.temperatures.iter().map(|t| t.to_string()),
    )?;
    let temps = cfg
        .study
        .temperatures
        .iter()
        .chain([
            &cfg.analysis.surprise_temperature,
            &cfg.analysis.explanation_temperature,
        ]);
    for t in temps {
        if !(0.0..=2.0).contains(t) {
            return Err(ConfigError(format!(
                "temperature {} out of range (0.0-2.0)",
                t
            )));
        }
    }

    let b = cfg.analysis.length_bounds;
    if b.min > b.max {
        return Err(ConfigError(format!(
            "analysis.length_bounds min ({}) exceeds max ({})",
            b.min, b.max
        )));
    }

    Ok(())
}

fn reject_duplicates(
    field: &str,
    values: impl IntoIterator<Item = String>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for v in values {
        if !seen.insert(v.clone()) {
            return Err(ConfigError(format!("{} lists '{}' more than once", field, v)));
        }
    }
    Ok(())
}

fn normalize_paths(cfg: &mut StudyConfig, config_path: &Path) {
    let r = path_resolver::PathResolver::new(config_path);
    r.resolve_str(&mut cfg.settings.output_dir);
    if cfg.settings.db != ":memory:" {
        r.resolve_str(&mut cfg.settings.db);
    }
}

pub const SAMPLE_CONFIG: &str = r#"configVersion: 1
name: benign-violations-pilot
models:
  - key: gpt4o
    name: gpt-4o
    provider: openai
    max_tokens: 150
    description: GPT-4o (October 2024)
  - key: claude
    name: claude-3-5-sonnet-20241022
    provider: anthropic
    max_tokens: 150
    description: Claude 3.5 Sonnet
  - key: gemini
    name: gemini-2.0-flash-exp
    provider: google
    max_tokens: 150
    description: Gemini 2.0 Flash
study:
  categories: [linguistic, physical, social, dark]
  temperatures: [0.5, 0.7, 0.9]
  n_per_category: 5
  prompts: novel
analysis:
  length_bounds: { min: 15, max: 50 }
  surprise_model: gpt4o
  surprise_temperature: 0.7
  surprise_sample_size: 30
  explanation_temperature: 0.3
  explanation_sample_size: 40
settings:
  retries: 1
  output_dir: out
  db: out/benign.db
"#;

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
configVersion: 1
name: t
models:
  - key: fake
    name: fake-model
    provider: fake
"#;

    #[test]
    fn sample_config_parses() {
        let cfg = parse_config(SAMPLE_CONFIG, true).unwrap();
        assert_eq!(cfg.models.len(), 3);
        assert_eq!(cfg.planned_generations(), 3 * 4 * 3 * 5);
        assert_eq!(cfg.analysis.length_bounds, LengthBounds { min: 15, max: 50 });
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = parse_config(
            &format!("{}analysis:\n  surprise_model: fake\n", MINIMAL),
            true,
        )
        .unwrap();
        assert_eq!(cfg.study.categories, Category::ALL.to_vec());
        assert_eq!(cfg.study.temperatures, vec![0.5, 0.7, 0.9]);
        assert_eq!(cfg.settings.retries, 1);
        assert_eq!(cfg.models[0].max_tokens, 150);
        assert_eq!(cfg.analysis.explanation_temperature, 0.3);
    }

    #[test]
    fn unknown_surprise_model_is_rejected() {
        // default surprise model is gpt4o, which MINIMAL does not define
        let err = parse_config(MINIMAL, false).unwrap_err();
        assert!(err.0.contains("analysis.surprise_model"));
    }

    #[test]
    fn strict_mode_rejects_unknown_fields() {
        let raw = format!(
            "{}analysis:\n  surprise_model: fake\npolicies: []\n",
            MINIMAL
        );
        let err = parse_config(&raw, true).unwrap_err();
        assert!(err.0.contains("unknown fields"));
        assert!(parse_config(&raw, false).is_ok());
    }

    #[test]
    fn rejects_duplicate_keys_and_bad_bounds() {
        let dup = r#"
name: t
models:
  - { key: a, name: x, provider: fake }
  - { key: a, name: y, provider: fake }
analysis: { surprise_model: a }
"#;
        assert!(parse_config(dup, true).unwrap_err().0.contains("duplicate"));

        let bounds = r#"
name: t
models:
  - { key: a, name: x, provider: fake }
analysis:
  surprise_model: a
  length_bounds: { min: 60, max: 10 }
"#;
        assert!(parse_config(bounds, true)
            .unwrap_err()
            .0
            .contains("length_bounds"));
    }

    #[test]
    fn rejects_duplicate_study_entries() {
        let with_study = |study: &str| {
            format!(
                "name: t\nmodels:\n  - {{ key: a, name: x, provider: fake }}\n  - {{ key: b, name: y, provider: fake }}\nstudy: {}\nanalysis: {{ surprise_model: a }}\n",
                study
            )
        };

        let err = parse_config(&with_study("{ categories: [dark, dark] }"), true).unwrap_err();
        assert!(err.0.contains("study.categories lists 'dark'"));

        // 0.70 renders as 0.7 in generation ids
        let err = parse_config(&with_study("{ temperatures: [0.7, 0.70] }"), true).unwrap_err();
        assert!(err.0.contains("study.temperatures lists '0.7'"));

        let err = parse_config(&with_study("{ models: [a, b, a] }"), true).unwrap_err();
        assert!(err.0.contains("study.models lists 'a'"));

        let cfg = parse_config(
            &with_study("{ models: [a, b], categories: [dark, social], temperatures: [0.5, 0.7] }"),
            true,
        )
        .unwrap();
        let ids: HashSet<_> = crate::engine::plan_generation(&cfg)
            .iter()
            .map(|t| t.id())
            .collect();
        assert_eq!(ids.len(), cfg.planned_generations());
    }

    #[test]
    fn novel_mode_caps_prompts_per_category() {
        let raw = r#"
name: t
models:
  - { key: a, name: x, provider: fake }
study:
  temperatures: [0.7]
  n_per_category: 75
analysis: { surprise_model: a }
"#;
        let mut cfg = parse_config(raw, true).unwrap();
        assert_eq!(cfg.planned_generations(), 4 * 5);
        cfg.study.prompts = PromptMode::Extended;
        assert_eq!(cfg.planned_generations(), 4 * 75);
    }

    #[test]
    fn bounds_are_inclusive() {
        let b = LengthBounds { min: 10, max: 60 };
        assert!(b.contains(10));
        assert!(b.contains(60));
        assert!(!b.contains(9));
        assert!(!b.contains(61));
    }
}
