//! Descriptive summaries over joke, structural, surprise and explanation records.

use crate::model::{Category, CodedExplanation, JokeRecord, StructuralRecord, SurpriseRecord};
use crate::stats::{mean, pearson, proportion, summarize, Aggregator, Summary};
use serde::Serialize;
use std::collections::BTreeMap;

/// Below this share of embodied citations on physical jokes, H3 is supported.
pub const PHYSICAL_EMBODIED_THRESHOLD: f64 = 0.5;
/// Above this share of semantic citations on linguistic jokes, H3 is supported.
pub const LINGUISTIC_SEMANTIC_THRESHOLD: f64 = 0.7;

pub const PREDICTED_RANKING: [Category; 4] = [
    Category::Linguistic,
    Category::Social,
    Category::Physical,
    Category::Dark,
];

/// Temperatures group on two decimals.
fn temp_key(t: f32) -> i64 {
    (t as f64 * 100.0).round() as i64
}

fn temp_from_key(k: i64) -> f64 {
    k as f64 / 100.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CountRate {
    pub success: usize,
    pub total: usize,
}

impl CountRate {
    fn add(&mut self, ok: bool) {
        self.total += 1;
        if ok {
            self.success += 1;
        }
    }

    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.success as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionRow {
    pub model: String,
    pub category: Category,
    pub temperature: f64,
    pub generated: CountRate,
    pub parsed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub attempts: usize,
    pub successes: usize,
    pub failures: usize,
    pub parsed: usize,
    pub parse_failures: usize,
    pub words: Option<Summary>,
    pub mean_latency_ms: Option<f64>,
    pub total_tokens: u64,
    pub mean_tokens: Option<f64>,
    pub errors: Vec<String>,
    pub by_model: Vec<(String, CountRate)>,
    pub by_category: Vec<(Category, CountRate)>,
    pub by_temperature: Vec<(f64, CountRate)>,
    pub conditions: Vec<ConditionRow>,
    /// First successful joke per category.
    pub examples: Vec<(Category, String)>,
}

pub fn summarize_generation(jokes: &[JokeRecord]) -> GenerationSummary {
    let successes = jokes.iter().filter(|j| j.succeeded()).count();
    let parsed = jokes.iter().filter(|j| j.is_parsed()).count();

    let words: Vec<f64> = jokes
        .iter()
        .filter_map(|j| j.word_counts.map(|w| w.total as f64))
        .collect();
    let latencies: Vec<f64> = jokes
        .iter()
        .filter(|j| j.succeeded())
        .filter_map(|j| j.api.latency_ms.map(|l| l as f64))
        .collect();
    let tokens: Vec<u64> = jokes.iter().filter_map(|j| j.api.tokens).collect();

    let errors = jokes
        .iter()
        .filter_map(|j| {
            j.api
                .error
                .as_ref()
                .filter(|_| !j.succeeded())
                .map(|e| format!("{}: {}", j.id, e))
        })
        .take(5)
        .collect();

    let mut by_model: BTreeMap<String, CountRate> = BTreeMap::new();
    let mut by_category: BTreeMap<Category, CountRate> = BTreeMap::new();
    let mut by_temperature: BTreeMap<i64, CountRate> = BTreeMap::new();
    let mut conditions: BTreeMap<(String, Category, i64), (CountRate, usize)> = BTreeMap::new();
    for j in jokes {
        let ok = j.succeeded();
        by_model.entry(j.model.clone()).or_default().add(ok);
        by_category.entry(j.category).or_default().add(ok);
        by_temperature.entry(temp_key(j.temperature)).or_default().add(ok);
        let c = conditions
            .entry((j.model.clone(), j.category, temp_key(j.temperature)))
            .or_default();
        c.0.add(ok);
        if j.is_parsed() {
            c.1 += 1;
        }
    }

    let examples = Category::ALL
        .iter()
        .filter_map(|cat| {
            jokes
                .iter()
                .find(|j| j.category == *cat && j.succeeded())
                .map(|j| (*cat, j.full_text.clone()))
        })
        .collect();

    GenerationSummary {
        attempts: jokes.len(),
        successes,
        failures: jokes.len() - successes,
        parsed,
        parse_failures: successes.saturating_sub(parsed),
        words: summarize(&words),
        mean_latency_ms: mean(&latencies),
        total_tokens: tokens.iter().sum(),
        mean_tokens: if tokens.is_empty() {
            None
        } else {
            Some(tokens.iter().sum::<u64>() as f64 / tokens.len() as f64)
        },
        errors,
        by_model: by_model.into_iter().collect(),
        by_category: by_category.into_iter().collect(),
        by_temperature: by_temperature
            .into_iter()
            .map(|(k, v)| (temp_from_key(k), v))
            .collect(),
        conditions: conditions
            .into_iter()
            .map(|((model, category, t), (generated, parsed))| ConditionRow {
                model,
                category,
                temperature: temp_from_key(t),
                generated,
                parsed,
            })
            .collect(),
        examples,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StructuralGroup {
    pub key: String,
    pub n: usize,
    pub structure_valid: f64,
    pub within_target_length: f64,
    pub mean_total_words: f64,
    pub has_question: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructuralSummary {
    pub n: usize,
    pub valid: usize,
    pub within_length: usize,
    pub questions: usize,
    pub total_words: Option<Summary>,
    pub by_model: Vec<StructuralGroup>,
    pub by_category: Vec<StructuralGroup>,
}

fn structural_groups<K: Ord + Clone + ToString>(
    rows: &[StructuralRecord],
    key: impl Fn(&StructuralRecord) -> K,
) -> Vec<StructuralGroup> {
    let mut groups: BTreeMap<K, Vec<&StructuralRecord>> = BTreeMap::new();
    for r in rows {
        groups.entry(key(r)).or_default().push(r);
    }
    groups
        .into_iter()
        .map(|(k, rs)| {
            let flags = |f: fn(&StructuralRecord) -> bool| {
                proportion(&rs.iter().map(|r| f(r)).collect::<Vec<_>>()).unwrap_or(0.0)
            };
            StructuralGroup {
                key: k.to_string(),
                n: rs.len(),
                structure_valid: flags(|r| r.structure_valid),
                within_target_length: flags(|r| r.within_target_length),
                mean_total_words: mean(&rs.iter().map(|r| r.total_words as f64).collect::<Vec<_>>())
                    .unwrap_or(0.0),
                has_question: flags(|r| r.has_question),
            }
        })
        .collect()
}

pub fn summarize_structure(rows: &[StructuralRecord]) -> StructuralSummary {
    let words: Vec<f64> = rows.iter().map(|r| r.total_words as f64).collect();
    StructuralSummary {
        n: rows.len(),
        valid: rows.iter().filter(|r| r.structure_valid).count(),
        within_length: rows.iter().filter(|r| r.within_target_length).count(),
        questions: rows.iter().filter(|r| r.has_question).count(),
        total_words: summarize(&words),
        by_model: structural_groups(rows, |r| r.model.clone()),
        by_category: structural_groups(rows, |r| r.category),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SurpriseSummary {
    pub n: usize,
    pub successes: usize,
    pub surprise: Option<Summary>,
    pub mean_punchline_setup_overlap: Option<f64>,
    pub by_category: Vec<(Category, Summary)>,
    pub by_model: Vec<(String, Summary)>,
}

pub fn summarize_surprise(rows: &[SurpriseRecord]) -> SurpriseSummary {
    let ok: Vec<&SurpriseRecord> = rows.iter().filter(|r| r.success).collect();
    let scores: Vec<f64> = ok.iter().filter_map(|r| r.surprise_score).collect();
    let overlaps: Vec<f64> = ok
        .iter()
        .filter_map(|r| r.punchline_overlap_with_setup)
        .collect();

    let mut by_cat = Aggregator::new();
    let mut by_model = Aggregator::new();
    for r in &ok {
        if let Some(s) = r.surprise_score {
            by_cat.push(r.category, s);
            by_model.push(r.model.clone(), s);
        }
    }

    SurpriseSummary {
        n: rows.len(),
        successes: ok.len(),
        surprise: summarize(&scores),
        mean_punchline_setup_overlap: mean(&overlaps),
        by_category: by_cat.finish(),
        by_model: by_model.finish(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Semantic,
    Embodied,
    Social,
    Threat,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Semantic => "semantic",
            Feature::Embodied => "embodied",
            Feature::Social => "social",
            Feature::Threat => "threat",
        }
    }

    /// The feature a correct explanation of this category should cite.
    pub fn relevant_to(cat: Category) -> Self {
        match cat {
            Category::Linguistic => Feature::Semantic,
            Category::Physical => Feature::Embodied,
            Category::Social => Feature::Social,
            Category::Dark => Feature::Threat,
        }
    }

    fn flag(&self, r: &CodedExplanation) -> bool {
        match self {
            Feature::Semantic => r.has_semantic,
            Feature::Embodied => r.has_embodied,
            Feature::Social => r.has_social,
            Feature::Threat => r.has_threat,
        }
    }

    fn count(&self, r: &CodedExplanation) -> u32 {
        match self {
            Feature::Semantic => r.semantic_count,
            Feature::Embodied => r.embodied_count,
            Feature::Social => r.social_count,
            Feature::Threat => r.threat_count,
        }
    }

    pub const ALL: [Feature; 4] = [
        Feature::Semantic,
        Feature::Embodied,
        Feature::Social,
        Feature::Threat,
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureRates {
    pub key: String,
    pub n: usize,
    /// Share citing each feature, in `Feature::ALL` order.
    pub cited: [f64; 4],
    pub mean_counts: [f64; 4],
}

fn feature_rates(key: String, rows: &[&CodedExplanation]) -> FeatureRates {
    let mut cited = [0.0; 4];
    let mut mean_counts = [0.0; 4];
    for (i, f) in Feature::ALL.iter().enumerate() {
        cited[i] = proportion(&rows.iter().map(|r| f.flag(r)).collect::<Vec<_>>()).unwrap_or(0.0);
        mean_counts[i] =
            mean(&rows.iter().map(|r| f.count(r) as f64).collect::<Vec<_>>()).unwrap_or(0.0);
    }
    FeatureRates {
        key,
        n: rows.len(),
        cited,
        mean_counts,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplanationSummary {
    pub n: usize,
    pub by_category: Vec<FeatureRates>,
    pub by_model: Vec<FeatureRates>,
    pub physical_embodied_rate: Option<f64>,
    pub linguistic_semantic_rate: Option<f64>,
}

impl ExplanationSummary {
    pub fn physical_supports_h3(&self) -> Option<bool> {
        self.physical_embodied_rate
            .map(|r| r < PHYSICAL_EMBODIED_THRESHOLD)
    }

    pub fn linguistic_supports_h3(&self) -> Option<bool> {
        self.linguistic_semantic_rate
            .map(|r| r > LINGUISTIC_SEMANTIC_THRESHOLD)
    }
}

fn citation_rate(rows: &[CodedExplanation], cat: Category, f: Feature) -> Option<f64> {
    proportion(
        &rows
            .iter()
            .filter(|r| r.joke_category == cat)
            .map(|r| f.flag(r))
            .collect::<Vec<_>>(),
    )
}

pub fn summarize_explanations(rows: &[CodedExplanation]) -> ExplanationSummary {
    let by_category = Category::ALL
        .iter()
        .filter_map(|cat| {
            let rs: Vec<&CodedExplanation> =
                rows.iter().filter(|r| r.joke_category == *cat).collect();
            (!rs.is_empty()).then(|| feature_rates(cat.to_string(), &rs))
        })
        .collect();

    let mut models: BTreeMap<&str, Vec<&CodedExplanation>> = BTreeMap::new();
    for r in rows {
        models.entry(r.explaining_model.as_str()).or_default().push(r);
    }
    let by_model = models
        .into_iter()
        .map(|(m, rs)| feature_rates(m.to_string(), &rs))
        .collect();

    ExplanationSummary {
        n: rows.len(),
        by_category,
        by_model,
        physical_embodied_rate: citation_rate(rows, Category::Physical, Feature::Embodied),
        linguistic_semantic_rate: citation_rate(rows, Category::Linguistic, Feature::Semantic),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingsSummary {
    pub rated: usize,
    pub funniness: Option<Summary>,
    pub category_fit: Option<Summary>,
    pub structural_coherence: Option<Summary>,
    pub originality: Option<Summary>,
    pub by_temperature: Vec<(f64, Summary)>,
    pub best_temperature: Option<f64>,
    /// Categories by mean funniness, highest first.
    pub category_ranking: Vec<(Category, Summary)>,
    pub ranking_matches_prediction: bool,
    pub by_model: Vec<(String, Summary)>,
    /// (id, category, temperature, text) of jokes rated below 4 for originality.
    pub low_originality: Vec<(String, Category, f64, String)>,
    pub coherence_funniness_r: Option<f64>,
    pub words_funniness_r: Option<f64>,
}

impl RatingsSummary {
    pub fn originality_verdict(&self) -> Option<&'static str> {
        self.originality.map(|s| {
            if s.mean > 5.0 {
                "good: jokes appear original"
            } else if s.mean > 3.0 {
                "moderate: some retrieval possible"
            } else {
                "poor: many jokes may be retrieved, revise prompts"
            }
        })
    }
}

fn rating_values(jokes: &[&JokeRecord], f: fn(&crate::model::ManualRatings) -> Option<u8>) -> Vec<f64> {
    jokes
        .iter()
        .filter_map(|j| j.manual_ratings.as_ref().and_then(f))
        .map(f64::from)
        .collect()
}

pub fn summarize_ratings(jokes: &[JokeRecord]) -> RatingsSummary {
    let rated: Vec<&JokeRecord> = jokes.iter().filter(|j| j.is_rated()).collect();
    let funny = |j: &JokeRecord| -> Option<f64> {
        j.manual_ratings
            .as_ref()
            .and_then(|r| r.funniness)
            .map(f64::from)
    };

    let mut by_temp = Aggregator::new();
    let mut by_cat = Aggregator::new();
    let mut by_model = Aggregator::new();
    for j in rated.iter().copied() {
        if let Some(f) = funny(j) {
            by_temp.push(temp_key(j.temperature), f);
            by_cat.push(j.category, f);
            by_model.push(j.model.clone(), f);
        }
    }

    let by_temperature: Vec<(f64, Summary)> = by_temp
        .finish()
        .into_iter()
        .map(|(k, s)| (temp_from_key(k), s))
        .collect();
    let best_temperature = by_temperature
        .iter()
        .fold(None::<&(f64, Summary)>, |best, cur| match best {
            Some(b) if b.1.mean >= cur.1.mean => Some(b),
            _ => Some(cur),
        })
        .map(|(t, _)| *t);

    let mut category_ranking = by_cat.finish();
    category_ranking.sort_by(|a, b| {
        b.1.mean
            .partial_cmp(&a.1.mean)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let observed: Vec<Category> = category_ranking.iter().map(|(c, _)| *c).collect();

    let low_originality = rated
        .iter()
        .filter(|j| {
            j.manual_ratings
                .as_ref()
                .and_then(|r| r.originality)
                .is_some_and(|o| o < 4)
        })
        .take(3)
        .map(|j| {
            (
                j.id.clone(),
                j.category,
                j.temperature as f64,
                j.full_text.clone(),
            )
        })
        .collect();

    // Correlations use jokes rated on both dimensions.
    let pairs = |g: &dyn Fn(&JokeRecord) -> Option<f64>| -> (Vec<f64>, Vec<f64>) {
        rated
            .iter()
            .copied()
            .filter_map(|j| Some((g(j)?, funny(j)?)))
            .unzip()
    };
    let (coh, fun1) = pairs(&|j: &JokeRecord| {
        j.manual_ratings
            .as_ref()
            .and_then(|r| r.structural_coherence)
            .map(f64::from)
    });
    let (words, fun2) = pairs(&|j: &JokeRecord| Some(j.word_counts.map(|w| w.total).unwrap_or(0) as f64));

    RatingsSummary {
        rated: rated.len(),
        funniness: summarize(&rating_values(&rated, |r| r.funniness)),
        category_fit: summarize(&rating_values(&rated, |r| r.category_fit)),
        structural_coherence: summarize(&rating_values(&rated, |r| r.structural_coherence)),
        originality: summarize(&rating_values(&rated, |r| r.originality)),
        by_temperature,
        best_temperature,
        ranking_matches_prediction: observed == PREDICTED_RANKING,
        category_ranking,
        by_model: by_model.finish(),
        low_originality,
        coherence_funniness_r: pearson(&coh, &fun1),
        words_funniness_r: pearson(&words, &fun2),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvidenceRow {
    pub category: Category,
    pub structural_validity: Option<f64>,
    pub surprise_score: Option<f64>,
    pub feature: Feature,
    pub feature_citation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum H3Support {
    Strong,
    Moderate,
    NotSupported,
    /// Linguistic or physical explanations are missing.
    Insufficient,
}

impl H3Support {
    pub fn as_str(&self) -> &'static str {
        match self {
            H3Support::Strong => "strong support for H3 (hybrid hypothesis)",
            H3Support::Moderate => "moderate support for H3",
            H3Support::NotSupported => "H3 not supported",
            H3Support::Insufficient => "insufficient explanation data",
        }
    }
}

pub fn interpret_h3(linguistic_semantic: Option<f64>, physical_embodied: Option<f64>) -> H3Support {
    match (linguistic_semantic, physical_embodied) {
        (Some(l), Some(p)) => {
            if l > LINGUISTIC_SEMANTIC_THRESHOLD && p < PHYSICAL_EMBODIED_THRESHOLD {
                H3Support::Strong
            } else if l > p {
                H3Support::Moderate
            } else {
                H3Support::NotSupported
            }
        }
        _ => H3Support::Insufficient,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComprehensiveReport {
    pub evidence: Vec<EvidenceRow>,
    pub linguistic_semantic: Option<f64>,
    pub physical_embodied: Option<f64>,
    pub support: H3Support,
    pub has_structure: bool,
    pub has_surprise: bool,
    pub has_explanations: bool,
}

pub fn comprehensive(
    structure: Option<&[StructuralRecord]>,
    surprise: Option<&[SurpriseRecord]>,
    explanations: Option<&[CodedExplanation]>,
) -> ComprehensiveReport {
    let evidence = Category::ALL
        .iter()
        .map(|&cat| {
            let feature = Feature::relevant_to(cat);
            EvidenceRow {
                category: cat,
                structural_validity: structure.and_then(|rows| {
                    proportion(
                        &rows
                            .iter()
                            .filter(|r| r.category == cat)
                            .map(|r| r.structure_valid)
                            .collect::<Vec<_>>(),
                    )
                }),
                surprise_score: surprise.and_then(|rows| {
                    mean(
                        &rows
                            .iter()
                            .filter(|r| r.category == cat && r.success)
                            .filter_map(|r| r.surprise_score)
                            .collect::<Vec<_>>(),
                    )
                }),
                feature,
                feature_citation: explanations.and_then(|rows| citation_rate(rows, cat, feature)),
            }
        })
        .collect();

    let ls = explanations.and_then(|r| citation_rate(r, Category::Linguistic, Feature::Semantic));
    let pe = explanations.and_then(|r| citation_rate(r, Category::Physical, Feature::Embodied));

    ComprehensiveReport {
        evidence,
        linguistic_semantic: ls,
        physical_embodied: pe,
        support: interpret_h3(ls, pe),
        has_structure: structure.is_some(),
        has_surprise: surprise.is_some(),
        has_explanations: explanations.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{joke_id, ApiInfo, JokeStatus, ManualRatings, WordCounts};

    fn joke(model: &str, cat: Category, t: f32, i: usize, ok: bool) -> JokeRecord {
        JokeRecord {
            id: joke_id(model, cat, t, i),
            timestamp: String::new(),
            model: model.into(),
            model_name: model.into(),
            category: cat,
            temperature: t,
            prompt_index: i,
            prompt: String::new(),
            raw_response: ok.then(|| "Setup: a b c\nPunchline: d e".to_string()),
            setup: if ok { "a b c".into() } else { String::new() },
            punchline: if ok { "d e".into() } else { String::new() },
            full_text: if ok { "Setup: a b c\nPunchline: d e".into() } else { String::new() },
            word_counts: ok.then_some(WordCounts {
                setup: 3,
                punchline: 2,
                total: 5,
            }),
            status: if ok {
                JokeStatus::Parsed
            } else {
                JokeStatus::GenerationFailed
            },
            parse_error: None,
            api: ApiInfo {
                tokens: ok.then_some(30),
                latency_ms: Some(100),
                error: (!ok).then(|| "network".to_string()),
                attempts: 1,
                ..Default::default()
            },
            manual_ratings: None,
        }
    }

    fn coded(cat: Category, model: &str, semantic: bool, embodied: bool) -> CodedExplanation {
        CodedExplanation {
            joke_id: "x".into(),
            joke_category: cat,
            joke_generator: "g".into(),
            explaining_model: model.into(),
            has_semantic: semantic,
            has_embodied: embodied,
            has_social: false,
            has_threat: false,
            semantic_count: semantic as u32 * 2,
            embodied_count: embodied as u32,
            social_count: 0,
            threat_count: 0,
        }
    }

    #[test]
    fn generation_counts_and_groups() {
        let jokes = vec![
            joke("gpt4o", Category::Linguistic, 0.5, 0, true),
            joke("gpt4o", Category::Linguistic, 0.9, 0, false),
            joke("claude", Category::Dark, 0.5, 0, true),
        ];
        let s = summarize_generation(&jokes);
        assert_eq!((s.attempts, s.successes, s.failures), (3, 2, 1));
        assert_eq!(s.total_tokens, 60);
        assert_eq!(s.errors.len(), 1);
        assert!(s.errors[0].starts_with("gpt4o_linguistic_t0.9_0"));
        assert_eq!(s.by_model[0].0, "claude");
        assert_eq!(s.by_temperature[0], (0.5, CountRate { success: 2, total: 2 }));
        assert_eq!(s.conditions.len(), 3);
        assert_eq!(s.examples.len(), 2);
        assert_eq!(s.words.unwrap().mean, 5.0);
    }

    #[test]
    fn explanation_h3_comparisons() {
        let rows = vec![
            coded(Category::Linguistic, "gpt4o", true, false),
            coded(Category::Linguistic, "claude", true, false),
            coded(Category::Physical, "gpt4o", true, false),
            coded(Category::Physical, "claude", false, true),
            coded(Category::Physical, "gemini", false, false),
        ];
        let s = summarize_explanations(&rows);
        assert_eq!(s.linguistic_semantic_rate, Some(1.0));
        assert!((s.physical_embodied_rate.unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.physical_supports_h3(), Some(true));
        assert_eq!(s.linguistic_supports_h3(), Some(true));
        assert_eq!(s.by_model.iter().map(|m| m.key.as_str()).collect::<Vec<_>>(), vec!["claude", "gemini", "gpt4o"]);
        assert_eq!(s.by_category[0].mean_counts[0], 2.0);
    }

    #[test]
    fn h3_interpretation_levels() {
        assert_eq!(interpret_h3(Some(0.8), Some(0.3)), H3Support::Strong);
        assert_eq!(interpret_h3(Some(0.6), Some(0.3)), H3Support::Moderate);
        assert_eq!(interpret_h3(Some(0.3), Some(0.6)), H3Support::NotSupported);
        assert_eq!(interpret_h3(None, Some(0.6)), H3Support::Insufficient);
    }

    #[test]
    fn comprehensive_tolerates_missing_measures() {
        let rows = vec![coded(Category::Linguistic, "m", true, false)];
        let r = comprehensive(None, None, Some(&rows));
        assert_eq!(r.evidence.len(), 4);
        assert_eq!(r.evidence[0].feature_citation, Some(1.0));
        assert_eq!(r.evidence[1].feature, Feature::Embodied);
        assert_eq!(r.evidence[1].feature_citation, None);
        assert_eq!(r.support, H3Support::Insufficient);
        assert!(!r.has_structure);
    }

    #[test]
    fn ratings_rank_categories_and_pick_temperature() {
        let mut jokes = Vec::new();
        let plan = [
            (Category::Linguistic, 0.7, 6),
            (Category::Social, 0.7, 5),
            (Category::Physical, 0.5, 4),
            (Category::Dark, 0.5, 2),
        ];
        for (i, (cat, t, f)) in plan.into_iter().enumerate() {
            let mut j = joke("m", cat, t, i, true);
            j.manual_ratings = Some(ManualRatings {
                funniness: Some(f),
                category_fit: Some(5),
                structural_coherence: Some(f),
                originality: Some(if i == 3 { 2 } else { 6 }),
                ..Default::default()
            });
            jokes.push(j);
        }
        jokes.push(joke("m", Category::Dark, 0.9, 9, true));

        let s = summarize_ratings(&jokes);
        assert_eq!(s.rated, 4);
        assert!(s.ranking_matches_prediction);
        assert_eq!(s.best_temperature, Some(0.7));
        assert_eq!(s.low_originality.len(), 1);
        assert!((s.coherence_funniness_r.unwrap() - 1.0).abs() < 1e-12);
        assert!(s.words_funniness_r.is_none());
        assert_eq!(s.originality_verdict(), Some("moderate: some retrieval possible"));
    }
}
