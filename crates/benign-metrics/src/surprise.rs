//! Punchline predictability: ask a model to guess the punchline from the
//! setup alone, then compare the guess with the real one.

use benign_core::engine::{complete_with_retries, RunAudit};
use benign_core::model::{CompletionParams, JokeRecord, SurpriseRecord};
use benign_core::prompts::surprise_prompt;
use benign_core::providers::llm::LlmClient;
use std::collections::HashSet;
use std::sync::Arc;

/// Lowercased words with surrounding punctuation stripped.
pub fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// |a ∩ b| / |a ∪ b|; two empty sets overlap by 0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    (a.intersection(b).count() as f64 / union as f64).clamp(0.0, 1.0)
}

/// Share of `part` tokens that also occur in `whole`.
pub fn coverage(part: &HashSet<String>, whole: &HashSet<String>) -> f64 {
    if part.is_empty() {
        return 0.0;
    }
    (part.intersection(whole).count() as f64 / part.len() as f64).clamp(0.0, 1.0)
}

pub struct Scores {
    pub prediction_accuracy: f64,
    pub surprise_score: f64,
    pub punchline_overlap_with_setup: f64,
}

pub fn score(setup: &str, punchline: &str, predicted: &str) -> Scores {
    let setup = token_set(setup);
    let punchline = token_set(punchline);
    let predicted = token_set(predicted);
    let accuracy = jaccard(&predicted, &punchline);
    Scores {
        prediction_accuracy: accuracy,
        surprise_score: 1.0 - accuracy,
        punchline_overlap_with_setup: coverage(&punchline, &setup),
    }
}

pub struct SurpriseAnalyzer {
    pub client: Arc<dyn LlmClient>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub retries: u32,
    pub model_key: String,
    pub audit: Option<RunAudit>,
}

impl SurpriseAnalyzer {
    pub fn new(client: Arc<dyn LlmClient>, model_key: impl Into<String>) -> Self {
        Self {
            client,
            temperature: 0.7,
            max_tokens: 150,
            retries: 1,
            model_key: model_key.into(),
            audit: None,
        }
    }

    /// One record per joke, in input order. A vendor failure only affects
    /// its own record.
    pub async fn analyze(&self, jokes: &[&JokeRecord]) -> Vec<SurpriseRecord> {
        let total = jokes.len();
        let mut out = Vec::with_capacity(total);
        for (i, joke) in jokes.iter().enumerate() {
            let rec = self.analyze_one(joke).await;
            tracing::info!(
                event = "surprise.item",
                joke_id = %rec.id,
                category = rec.category.as_str(),
                success = rec.success,
                surprise = ?rec.surprise_score,
                progress = format!("{}/{}", i + 1, total),
            );
            out.push(rec);
        }
        if let Some(a) = &self.audit {
            let status = if out.iter().all(|r| r.success) {
                "completed"
            } else {
                "completed_with_failures"
            };
            if let Err(e) = a.finish(status) {
                tracing::warn!(event = "audit.finalize_failed", error = %e);
            }
        }
        out
    }

    async fn analyze_one(&self, joke: &JokeRecord) -> SurpriseRecord {
        let params = CompletionParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let outcome = complete_with_retries(
            self.client.as_ref(),
            &surprise_prompt(&joke.setup),
            &params,
            self.retries,
            &joke.id,
            &self.model_key,
            self.audit.as_ref(),
        )
        .await;

        let mut rec = SurpriseRecord {
            id: joke.id.clone(),
            model: joke.model.clone(),
            category: joke.category,
            temperature: joke.temperature,
            setup: joke.setup.clone(),
            punchline: joke.punchline.clone(),
            predicted_punchline: None,
            punchline_overlap_with_setup: None,
            prediction_accuracy: None,
            surprise_score: None,
            success: false,
            error: outcome.error,
        };
        if let Some(resp) = outcome.response {
            let predicted = resp.text.trim().to_string();
            let s = score(&joke.setup, &joke.punchline, &predicted);
            rec.predicted_punchline = Some(predicted);
            rec.prediction_accuracy = Some(s.prediction_accuracy);
            rec.surprise_score = Some(s.surprise_score);
            rec.punchline_overlap_with_setup = Some(s.punchline_overlap_with_setup);
            rec.success = true;
            rec.error = None;
        }
        rec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_ignore_case_and_punctuation() {
        let t = token_set("To get to the OTHER side!");
        assert_eq!(t.len(), 5);
        assert!(t.contains("other") && t.contains("side"));
        assert!(token_set(" ... -- ").is_empty());
    }

    #[test]
    fn exact_guess_is_not_surprising() {
        let s = score("Why cross the road?", "To get to the other side.", "to get to the other side");
        assert_eq!(s.prediction_accuracy, 1.0);
        assert_eq!(s.surprise_score, 0.0);
    }

    #[test]
    fn unrelated_guess_is_fully_surprising() {
        let s = score("Why did the chicken cross?", "The chicken was late", "bananas");
        assert_eq!(s.surprise_score, 1.0);
        // "the" and "chicken" out of {the, chicken, was, late}
        assert_eq!(s.punchline_overlap_with_setup, 0.5);
    }

    #[test]
    fn empty_inputs_stay_in_range() {
        let s = score("", "", "");
        assert_eq!(s.surprise_score, 1.0);
        assert_eq!(s.punchline_overlap_with_setup, 0.0);
    }
}
