use crate::engine::attempt::{complete_with_retries, RunAudit};
use crate::model::{CompletionParams, ExplanationRecord, JokeRecord, ModelSpec};
use crate::prompts::explanation_prompt;
use crate::providers::llm::Clients;

/// Asks each explaining model why each joke is funny.
pub struct ExplanationCollector<'a> {
    pub clients: &'a Clients,
    pub temperature: f32,
    pub retries: u32,
    pub audit: Option<&'a RunAudit>,
}

impl<'a> ExplanationCollector<'a> {
    /// Joke-major order. One record per (joke, model) pair.
    pub async fn collect(
        &self,
        jokes: &[&JokeRecord],
        models: &[&ModelSpec],
    ) -> Vec<ExplanationRecord> {
        let total = jokes.len() * models.len();
        let mut out = Vec::with_capacity(total);
        for joke in jokes {
            for model in models {
                let rec = self.explain_one(joke, model).await;
                tracing::info!(
                    event = "explain.item",
                    joke_id = %rec.joke_id,
                    model = %rec.explaining_model,
                    success = rec.success,
                    progress = format!("{}/{}", out.len() + 1, total),
                );
                out.push(rec);
            }
        }
        out
    }

    async fn explain_one(&self, joke: &JokeRecord, model: &ModelSpec) -> ExplanationRecord {
        let mut rec = ExplanationRecord {
            joke_id: joke.id.clone(),
            explaining_model: model.key.clone(),
            explanation: None,
            success: false,
            error: None,
            tokens: None,
            latency_ms: None,
            joke_category: joke.category,
            joke_generator_model: joke.model.clone(),
            joke_temperature: joke.temperature,
            timestamp: chrono::Utc::now().to_rfc3339(),
            codes: None,
        };

        let Some(client) = self.clients.get(&model.key) else {
            rec.error = Some(format!("no client for model '{}'", model.key));
            return rec;
        };

        let params = CompletionParams {
            temperature: self.temperature,
            max_tokens: model.max_tokens.max(300),
        };
        let item_id = format!("{}::{}", joke.id, model.key);
        let outcome = complete_with_retries(
            client.as_ref(),
            &explanation_prompt(&joke.full_text),
            &params,
            self.retries,
            &item_id,
            &model.key,
            self.audit,
        )
        .await;

        rec.latency_ms = outcome.latency_ms;
        match outcome.response {
            Some(resp) => {
                rec.success = true;
                rec.tokens = resp.tokens;
                rec.explanation = Some(resp.text);
            }
            None => rec.error = outcome.error,
        }
        rec
    }
}
