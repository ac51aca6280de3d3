use crate::config::{PromptMode, StudyConfig};
use crate::engine::attempt::{complete_with_retries, RunAudit};
use crate::model::{
    joke_id, ApiInfo, Category, CompletionParams, JokeRecord, JokeStatus, ModelSpec,
    WordCounts,
};
use crate::parse::{count_words, parse_joke, ParseFailure};
use crate::prompts;
use crate::providers::llm::Clients;

/// One planned generation call.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub model: ModelSpec,
    pub category: Category,
    pub temperature: f32,
    pub prompt_index: usize,
    pub prompt: String,
}

impl GenerationTask {
    pub fn id(&self) -> String {
        joke_id(&self.model.key, self.category, self.temperature, self.prompt_index)
    }
}

/// Model, then category, then temperature, then prompt.
pub fn plan_generation(cfg: &StudyConfig) -> Vec<GenerationTask> {
    let n = cfg.study.n_per_category;
    let mut tasks = Vec::new();
    for model in cfg.generation_models() {
        for &category in &cfg.study.categories {
            let prompts = match cfg.study.prompts {
                PromptMode::Novel => prompts::novel_prompts(category, n),
                PromptMode::Extended => prompts::extended_prompts(category, n),
            };
            for &temperature in &cfg.study.temperatures {
                for (prompt_index, prompt) in prompts.iter().enumerate() {
                    tasks.push(GenerationTask {
                        model: model.clone(),
                        category,
                        temperature,
                        prompt_index,
                        prompt: prompt.clone(),
                    });
                }
            }
        }
    }
    tasks
}

pub struct Runner {
    pub clients: Clients,
    pub retries: u32,
    pub audit: Option<RunAudit>,
}

impl Runner {
    pub fn new(clients: Clients, retries: u32) -> Self {
        Self {
            clients,
            retries,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: RunAudit) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Every task yields exactly one record, in plan order.
    pub async fn run_generation(&self, tasks: &[GenerationTask]) -> Vec<JokeRecord> {
        let total = tasks.len();
        let mut out = Vec::with_capacity(total);
        for (i, task) in tasks.iter().enumerate() {
            let rec = self.generate_one(task).await;
            tracing::info!(
                event = "generate.item",
                joke_id = %rec.id,
                status = rec.status.as_str(),
                progress = format!("{}/{}", i + 1, total),
            );
            out.push(rec);
        }
        if let Some(a) = &self.audit {
            let status = if out.iter().any(|r| r.status == JokeStatus::GenerationFailed) {
                "completed_with_failures"
            } else {
                "completed"
            };
            if let Err(e) = a.finish(status) {
                tracing::warn!(event = "audit.finalize_failed", error = %e);
            }
        }
        out
    }

    pub async fn generate_one(&self, task: &GenerationTask) -> JokeRecord {
        let id = task.id();
        let mut rec = JokeRecord {
            id: id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            model: task.model.key.clone(),
            model_name: task.model.name.clone(),
            category: task.category,
            temperature: task.temperature,
            prompt_index: task.prompt_index,
            prompt: task.prompt.clone(),
            raw_response: None,
            setup: String::new(),
            punchline: String::new(),
            full_text: String::new(),
            word_counts: None,
            status: JokeStatus::GenerationFailed,
            parse_error: None,
            api: ApiInfo::default(),
            manual_ratings: None,
        };

        let Some(client) = self.clients.get(&task.model.key) else {
            rec.api.error = Some(format!("no client for model '{}'", task.model.key));
            return rec;
        };

        let params = CompletionParams {
            temperature: task.temperature,
            max_tokens: task.model.max_tokens,
        };
        let outcome = complete_with_retries(
            client.as_ref(),
            &task.prompt,
            &params,
            self.retries,
            &id,
            &task.model.key,
            self.audit.as_ref(),
        )
        .await;

        rec.api.attempts = outcome.attempts;
        rec.api.latency_ms = outcome.latency_ms;
        rec.api.error = outcome.error;

        let Some(resp) = outcome.response else {
            return rec;
        };
        rec.api.tokens = resp.tokens;
        rec.api.finish_reason = resp.finish_reason;
        rec.full_text = resp.text.trim().to_string();
        rec.raw_response = Some(resp.text);
        if rec.full_text.is_empty() {
            tracing::warn!(event = "generation.empty", joke_id = %id);
            rec.api.error = Some(ParseFailure::EmptyResponse.to_string());
            return rec;
        }

        match parse_joke(&rec.full_text) {
            Ok(p) => {
                let setup = count_words(&p.setup);
                let punchline = count_words(&p.punchline);
                rec.word_counts = Some(WordCounts {
                    setup,
                    punchline,
                    total: setup + punchline,
                });
                rec.setup = p.setup;
                rec.punchline = p.punchline;
                rec.status = JokeStatus::Parsed;
            }
            Err(e) => {
                tracing::warn!(event = "parse.failed", joke_id = %id, reason = %e);
                rec.status = JokeStatus::ParseFailed;
                rec.parse_error = Some(e.to_string());
            }
        }
        rec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::providers::llm::fake::{FakeClient, FakeReply};
    use crate::providers::llm::LlmClient;
    use std::sync::Arc;

    const CFG: &str = r#"
name: t
models:
  - { key: fake, name: fake-1, provider: fake }
study:
  categories: [linguistic, dark]
  temperatures: [0.5, 0.9]
  n_per_category: 2
analysis: { surprise_model: fake }
"#;

    #[test]
    fn plan_order_and_ids() {
        let cfg = parse_config(CFG, true).unwrap();
        let tasks = plan_generation(&cfg);
        assert_eq!(tasks.len(), cfg.planned_generations());
        let ids: Vec<String> = tasks.iter().map(|t| t.id()).collect();
        assert_eq!(
            ids[..4],
            [
                "fake_linguistic_t0.5_0",
                "fake_linguistic_t0.5_1",
                "fake_linguistic_t0.9_0",
                "fake_linguistic_t0.9_1"
            ]
        );
        assert_eq!(ids[4], "fake_dark_t0.5_0");
    }

    #[tokio::test]
    async fn records_parse_status_and_word_counts() {
        let cfg = parse_config(CFG, true).unwrap();
        let tasks = plan_generation(&cfg);
        let client: Arc<dyn LlmClient> = Arc::new(FakeClient::new("fake-1").with_script([
            FakeReply::Text("no structure here".into()),
        ]));
        let runner = Runner::new(Clients::from([("fake".to_string(), client)]), 0);

        let recs = runner.run_generation(&tasks[..2]).await;
        assert_eq!(recs[0].status, JokeStatus::ParseFailed);
        assert!(recs[0].succeeded());
        assert_eq!(recs[0].parse_error.as_deref(), Some("no recoverable punchline"));

        assert_eq!(recs[1].status, JokeStatus::Parsed);
        let wc = recs[1].word_counts.unwrap();
        assert_eq!(wc.total, wc.setup + wc.punchline);
        assert_eq!(recs[1].api.attempts, 1);
    }

    #[tokio::test]
    async fn blank_reply_is_a_generation_failure() {
        let cfg = parse_config(CFG, true).unwrap();
        let tasks = plan_generation(&cfg);
        let client: Arc<dyn LlmClient> =
            Arc::new(FakeClient::new("fake-1").with_script([FakeReply::Text(" \n ".into())]));
        let runner = Runner::new(Clients::from([("fake".to_string(), client)]), 0);

        let recs = runner.run_generation(&tasks[..1]).await;
        assert_eq!(recs[0].status, JokeStatus::GenerationFailed);
        assert!(!recs[0].succeeded());
        assert_eq!(recs[0].api.error.as_deref(), Some("empty response"));
        assert!(recs[0].parse_error.is_none());

        let summary = crate::analysis::summarize_generation(&recs);
        assert_eq!(summary.parse_failures, 0);
    }
}
