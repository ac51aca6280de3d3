use crate::model::{CompletionParams, LlmResponse};
use crate::providers::llm::LlmClient;
use crate::storage::{AttemptRow, Store};
use std::time::Instant;

/// Attempt sink for one stage run in the audit store.
#[derive(Clone)]
pub struct RunAudit {
    pub store: Store,
    pub run_id: i64,
}

impl RunAudit {
    pub fn start(store: Store, stage: &str, config_fingerprint: &str) -> anyhow::Result<Self> {
        store.init_schema()?;
        let run_id = store.create_run(stage, config_fingerprint)?;
        Ok(Self { store, run_id })
    }

    /// Audit writes never fail a batch item.
    pub fn record(&self, row: &AttemptRow) {
        if let Err(e) = self.store.insert_attempt(self.run_id, row) {
            tracing::warn!(event = "audit.write_failed", item_id = %row.item_id, error = %e);
        }
    }

    pub fn finish(&self, status: &str) -> anyhow::Result<()> {
        self.store.finalize_run(self.run_id, status)
    }
}

#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub response: Option<LlmResponse>,
    pub attempts: u32,
    pub error: Option<String>,
    pub latency_ms: Option<u64>,
}

/// One call plus `retries` immediate reattempts. Errors end up in the
/// outcome, never in the return type.
pub async fn complete_with_retries(
    client: &dyn LlmClient,
    prompt: &str,
    params: &CompletionParams,
    retries: u32,
    item_id: &str,
    model_key: &str,
    audit: Option<&RunAudit>,
) -> CallOutcome {
    let max_attempts = 1 + retries;
    let mut last_error = None;
    let mut last_latency = None;

    for i in 0..max_attempts {
        let attempt_no = i + 1;
        let start = Instant::now();
        let result = client.complete(prompt, params).await;
        let elapsed = start.elapsed().as_millis() as u64;

        let (status, latency_ms, error) = match &result {
            Ok(r) => ("ok", Some(r.latency_ms.max(elapsed)), None),
            Err(e) => ("error", Some(elapsed), Some(e.to_string())),
        };
        if let Some(a) = audit {
            a.record(&AttemptRow {
                item_id: item_id.to_string(),
                model: model_key.to_string(),
                attempt_no,
                status: status.to_string(),
                latency_ms,
                error: error.clone(),
            });
        }

        match result {
            Ok(resp) => {
                return CallOutcome {
                    latency_ms: Some(resp.latency_ms.max(elapsed)),
                    response: Some(resp),
                    attempts: attempt_no,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    event = "llm.attempt_failed",
                    model = %model_key,
                    item_id = %item_id,
                    attempt = attempt_no,
                    max_attempts,
                    error = %e,
                );
                last_error = error;
                last_latency = latency_ms;
            }
        }
    }

    CallOutcome {
        response: None,
        attempts: max_attempts,
        error: last_error,
        latency_ms: last_latency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderErrorKind;
    use crate::providers::llm::fake::{FakeClient, FakeReply};

    const P: CompletionParams = CompletionParams {
        temperature: 0.7,
        max_tokens: 150,
    };

    #[tokio::test]
    async fn retry_recovers_and_is_audited() {
        let audit = RunAudit::start(Store::memory().unwrap(), "generate", "fp").unwrap();
        let client = FakeClient::new("f").with_script([
            FakeReply::Fail(ProviderErrorKind::RateLimit),
            FakeReply::Text("ok".into()),
        ]);
        let out = complete_with_retries(&client, "p", &P, 1, "id-1", "fake", Some(&audit)).await;
        assert!(out.response.is_some());
        assert_eq!(out.attempts, 2);

        let rows = audit.store.attempts_for_run(audit.run_id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, "error");
        assert!(rows[0].error.as_deref().unwrap().contains("rate_limit"));
        assert_eq!(rows[1].status, "ok");
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let client = FakeClient::new("f").failing_when("p");
        let out = complete_with_retries(&client, "p", &P, 2, "id", "fake", None).await;
        assert!(out.response.is_none());
        assert_eq!(out.attempts, 3);
        assert_eq!(client.calls(), 3);
        assert!(out.error.unwrap().contains("injected failure"));
    }
}
