use super::LlmClient;
use crate::errors::{ProviderError, ProviderErrorKind};
use crate::model::{CompletionParams, LlmResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Offline client. Replies come from a script first, then from canned
/// answers chosen by the shape of the prompt.
pub struct FakeClient {
    model: String,
    script: Mutex<VecDeque<FakeReply>>,
    fail_when: Option<String>,
    calls: AtomicUsize,
}

#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Fail(ProviderErrorKind),
}

const JOKE: &str = "Setup: Why did the filing cabinet refuse to attend the quarterly planning meeting?\nPunchline: It was tired of being asked to keep everything in order.";
const GUESS: &str = "It wanted to keep everything organized.";
const EXPLANATION: &str = "The setup creates an expectation about office behavior. The punchline violates it through a double meaning of the phrase 'in order', which is wordplay. The violation is benign because nobody is harmed and the situation is safe.";

impl FakeClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            script: Mutex::new(VecDeque::new()),
            fail_when: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_script(self, replies: impl IntoIterator<Item = FakeReply>) -> Self {
        if let Ok(mut s) = self.script.lock() {
            s.extend(replies);
        }
        self
    }

    /// Fail every call whose prompt contains `needle`.
    pub fn failing_when(mut self, needle: impl Into<String>) -> Self {
        self.fail_when = Some(needle.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn canned(prompt: &str) -> &'static str {
        if prompt.contains("predict what the punchline") {
            GUESS
        } else if prompt.contains("explain why this joke") {
            EXPLANATION
        } else {
            JOKE
        }
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(
        &self,
        prompt: &str,
        _params: &CompletionParams,
    ) -> anyhow::Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .script
            .lock()
            .map_err(|_| anyhow::anyhow!("fake client script lock poisoned"))?
            .pop_front();

        let text = match scripted {
            Some(FakeReply::Text(t)) => t,
            Some(FakeReply::Fail(kind)) => {
                return Err(ProviderError::new("fake", kind, "scripted failure").into())
            }
            None => {
                if let Some(needle) = &self.fail_when {
                    if prompt.contains(needle.as_str()) {
                        return Err(ProviderError::new(
                            "fake",
                            ProviderErrorKind::Network,
                            format!("injected failure for prompt containing '{}'", needle),
                        )
                        .into());
                    }
                }
                Self::canned(prompt).to_string()
            }
        };

        Ok(LlmResponse {
            tokens: Some(text.split_whitespace().count() as u64),
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
            finish_reason: Some("stop".to_string()),
            latency_ms: 0,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: CompletionParams = CompletionParams {
        temperature: 0.7,
        max_tokens: 150,
    };

    #[tokio::test]
    async fn script_then_canned() {
        let c = FakeClient::new("fake-1").with_script([
            FakeReply::Text("first".into()),
            FakeReply::Fail(ProviderErrorKind::RateLimit),
        ]);
        assert_eq!(c.complete("x", &P).await.unwrap().text, "first");
        assert!(c.complete("x", &P).await.is_err());
        assert!(c.complete("x", &P).await.unwrap().text.starts_with("Setup:"));
        assert_eq!(c.calls(), 3);
    }

    #[tokio::test]
    async fn injected_failure_matches_prompt() {
        let c = FakeClient::new("fake-1").failing_when("mittens");
        assert!(c.complete("chopsticks with mittens", &P).await.is_err());
        assert!(c.complete("a fitted sheet", &P).await.is_ok());
    }
}
