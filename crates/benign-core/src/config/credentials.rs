use crate::errors::ConfigError;
use crate::model::{ModelSpec, Provider};
use serde::Serialize;

/// Vendor API keys, read once at process start.
#[derive(Clone, Default)]
pub struct Credentials {
    openai: Option<String>,
    anthropic: Option<String>,
    google: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai", &self.openai.is_some())
            .field("anthropic", &self.anthropic.is_some())
            .field("google", &self.google.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub provider: String,
    pub env_var: String,
    pub present: bool,
}

impl Credentials {
    pub fn from_env() -> Self {
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        Self {
            openai: read("OPENAI_API_KEY"),
            anthropic: read("ANTHROPIC_API_KEY"),
            google: read("GOOGLE_API_KEY"),
        }
    }

    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        let key = Some(key.into());
        match provider {
            Provider::Openai => self.openai = key,
            Provider::Anthropic => self.anthropic = key,
            Provider::Google => self.google = key,
            Provider::Fake => {}
        }
        self
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Openai => self.openai.as_deref(),
            Provider::Anthropic => self.anthropic.as_deref(),
            Provider::Google => self.google.as_deref(),
            Provider::Fake => Some(""),
        }
    }

    pub fn require(&self, provider: Provider) -> Result<&str, ConfigError> {
        self.get(provider).ok_or_else(|| {
            ConfigError(format!(
                "missing API key: set {}",
                provider.api_key_var().unwrap_or("<none>")
            ))
        })
    }

    /// Fails with every missing variable for the given models at once.
    pub fn ensure_for<'a>(
        &self,
        models: impl IntoIterator<Item = &'a ModelSpec>,
    ) -> Result<(), ConfigError> {
        let mut missing: Vec<&'static str> = models
            .into_iter()
            .filter(|m| self.get(m.provider).is_none())
            .filter_map(|m| m.provider.api_key_var())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError(format!("missing API keys: {}", missing.join(", "))))
        }
    }

    pub fn status(&self) -> Vec<CredentialStatus> {
        [Provider::Openai, Provider::Anthropic, Provider::Google]
            .into_iter()
            .map(|p| CredentialStatus {
                provider: p.to_string(),
                env_var: p.api_key_var().unwrap_or_default().to_string(),
                present: self.get(p).is_some(),
            })
            .collect()
    }
}
