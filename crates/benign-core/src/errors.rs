use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Network,
    Auth,
    RateLimit,
    Http(u16),
    MalformedResponse,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::Network => "network",
            ProviderErrorKind::Auth => "auth",
            ProviderErrorKind::RateLimit => "rate_limit",
            ProviderErrorKind::Http(_) => "http",
            ProviderErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

/// A failed vendor call. Always recoverable at the batch level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub provider: &'static str,
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: &'static str, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
        }
    }

    /// Map an HTTP status and body from a vendor API to an error kind.
    pub fn from_status(provider: &'static str, status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Auth,
            429 => ProviderErrorKind::RateLimit,
            s => ProviderErrorKind::Http(s),
        };
        Self::new(provider, kind, format!("status {}: {}", status, body.trim()))
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} API error ({}): {}",
            self.provider,
            self.kind.as_str(),
            self.message
        )
    }
}

impl std::error::Error for ProviderError {}

/// Extract a ProviderError from an anyhow chain, if one is present.
pub fn provider_error(e: &anyhow::Error) -> Option<&ProviderError> {
    e.chain().find_map(|c| c.downcast_ref::<ProviderError>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            ProviderError::from_status("openai", 401, "bad key").kind,
            ProviderErrorKind::Auth
        );
        assert_eq!(
            ProviderError::from_status("anthropic", 429, "slow down").kind,
            ProviderErrorKind::RateLimit
        );
        assert_eq!(
            ProviderError::from_status("google", 500, "").kind,
            ProviderErrorKind::Http(500)
        );
    }

    #[test]
    fn provider_error_survives_context() {
        use anyhow::Context;
        let r: anyhow::Result<()> = Err(ProviderError::new(
            "openai",
            ProviderErrorKind::Network,
            "connection reset",
        ))
        .context("generation call");
        let e = r.unwrap_err();
        let pe = provider_error(&e).expect("provider error in chain");
        assert_eq!(pe.kind, ProviderErrorKind::Network);
        assert!(pe.to_string().contains("openai API error (network)"));
    }
}
