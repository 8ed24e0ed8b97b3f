use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Default OpenAI-compatible base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default vision-capable model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Resolved upstream chat-completion settings
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL; `/chat/completions` is appended
    pub base_url: Url,
    /// Bearer credential forwarded as `Authorization`
    pub api_key: Option<SecretString>,
    /// Model identifier sent with every request
    pub model: String,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
}

/// Optional upstream settings from a single layer
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamLayer {
    #[serde(default)]
    pub base_url: Option<Url>,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl UpstreamLayer {
    /// Fill unset values from a lower-precedence layer
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            base_url: self.base_url.or(lower.base_url),
            api_key: self.api_key.or(lower.api_key),
            model: self.model.or(lower.model),
            timeout_ms: self.timeout_ms.or(lower.timeout_ms),
            max_retries: self.max_retries.or(lower.max_retries),
        }
    }

    /// Apply built-in defaults and validate
    ///
    /// # Errors
    ///
    /// Returns an error if the model is empty or the timeout is zero
    pub fn resolve(self) -> anyhow::Result<UpstreamConfig> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        if model.trim().is_empty() {
            anyhow::bail!("upstream.model must not be empty");
        }

        let timeout_ms = self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            anyhow::bail!("upstream.timeout_ms must be greater than 0");
        }

        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("upstream.base_url must use http or https, got {}", base_url.scheme());
        }

        Ok(UpstreamConfig {
            base_url,
            api_key: self.api_key,
            model,
            timeout: Duration::from_millis(timeout_ms),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        })
    }
}
