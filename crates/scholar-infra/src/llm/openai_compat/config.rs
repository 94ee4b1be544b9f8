//! Connection settings and well-known endpoints for OpenAI-compatible providers.

use secrecy::SecretString;

/// Base URL used when a provider name is not recognized and no override is set.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an OpenAI-compatible endpoint.
///
/// Used to construct an [`super::OpenAiCompatibleGenerator`]. Models are
/// chosen per request, so none is configured here.
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "mistral").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
}

impl OpenAiCompatConfig {
    /// Settings for a named provider, resolving its base URL from
    /// `base_url_override` or the well-known table.
    pub fn for_provider(name: &str, base_url_override: Option<&str>, api_key: SecretString) -> Self {
        let base_url = match base_url_override {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => match known_base_url(name) {
                Some(url) => url.to_string(),
                None => {
                    tracing::warn!(
                        provider = name,
                        "Unknown provider without base_url, falling back to {OPENAI_BASE_URL}"
                    );
                    OPENAI_BASE_URL.to_string()
                }
            },
        };

        Self {
            provider_name: name.to_string(),
            base_url,
            api_key,
        }
    }
}

/// Default base URL for providers that speak the chat completions protocol.
pub fn known_base_url(name: &str) -> Option<&'static str> {
    match name {
        "openai" => Some(OPENAI_BASE_URL),
        "gemini" => Some("https://generativelanguage.googleapis.com/v1beta/openai"),
        "mistral" => Some("https://api.mistral.ai/v1"),
        "glm" => Some("https://api.z.ai/api/paas/v4"),
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        _ => None,
    }
}
