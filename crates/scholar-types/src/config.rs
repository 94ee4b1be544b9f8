//! Configuration types for Scholar.
//!
//! `ScholarConfig` represents the top-level `config.toml` that selects the
//! generation provider, per-role models, sampling parameters, and how the
//! post-processing pipeline behaves.

use serde::{Deserialize, Serialize};

use crate::conversation::Subject;

/// Top-level configuration for the Scholar service.
///
/// Loaded from `~/.scholar/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScholarConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Where the REST API listens. CLI flags override both fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// OpenAI-compatible endpoint used for every generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name of the provider (e.g., "openai", "openrouter").
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Override for the API base URL. `None` uses the provider's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

/// Sampling and time limits shared by all agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on a single generation call, including a full stream.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Model identifiers per agent role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model for the six subject tutors.
    #[serde(default = "default_chat_model")]
    pub tutor: String,

    #[serde(default = "default_chat_model")]
    pub study_coach: String,

    #[serde(default = "default_chat_model")]
    pub verifier: String,

    #[serde(default = "default_formatter_model")]
    pub formatter: String,
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_formatter_model() -> String {
    "gpt-3.5-turbo-16k".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            tutor: default_chat_model(),
            study_coach: default_chat_model(),
            verifier: default_chat_model(),
            formatter: default_formatter_model(),
        }
    }
}

/// How finished drafts are turned into display markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingStrategy {
    /// Deterministic regex substitutions only.
    #[default]
    Markup,
    /// A formatter agent restructures the text first, then markup is applied.
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub formatting: FormattingStrategy,

    /// Tutor subjects whose drafts get a verification pass.
    #[serde(default = "default_verified_subjects")]
    pub verified_subjects: Vec<Subject>,

    /// Format every synchronous reply instead of only verified subjects.
    #[serde(default)]
    pub format_all_modes: bool,
}

fn default_verified_subjects() -> Vec<Subject> {
    vec![Subject::Math, Subject::PhysicalScience]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            formatting: FormattingStrategy::default(),
            verified_subjects: default_verified_subjects(),
            format_all_modes: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ScholarConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
        assert!((config.generation.temperature - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.generation.max_tokens, 2000);
        assert_eq!(config.models.formatter, "gpt-3.5-turbo-16k");
        assert_eq!(config.pipeline.formatting, FormattingStrategy::Markup);
        assert_eq!(
            config.pipeline.verified_subjects,
            vec![Subject::Math, Subject::PhysicalScience]
        );
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: ScholarConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generation.timeout_secs, 60);
        assert!(!config.pipeline.format_all_modes);
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let toml_str = r#"
[provider]
name = "openrouter"
base_url = "https://openrouter.ai/api/v1"
api_key_env = "OPENROUTER_API_KEY"

[generation]
temperature = 0.1

[models]
tutor = "gpt-4o"

[pipeline]
formatting = "agent"
verified_subjects = ["math"]
"#;
        let config: ScholarConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.name, "openrouter");
        assert_eq!(
            config.provider.base_url.as_deref(),
            Some("https://openrouter.ai/api/v1")
        );
        assert!((config.generation.temperature - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.generation.max_tokens, 2000);
        assert_eq!(config.models.tutor, "gpt-4o");
        assert_eq!(config.models.verifier, "gpt-4o-mini");
        assert_eq!(config.pipeline.formatting, FormattingStrategy::Agent);
        assert_eq!(config.pipeline.verified_subjects, vec![Subject::Math]);
    }

    #[test]
    fn test_unknown_subject_is_rejected() {
        let toml_str = r#"
[pipeline]
verified_subjects = ["chemistry"]
"#;
        assert!(toml::from_str::<ScholarConfig>(toml_str).is_err());
    }
}
