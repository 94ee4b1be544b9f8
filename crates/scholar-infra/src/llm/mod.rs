//! Generation backends.
//!
//! Provides the generator factory ([`create_generator`]) that builds the
//! configured OpenAI-compatible client behind a [`BoxGenerator`].

pub mod openai_compat;

use secrecy::SecretString;

use scholar_core::llm::box_generator::BoxGenerator;
use scholar_types::config::ProviderConfig;

use self::openai_compat::OpenAiCompatibleGenerator;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxGenerator`] from the `[provider]` section and a resolved key.
pub fn create_generator(config: &ProviderConfig, api_key: SecretString) -> BoxGenerator {
    let oai_config =
        OpenAiCompatConfig::for_provider(&config.name, config.base_url.as_deref(), api_key);
    tracing::info!(
        provider = %oai_config.provider_name,
        base_url = %oai_config.base_url,
        "Generation provider configured"
    );
    BoxGenerator::new(OpenAiCompatibleGenerator::new(oai_config))
}
