//! Application state wiring all services together.
//!
//! AppState holds the concrete service instance used by both CLI and REST
//! API. `TutorService` is generic over its repositories; AppState pins it
//! to the SQLite implementations.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use scholar_core::agent::invoker::AgentInvoker;
use scholar_core::agent::registry::AgentRegistry;
use scholar_core::service::tutor::TutorService;
use scholar_infra::config::{load_config, resolve_api_key};
use scholar_infra::llm::create_generator;
use scholar_infra::sqlite::conversation::SqliteConversationRepository;
use scholar_infra::sqlite::pool::{DatabasePool, database_url};
use scholar_infra::sqlite::profile::SqliteProfileRepository;
use scholar_types::config::ScholarConfig;

pub type ConcreteTutorService = TutorService<SqliteConversationRepository, SqliteProfileRepository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub tutor: Arc<ConcreteTutorService>,
    pub config: Arc<ScholarConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load config, open the database, and wire the tutor service.
    ///
    /// A missing API key is fatal only when `needs_generation` is set;
    /// storage-only commands run without one.
    pub async fn init(data_dir: PathBuf, needs_generation: bool) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let db_url = format!("{}?mode=rwc", database_url(&data_dir));
        let db_pool = DatabasePool::new(&db_url).await?;

        let api_key = match resolve_api_key(&config.provider) {
            Ok(key) => key,
            Err(err) if needs_generation => return Err(err.into()),
            Err(err) => {
                tracing::debug!(error = %err, "Continuing without a generation API key");
                SecretString::from(String::new())
            }
        };
        let generator = Arc::new(create_generator(&config.provider, api_key));

        let registry = Arc::new(AgentRegistry::from_models(&config.models));
        let invoker = AgentInvoker::new(generator, &config.generation);
        tracing::debug!(
            generator = invoker.generator_name(),
            agents = registry.routable().count(),
            "Tutor service wired"
        );

        let tutor = TutorService::new(
            SqliteConversationRepository::new(db_pool.clone()),
            SqliteProfileRepository::new(db_pool),
            registry,
            invoker,
            config.pipeline.clone(),
        );

        Ok(Self {
            tutor: Arc::new(tutor),
            config: Arc::new(config),
            data_dir,
        })
    }
}
