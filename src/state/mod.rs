use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::config::{AppPaths, ConfigService, Settings};
use crate::llm::LlmService;
use crate::prompts::TemplateSet;
use crate::session::SessionStore;

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Settings and templates are read once at startup; the session store is
/// the only part mutated while serving.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Arc<Settings>,
    pub templates: Arc<TemplateSet>,
    pub llm: LlmService,
    pub sessions: SessionStore,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Loads configuration, reads the prompt templates and builds the
    /// configured model backend.
    pub fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let settings = config
            .load_settings()
            .map_err(|e| InitializationError::Config(e.into()))?;
        tracing::info!("Configuration loaded from {}", config.config_path().display());

        let llm = LlmService::from_settings(&settings.llm)
            .map_err(|e| InitializationError::Llm(e.into()))?;

        Ok(Self::with_llm(paths, config, settings, llm))
    }

    /// Assembles state around an already constructed backend.
    pub fn with_llm(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: Settings,
        llm: LlmService,
    ) -> Arc<Self> {
        let templates = TemplateSet::load(
            &paths.resolve(&settings.prompts.lesson_plan_path),
            &paths.resolve(&settings.prompts.worksheet_path),
        );

        let sessions = SessionStore::new(Duration::from_secs(settings.server.session_ttl_secs));

        Arc::new(AppState {
            paths,
            config,
            settings: Arc::new(settings),
            templates: Arc::new(templates),
            llm,
            sessions,
            started_at: Utc::now(),
        })
    }
}
