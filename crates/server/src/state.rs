use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use postwright_core::{
    composer::ThreadComposer, CombinedSearchResult, Config, ConfigError, ContentGenerator,
    DraftMode, PublishPipeline, ResultItem, SanitizedConfig, SearchAggregator,
};

use crate::api::ApiError;

/// A provider-backed component, or the reason it is unavailable.
type Component<T> = Result<Arc<T>, String>;

/// The single in-memory composition session.
pub struct ComposeSession {
    /// Query of the last combined search.
    pub query: Option<String>,
    /// Results of the last combined search.
    pub results: Option<CombinedSearchResult>,
    /// Result the current drafts were generated from.
    pub selected: Option<ResultItem>,
    /// Mode of the last session generation.
    pub mode: Option<DraftMode>,
    pub composer: ThreadComposer,
}

impl ComposeSession {
    fn new(config: &Config) -> Self {
        Self {
            query: None,
            results: None,
            selected: None,
            mode: None,
            composer: ThreadComposer::new(config.images.clone()),
        }
    }
}

/// Shared application state
pub struct AppState {
    config: Config,
    search: Component<SearchAggregator>,
    generator: Component<ContentGenerator>,
    pipeline: Component<PublishPipeline>,
    session: Mutex<ComposeSession>,
}

impl AppState {
    /// State with no providers wired.
    pub fn new(config: Config) -> Self {
        let session = Mutex::new(ComposeSession::new(&config));
        Self {
            config,
            search: Err("Search provider not configured".to_string()),
            generator: Err("Completion provider not configured".to_string()),
            pipeline: Err("Posting provider not configured".to_string()),
            session,
        }
    }

    pub fn with_search(mut self, search: Result<Arc<SearchAggregator>, ConfigError>) -> Self {
        self.search = search.map_err(|e| e.to_string());
        self
    }

    pub fn with_generator(mut self, generator: Result<Arc<ContentGenerator>, ConfigError>) -> Self {
        self.generator = generator.map_err(|e| e.to_string());
        self
    }

    pub fn with_pipeline(mut self, pipeline: Result<Arc<PublishPipeline>, ConfigError>) -> Self {
        self.pipeline = pipeline.map_err(|e| e.to_string());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn search(&self) -> Result<&SearchAggregator, ApiError> {
        ready(&self.search)
    }

    pub fn generator(&self) -> Result<&ContentGenerator, ApiError> {
        ready(&self.generator)
    }

    pub fn pipeline(&self) -> Result<&PublishPipeline, ApiError> {
        ready(&self.pipeline)
    }

    pub async fn session(&self) -> MutexGuard<'_, ComposeSession> {
        self.session.lock().await
    }
}

fn ready<T>(component: &Component<T>) -> Result<&T, ApiError> {
    component
        .as_deref()
        .map_err(|reason| ApiError::configuration(reason.clone()))
}
