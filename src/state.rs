use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::translate::{
    GoogleTranslateClient, SupportedLanguageTable, TranslationCache, TranslationProvider,
    TranslationRules, TranslationService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub translation: Arc<TranslationService>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let provider = Arc::new(GoogleTranslateClient::new(&config.provider_config)?);
        let state = Self::with_provider(config, provider);

        let sweep = Duration::from_secs(state.config.system_config.cache_sweep_interval_seconds.max(1));
        state.translation.cache().spawn_sweeper(sweep);

        Ok(state)
    }

    /// Wire the pipeline around an arbitrary provider.
    pub fn with_provider(config: Config, provider: Arc<dyn TranslationProvider>) -> Self {
        let languages = Arc::new(SupportedLanguageTable::default());
        let rules = TranslationRules::new(languages, &config.provider_config);
        let cache = Arc::new(TranslationCache::new(config.cache_config.max_cache_entries));

        let translation = Arc::new(TranslationService::new(
            rules,
            cache,
            provider,
            config.provider_config.clone(),
            config.cache_config.clone(),
        ));

        Self {
            config,
            translation,
        }
    }
}
