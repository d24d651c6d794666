use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::cache::TranslationCache;
use super::interface::{ProviderReply, TranslationProvider, TranslationRequest, TranslationResponse};
use super::rules::TranslationRules;
use crate::config::{CacheConfig, ProviderConfig};
use crate::error::GatewayError;

/// Runs the translation pipeline: validate, cache lookup, provider call,
/// normalize, cache populate.
pub struct TranslationService {
    rules: TranslationRules,
    cache: Arc<TranslationCache>,
    provider: Arc<dyn TranslationProvider>,
    provider_config: ProviderConfig,
    cache_config: CacheConfig,
}

impl TranslationService {
    pub fn new(
        rules: TranslationRules,
        cache: Arc<TranslationCache>,
        provider: Arc<dyn TranslationProvider>,
        provider_config: ProviderConfig,
        cache_config: CacheConfig,
    ) -> Self {
        Self {
            rules,
            cache,
            provider,
            provider_config,
            cache_config,
        }
    }

    /// Translate one request.
    ///
    /// A provider non-success status comes back as `Ok` with `success == false`;
    /// every other fault is returned as an error for the boundary to map.
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, GatewayError> {
        let span = info_span!("translate", request_id = %Uuid::new_v4());
        self.run_pipeline(request).instrument(span).await
    }

    async fn run_pipeline(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, GatewayError> {
        info!("Translation request received for text: {}", request.preview());

        self.rules.validate(request)?;

        let cache_key = TranslationRules::derive_cache_key(request, &self.cache_config.key_prefix);
        if let Some(cached) = self.cache.get(&cache_key) {
            info!("Translation returned from cache for: {}", request.preview());
            return Ok(cached);
        }

        info!(
            "Calling translation provider {}: {} -> {}",
            self.provider.name(),
            request.from_language,
            request.to_language
        );
        let reply = self
            .provider
            .call(request, &self.provider_config.api_key)
            .await?;

        let raw = match reply {
            ProviderReply::Success(raw) => raw,
            ProviderReply::Failed { status } => {
                return Ok(TranslationRules::build_error_response(format!(
                    "Provider API error: {}",
                    status
                )));
            }
        };

        let result = TranslationRules::normalize_provider_response(&raw, request)?;
        self.cache.put(
            &cache_key,
            result.clone(),
            self.cache_config.absolute_expiration(),
            self.cache_config.sliding_expiration(),
        );
        info!("Translation cached with key: {}", cache_key);

        Ok(result)
    }

    /// Translate every request concurrently, preserving input order.
    ///
    /// Oversized batches are rejected before any item runs. Per-item faults
    /// become that item's error response and never affect siblings.
    pub async fn translate_batch(
        &self,
        requests: &[TranslationRequest],
    ) -> Result<Vec<TranslationResponse>, GatewayError> {
        let max = self.provider_config.max_batch_size;
        if requests.len() > max {
            return Err(GatewayError::Validation(format!(
                "At most {} texts can be translated at once.",
                max
            )));
        }

        info!("Batch translation of {} items", requests.len());
        let results = join_all(requests.iter().map(|request| async move {
            match self.translate(request).await {
                Ok(response) => response,
                Err(err) => {
                    err.log();
                    TranslationRules::build_error_response(err.public_message())
                }
            }
        }))
        .await;

        Ok(results)
    }

    pub fn supported_languages(&self) -> Vec<String> {
        self.rules.list_supported_languages()
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn cache_entries(&self) -> usize {
        self.cache.len()
    }
}
